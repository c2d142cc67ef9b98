use std::fs;
use std::path::Path;

use log::debug;
use na::Vector3;
use nalgebra as na;
use serde::Deserialize;

use super::element::{axis_from, Interaction, Misalignment, OpticalElement, Prescription, ScanChannel};
use super::error::{OpticsError, Result};
use super::galvanometer::MultiAxisGalvanometer;
use super::geometry::Plane;
use super::ray::Ray;
use super::sweep::SweepGrid;

/// 初期Rayの設定。
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RayConfig {
    pub position: [f64; 3],
    pub direction: [f64; 3],
}

impl Default for RayConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 0.0],
            direction: [0.0, 1.0, 0.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SweepConfig {
    pub min_deg: f64,
    pub max_deg: f64,
    pub samples: usize,
}

impl Default for SweepConfig {
    fn default() -> Self {
        let grid = SweepGrid::default();
        Self {
            min_deg: grid.min_deg,
            max_deg: grid.max_deg,
            samples: grid.samples,
        }
    }
}

/// 名前で指定した素子の取り付け誤差。
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MisalignmentConfig {
    pub element: String,
    #[serde(default)]
    pub tilt_deg: [f64; 3],
    #[serde(default)]
    pub offset: [f64; 3],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Reflect,
    Refract,
    Intersect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelConfig {
    X,
    Y,
}

/// 処方を丸ごと差し替える場合の素子の設定。
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ElementConfig {
    pub name: String,
    pub kind: ElementKind,
    pub normal: [f64; 3],
    pub point: [f64; 3],
    pub k: Option<f64>,
    pub rotation_axis: Option<[f64; 3]>,
    pub channel: Option<ChannelConfig>,
}

impl ElementConfig {
    fn build(&self) -> Result<OpticalElement> {
        let interaction = match (self.kind, self.k) {
            (ElementKind::Reflect, None) => Interaction::Reflect,
            (ElementKind::Intersect, None) => Interaction::Intersect,
            (ElementKind::Refract, Some(k)) => Interaction::Refract { k },
            (ElementKind::Refract, None) => {
                return Err(OpticsError::InvalidConfig(format!(
                    "element `{}`: refract requires `k`",
                    self.name
                )))
            }
            (_, Some(_)) => {
                return Err(OpticsError::InvalidConfig(format!(
                    "element `{}`: `k` is only valid for refract",
                    self.name
                )))
            }
        };

        let plane = Plane::new(Vector3::from(self.normal), Vector3::from(self.point))?;
        let element = OpticalElement::new(&self.name, interaction, plane);

        match (self.rotation_axis, self.channel) {
            (None, None) => Ok(element),
            (Some(axis), Some(channel)) => {
                let channel = match channel {
                    ChannelConfig::X => ScanChannel::X,
                    ChannelConfig::Y => ScanChannel::Y,
                };
                Ok(element.steered(axis_from(axis)?, channel))
            }
            _ => Err(OpticsError::InvalidConfig(format!(
                "element `{}`: `rotation_axis` and `channel` must be given together",
                self.name
            ))),
        }
    }
}

/// 設定ファイル(TOML)。
///
/// 省略した項目は元の計測と同じ値になる。
/// 焦点距離165、ミラー間隔13.05、原点から+Y方向のRay、-11〜11度を11点でスイープ。
///
/// ```toml
/// focus_distance = 165.0
/// galvo_gap = 13.05
///
/// [ray]
/// position = [0.0, 0.0, 0.0]
/// direction = [0.0, 1.0, 0.0]
///
/// [sweep]
/// min_deg = -11.0
/// max_deg = 11.0
/// samples = 11
///
/// [[misalignment]]
/// element = "scan mirror Y"
/// tilt_deg = [0.0, 0.05, 0.0]
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub focus_distance: f64,
    pub galvo_gap: f64,
    pub ray: RayConfig,
    pub sweep: SweepConfig,
    /// 相対位置の基準点。省略時は設計上の焦点。
    pub reference: Option<[f64; 3]>,
    pub misalignment: Vec<MisalignmentConfig>,
    /// 指定した場合は標準の処方を置き換える。
    pub element: Vec<ElementConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            focus_distance: 165.0,
            galvo_gap: 13.05,
            ray: RayConfig::default(),
            sweep: SweepConfig::default(),
            reference: None,
            misalignment: vec![],
            element: vec![],
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        let config = Self::parse(&text)?;
        debug!("loaded config {}: {:?}", path.as_ref().display(), config);
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// 処方を組み立ててガルバノスキャナを作る。
    /// [element]があればそれを、なければ標準の処方を使い、取り付け誤差を順に適用する。
    pub fn build_system(&self) -> Result<MultiAxisGalvanometer> {
        let mag = MultiAxisGalvanometer::new(self.focus_distance, self.galvo_gap)?;

        let mut prescription = if self.element.is_empty() {
            mag.prescription().clone()
        } else {
            let elements = self
                .element
                .iter()
                .map(ElementConfig::build)
                .collect::<Result<Vec<_>>>()?;
            Prescription::from_elements(elements)
        };

        for m in &self.misalignment {
            prescription = prescription.misaligned(
                &m.element,
                &Misalignment {
                    tilt_deg: Vector3::from(m.tilt_deg),
                    offset: Vector3::from(m.offset),
                },
            )?;
        }

        Ok(mag.with_prescription(prescription))
    }

    pub fn initial_ray(&self) -> Result<Ray> {
        Ray::new(Vector3::from(self.ray.position), Vector3::from(self.ray.direction))
    }

    pub fn grid(&self) -> SweepGrid {
        SweepGrid {
            min_deg: self.sweep.min_deg,
            max_deg: self.sweep.max_deg,
            samples: self.sweep.samples,
        }
    }

    /// 相対位置の基準点。
    pub fn reference(&self, system: &MultiAxisGalvanometer) -> Vector3<f64> {
        match self.reference {
            Some(r) => Vector3::from(r),
            None => system.nominal_focus(),
        }
    }
}
