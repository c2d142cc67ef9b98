use na::{Unit, Vector3};
use nalgebra as na;

use super::error::{OpticsError, Result};
use super::geometry::{normalize, Plane};
use super::rotation::{rotate_about_axis, rotate_euler_xyz, translate_position};

/// 光学素子でRayに起きる相互作用。
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Interaction {
    /// 鏡面反射
    Reflect,
    /// 偏向係数kでの屈折
    Refract { k: f64 },
    /// 交差するだけ。焦点面など。
    Intersect,
}

/// スキャンミラーがどちらの指令角で回転するか。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanChannel {
    X,
    Y,
}

/// スキャンミラーの回転軸と、駆動する指令角のチャンネル。
#[derive(Debug, Clone, PartialEq)]
pub struct Steering {
    pub axis: Unit<Vector3<f64>>,
    pub channel: ScanChannel,
}

/// 取り付け誤差。
/// [tilt_deg]はX,Y,Z軸まわりの角度誤差(度)、[offset]は位置のずれ。
#[derive(Debug, Clone, PartialEq)]
pub struct Misalignment {
    pub tilt_deg: Vector3<f64>,
    pub offset: Vector3<f64>,
}

/// 光学素子。
/// 平面[plane]とそこでの相互作用[interaction]を持つ。
/// [steering]がある場合はtraceのたびに指令角で法線を回転させてから使う。
#[derive(Debug, Clone, PartialEq)]
pub struct OpticalElement {
    pub name: String,
    pub interaction: Interaction,
    pub plane: Plane,
    pub steering: Option<Steering>,
}

impl OpticalElement {
    pub fn new(name: &str, interaction: Interaction, plane: Plane) -> Self {
        Self {
            name: name.to_string(),
            interaction,
            plane,
            steering: None,
        }
    }

    /// スキャンミラーにする。
    pub fn steered(mut self, axis: Unit<Vector3<f64>>, channel: ScanChannel) -> Self {
        self.steering = Some(Steering { axis, channel });
        self
    }

    /// 指令角(度)に対する瞬間の法線を返す。
    pub fn normal_for(&self, angle_x_deg: f64, angle_y_deg: f64) -> Unit<Vector3<f64>> {
        match &self.steering {
            None => self.plane.normal,
            Some(Steering { axis, channel }) => {
                let angle = match channel {
                    ScanChannel::X => angle_x_deg,
                    ScanChannel::Y => angle_y_deg,
                };
                rotate_about_axis(&self.plane.normal, axis, angle.to_radians())
            }
        }
    }

    /// 指令角に対する瞬間の平面を返す。
    pub fn plane_for(&self, angle_x_deg: f64, angle_y_deg: f64) -> Plane {
        Plane::from_unit(self.normal_for(angle_x_deg, angle_y_deg), self.plane.point)
    }

    /// 取り付け誤差を適用する。法線はあおり角で回転、位置は平行移動する。
    pub fn misalign(&mut self, misalignment: &Misalignment) {
        self.plane.normal = rotate_euler_xyz(&self.plane.normal, &misalignment.tilt_deg);
        self.plane.point = translate_position(&self.plane.point, &misalignment.offset);
    }
}

/// 光学系の処方。Rayが通る順に並んだ光学素子の列。
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Prescription {
    elements: Vec<OpticalElement>,
}

impl Prescription {
    pub fn from_elements(elements: Vec<OpticalElement>) -> Self {
        Self { elements }
    }

    pub fn push(&mut self, element: OpticalElement) {
        self.elements.push(element);
    }

    pub fn elements(&self) -> &[OpticalElement] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// 2軸ガルバノスキャナの標準の処方。
    ///
    /// 固定ミラー2枚でビームを折り返し、X/Yスキャンミラーで走査して、
    /// フィールドレンズ(k = -1)で曲げて焦点面に当てる。
    /// 2枚目のスキャンミラー、フィールドレンズ、焦点面はX方向に[galvo_gap]だけずれている。
    pub fn multi_axis(focus_distance: f64, galvo_gap: f64) -> Result<Self> {
        let fold = Vector3::new(0.0, 1.0, -1.0);
        let axial = Vector3::z();

        let elements = vec![
            OpticalElement::new(
                "fixed mirror 1",
                Interaction::Reflect,
                Plane::new(fold, Vector3::new(0.0, 20.0, 0.0))?,
            ),
            OpticalElement::new(
                "fixed mirror 2",
                Interaction::Reflect,
                Plane::new(fold, Vector3::new(0.0, 20.0, 200.0))?,
            ),
            OpticalElement::new(
                "scan mirror X",
                Interaction::Reflect,
                Plane::new(Vector3::new(-1.0, 1.0, 0.0), Vector3::new(0.0, 180.0, 200.0))?,
            )
            .steered(Vector3::z_axis(), ScanChannel::X),
            OpticalElement::new(
                "scan mirror Y",
                Interaction::Reflect,
                Plane::new(Vector3::new(1.0, 0.0, 1.0), Vector3::new(galvo_gap, 180.0, 200.0))?,
            )
            .steered(Vector3::y_axis(), ScanChannel::Y),
            OpticalElement::new(
                "field lens",
                Interaction::Refract { k: -1.0 },
                Plane::new(axial, Vector3::new(galvo_gap, 180.0, 170.0))?,
            ),
            OpticalElement::new(
                "focal plane",
                Interaction::Intersect,
                Plane::new(axial, Vector3::new(galvo_gap, 180.0, 170.0 - focus_distance))?,
            ),
        ];

        Ok(Self { elements })
    }

    /// 名前で指定した素子に取り付け誤差を適用する。
    pub fn misaligned(mut self, name: &str, misalignment: &Misalignment) -> Result<Self> {
        let element = self
            .elements
            .iter_mut()
            .find(|e| e.name == name)
            .ok_or_else(|| OpticsError::UnknownElement(name.to_string()))?;
        element.misalign(misalignment);
        Ok(self)
    }
}

/// 設定ファイルなどから来る生の配列を回転軸に変換する。
pub fn axis_from(v: [f64; 3]) -> Result<Unit<Vector3<f64>>> {
    normalize(Vector3::from(v), "rotation axis")
}
