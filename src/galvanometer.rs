use log::{debug, trace};
use na::Vector3;
use nalgebra as na;
use thiserror::Error;

use super::element::{Interaction, Prescription};
use super::error::{OpticsError, Result};
use super::ray::{MissReason, Ray};

/// traceの途中でRayが素子に当たらなかったことを表す。
/// 特定の指令角で起きる想定内の結果で、そのサンプルは点なしとして扱う。
#[derive(Error, Debug, Clone, PartialEq)]
#[error("ray missed `{element}` at stage {stage}: {reason}")]
pub struct Miss {
    pub stage: usize,
    pub element: String,
    pub reason: MissReason,
}

/// 多軸ガルバノスキャナ。
/// 光学系の処方を保持し、セットされたRayを処方に沿って焦点面まで追跡する。
#[derive(Debug, Clone)]
pub struct MultiAxisGalvanometer {
    focus_distance: f64,
    galvo_gap: f64,
    prescription: Prescription,
    ray: Option<Ray>,
}

fn check_finite(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(OpticsError::InvalidParameter { name, value })
    }
}

impl MultiAxisGalvanometer {
    /// 焦点距離[focus_distance]とミラー間隔[galvo_gap]から標準の処方で作る。
    pub fn new(focus_distance: f64, galvo_gap: f64) -> Result<Self> {
        let focus_distance = check_finite("focus_distance", focus_distance)?;
        let galvo_gap = check_finite("galvo_gap", galvo_gap)?;
        Ok(Self {
            focus_distance,
            galvo_gap,
            prescription: Prescription::multi_axis(focus_distance, galvo_gap)?,
            ray: None,
        })
    }

    /// 処方を差し替える。取り付け誤差を入れた処方などに使う。
    pub fn with_prescription(mut self, prescription: Prescription) -> Self {
        self.prescription = prescription;
        self
    }

    pub fn focus_distance(&self) -> f64 {
        self.focus_distance
    }

    pub fn galvo_gap(&self) -> f64 {
        self.galvo_gap
    }

    pub fn prescription(&self) -> &Prescription {
        &self.prescription
    }

    /// 設計上の焦点。指令角0で焦点面に当たるはずの点。
    pub fn nominal_focus(&self) -> Vector3<f64> {
        Vector3::new(self.galvo_gap, 180.0, 170.0 - self.focus_distance)
    }

    /// 追跡するRayをセットする。前にセットしたRayは捨てる。
    pub fn bind_ray(&mut self, ray: Ray) {
        self.ray = Some(ray);
    }

    pub fn ray(&self) -> Option<&Ray> {
        self.ray.as_ref()
    }

    pub fn take_ray(&mut self) -> Option<Ray> {
        self.ray.take()
    }

    /// セットされたRayを指令角(度)で追跡し、焦点面との交点を返す。
    ///
    /// Rayは追跡に沿って書き換えられる。
    /// どこかの素子に当たらなかった場合は`Ok(None)`。
    /// Rayがセットされていない場合はエラー。
    pub fn trace(&mut self, angle_x_deg: f64, angle_y_deg: f64) -> Result<Option<Vector3<f64>>> {
        let mut ray = self.ray.take().ok_or(OpticsError::NoRayBound)?;
        let result = self.trace_ray(&mut ray, angle_x_deg, angle_y_deg);
        self.ray = Some(ray);

        match result {
            Ok(point) => Ok(Some(point)),
            Err(miss) => {
                debug!("({}, {}): {}", angle_x_deg, angle_y_deg, miss);
                Ok(None)
            }
        }
    }

    /// 処方の素子を順にたどってRayを進める。
    ///
    /// 各素子で平面と交差して位置を確定し、その後に反射や屈折を行う。
    /// 当たらなかった素子があればそこで打ち切り、以降の素子は処理しない。
    pub fn trace_ray(
        &self,
        ray: &mut Ray,
        angle_x_deg: f64,
        angle_y_deg: f64,
    ) -> std::result::Result<Vector3<f64>, Miss> {
        for (stage, element) in self.prescription.elements().iter().enumerate() {
            let plane = element.plane_for(angle_x_deg, angle_y_deg);

            let hit = ray.compute_intersection(&plane).map_err(|reason| Miss {
                stage,
                element: element.name.clone(),
                reason,
            })?;
            ray.commit_position(hit.point);

            match element.interaction {
                Interaction::Reflect => ray.reflect(&plane.normal),
                Interaction::Refract { k } => ray.refract(k, &plane.normal),
                Interaction::Intersect => (),
            }

            trace!(
                "stage {} `{}`: position {:?}, direction {:?}",
                stage,
                element.name,
                ray.position.as_slice(),
                ray.direction.as_slice()
            );
        }

        Ok(ray.position)
    }
}
