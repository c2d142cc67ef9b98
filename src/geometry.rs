use na::{Unit, Vector3};
use nalgebra as na;

use super::error::{OpticsError, Result};

/// これ以下のノルムのベクトルは正規化できないものとして扱う。
pub const MIN_NORM: f64 = 1e-12;

/// ベクトルを正規化する。
/// 長さ0のベクトルはNaNを作る代わりに[OpticsError::DegenerateVector]を返す。
/// [what]はエラーメッセージ用の名前。
pub fn normalize(v: Vector3<f64>, what: &str) -> Result<Unit<Vector3<f64>>> {
    Unit::try_new(v, MIN_NORM).ok_or_else(|| OpticsError::DegenerateVector {
        what: what.to_string(),
    })
}

/// 法線と面上の一点で表した無限平面。
#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    pub normal: Unit<Vector3<f64>>,
    pub point: Vector3<f64>,
}

impl Plane {
    /// 法線を正規化して平面を作る。
    pub fn new(normal: Vector3<f64>, point: Vector3<f64>) -> Result<Self> {
        Ok(Self {
            normal: normalize(normal, "plane normal")?,
            point,
        })
    }

    pub fn from_unit(normal: Unit<Vector3<f64>>, point: Vector3<f64>) -> Self {
        Self { normal, point }
    }
}
