use na::{Unit, Vector3};
use nalgebra as na;
use thiserror::Error;

use super::error::Result;
use super::geometry::{normalize, Plane, MIN_NORM};
use super::rotation::rotate_about_axis;

/// Rayと平面が平行とみなす閾値。
const PARALLEL_EPSILON: f64 = 1e-10;

/// Rayが平面に当たらなかった理由。
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissReason {
    #[error("ray is parallel to the plane")]
    Parallel,
    #[error("plane is behind the ray origin")]
    Behind,
}

/// Rayと平面の交差の結果。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub t: f64,
    pub point: Vector3<f64>,
}

/// 光線を表す構造体。
/// 位置[position]と単位ベクトルの方向[direction]を持ち、
/// 反射、屈折、平面との交差で自身を書き換えながら光学系を進んでいく。
#[derive(Debug, Clone, PartialEq)]
pub struct Ray {
    pub position: Vector3<f64>,
    pub direction: Unit<Vector3<f64>>,
}

impl Ray {
    /// 方向を正規化してRayを作る。
    /// 方向が長さ0の場合はエラー。
    pub fn new(position: Vector3<f64>, direction: Vector3<f64>) -> Result<Self> {
        Ok(Self {
            position,
            direction: normalize(direction, "ray direction")?,
        })
    }

    /// position + t * direction
    pub fn point_at(&self, t: f64) -> Vector3<f64> {
        self.position + t * self.direction.as_ref()
    }

    /// 方向に沿って[distance]だけ進める。
    pub fn advance(&mut self, distance: f64) {
        self.position = self.point_at(distance);
    }

    /// 法線[normal]の面で鏡面反射する。
    /// d' = d − 2(d・n)n
    pub fn reflect(&mut self, normal: &Unit<Vector3<f64>>) {
        let d = self.direction.as_ref();
        let n = normal.as_ref();
        self.direction = Unit::new_normalize(d - 2.0 * d.dot(n) * n);
    }

    /// 偏向係数[k]による屈折。
    ///
    /// 入射角θに対して、法線方向の成分を 1/√(1+k²θ²)、
    /// 面内方向の成分を kθ/√(1+k²θ²) とした方向に曲げる。
    /// 通常のSnellの法則ではなく、fθレンズを近似する角度偏向のモデル。
    ///
    /// 面内方向の成分が0の場合(法線に沿って入射した場合)は横方向には曲げない。
    pub fn refract(&mut self, k: f64, normal: &Unit<Vector3<f64>>) {
        let d = self.direction.into_inner();
        let n = normal.into_inner();

        let cos_theta = -d.dot(&n);
        let theta = if cos_theta.abs() >= 1.0 {
            0.0
        } else {
            cos_theta.acos()
        };
        let scale = (1.0 + k * k * theta * theta).sqrt();

        let perpendicular = -n / scale;
        let parallel = match (d + cos_theta * n).try_normalize(MIN_NORM) {
            Some(lateral) => (k * theta / scale) * lateral,
            None => Vector3::zeros(),
        };

        // perpendicularとparallelは直交していて、perpendicularは0にならない。
        self.direction = Unit::new_normalize(perpendicular + parallel);
    }

    /// 平面との交差を計算する。Ray自体は変更しない。
    pub fn compute_intersection(&self, plane: &Plane) -> std::result::Result<Intersection, MissReason> {
        let n = plane.normal.as_ref();
        let denom = self.direction.dot(n);
        if denom.abs() < PARALLEL_EPSILON {
            return Err(MissReason::Parallel);
        }

        let t = (plane.point - self.position).dot(n) / denom;
        if t < 0.0 {
            return Err(MissReason::Behind);
        }

        Ok(Intersection {
            t,
            point: self.point_at(t),
        })
    }

    /// 位置を書き換える。
    pub fn commit_position(&mut self, point: Vector3<f64>) {
        self.position = point;
    }

    /// 平面と交差するならそこまで進めて新しい位置を返す。
    /// 交差しないならNoneを返し、位置は変わらない。
    pub fn intersect_plane(&mut self, plane: &Plane) -> Option<Vector3<f64>> {
        let hit = self.compute_intersection(plane).ok()?;
        self.commit_position(hit.point);
        Some(hit.point)
    }

    /// 2枚のスキャンミラーでの走査。
    ///
    /// 1枚目の法線[n1]を[axis1]まわりに[angle1_deg]度、
    /// 2枚目の法線[n2]を[axis2]まわりに[angle2_deg]度回転させ、
    /// それぞれの面と交差して反射する。
    /// どちらかの面に当たらなかった場合はそこで止めてNoneを返す。
    pub fn scan(
        &mut self,
        p1: Vector3<f64>,
        p2: Vector3<f64>,
        n1: &Unit<Vector3<f64>>,
        n2: &Unit<Vector3<f64>>,
        axis1: &Unit<Vector3<f64>>,
        axis2: &Unit<Vector3<f64>>,
        angle1_deg: f64,
        angle2_deg: f64,
    ) -> Option<Vector3<f64>> {
        let n1 = rotate_about_axis(n1, axis1, angle1_deg.to_radians());
        self.intersect_plane(&Plane::from_unit(n1, p1))?;
        self.reflect(&n1);

        let n2 = rotate_about_axis(n2, axis2, angle2_deg.to_radians());
        let hit = self.intersect_plane(&Plane::from_unit(n2, p2))?;
        self.reflect(&n2);
        Some(hit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn unit(x: f64, y: f64, z: f64) -> Unit<Vector3<f64>> {
        Unit::new_normalize(Vector3::new(x, y, z))
    }

    #[test]
    fn new_normalizes_direction() {
        let ray = Ray::new(Vector3::zeros(), Vector3::new(0.0, 3.0, 4.0)).unwrap();
        assert_abs_diff_eq!(ray.direction.into_inner(), Vector3::new(0.0, 0.6, 0.8), epsilon = 1e-12);
    }

    #[test]
    fn new_rejects_zero_direction() {
        assert!(Ray::new(Vector3::zeros(), Vector3::zeros()).is_err());
    }

    #[test]
    fn point_at_and_advance() {
        let mut ray = Ray::new(Vector3::new(1.0, 2.0, 3.0), Vector3::new(0.0, 0.0, 2.0)).unwrap();
        assert_abs_diff_eq!(ray.point_at(5.0), Vector3::new(1.0, 2.0, 8.0), epsilon = 1e-12);
        assert_abs_diff_eq!(ray.position, Vector3::new(1.0, 2.0, 3.0));

        ray.advance(-3.0);
        assert_abs_diff_eq!(ray.position, Vector3::new(1.0, 2.0, 0.0), epsilon = 1e-12);
        assert_abs_diff_eq!(ray.direction.into_inner(), Vector3::z(), epsilon = 1e-12);
    }

    #[test]
    fn reflect_off_45_degree_mirror() {
        let mut ray = Ray::new(Vector3::zeros(), Vector3::y()).unwrap();
        ray.reflect(&unit(0.0, 1.0, -1.0));
        assert_abs_diff_eq!(ray.direction.into_inner(), Vector3::z(), epsilon = 1e-12);
    }

    #[test]
    fn reflect_twice_is_identity() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..500 {
            let d = Vector3::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            );
            let n: Vector3<f64> = Vector3::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            );
            let (ray, n) = match (Ray::new(Vector3::zeros(), d), Unit::try_new(n, 1e-3)) {
                (Ok(ray), Some(n)) => (ray, n),
                _ => continue,
            };
            let mut twice = ray.clone();
            twice.reflect(&n);
            twice.reflect(&n);
            assert_abs_diff_eq!(
                twice.direction.into_inner(),
                ray.direction.into_inner(),
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn refract_normal_incidence_passes_straight() {
        let mut ray = Ray::new(Vector3::zeros(), -Vector3::z()).unwrap();
        ray.refract(-1.0, &Vector3::z_axis());
        assert_abs_diff_eq!(ray.direction.into_inner(), -Vector3::z(), epsilon = 1e-12);
    }

    #[test]
    fn refract_deflects_by_angle_law() {
        // 入射角θに対して、屈折後の面内成分/法線成分の比は |k|θ になる。
        let theta = 10f64.to_radians();
        let d = Vector3::new(0.0, theta.sin(), -theta.cos());
        let mut ray = Ray::new(Vector3::zeros(), d).unwrap();
        ray.refract(-1.0, &Vector3::z_axis());

        let out = ray.direction.into_inner();
        assert_abs_diff_eq!(out.x, 0.0, epsilon = 1e-12);
        assert!(out.z < 0.0);
        // k = -1 なので面内方向は反転する。
        assert!(out.y < 0.0);
        assert_abs_diff_eq!(out.y.abs() / out.z.abs(), theta, epsilon = 1e-12);
        assert_abs_diff_eq!(out.norm(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn refract_with_zero_k_follows_normal() {
        let mut ray = Ray::new(Vector3::zeros(), Vector3::new(1.0, 1.0, -1.0)).unwrap();
        ray.refract(0.0, &Vector3::z_axis());
        assert_abs_diff_eq!(ray.direction.into_inner(), -Vector3::z(), epsilon = 1e-12);
    }

    #[test]
    fn intersect_known_point() {
        let target = Vector3::new(3.0, 4.0, 0.0);
        let origin = Vector3::new(-2.0, 1.0, 10.0);
        let mut ray = Ray::new(origin, target - origin).unwrap();
        let plane = Plane::new(Vector3::z(), Vector3::new(7.0, -7.0, 0.0)).unwrap();

        let hit = ray.compute_intersection(&plane).unwrap();
        assert_abs_diff_eq!(hit.point, target, epsilon = 1e-9);
        assert_abs_diff_eq!(hit.t, (target - origin).norm(), epsilon = 1e-9);
        // compute_intersectionは位置を変えない。
        assert_abs_diff_eq!(ray.position, origin);

        let p = ray.intersect_plane(&plane).unwrap();
        assert_abs_diff_eq!(p, target, epsilon = 1e-9);
        assert_abs_diff_eq!(ray.position, target, epsilon = 1e-9);
    }

    #[test]
    fn intersect_parallel_and_behind() {
        let plane = Plane::new(Vector3::z(), Vector3::zeros()).unwrap();

        let mut parallel = Ray::new(Vector3::new(0.0, 0.0, 5.0), Vector3::x()).unwrap();
        assert_eq!(parallel.compute_intersection(&plane), Err(MissReason::Parallel));
        assert!(parallel.intersect_plane(&plane).is_none());
        assert_abs_diff_eq!(parallel.position, Vector3::new(0.0, 0.0, 5.0));

        let mut away = Ray::new(Vector3::new(0.0, 0.0, 5.0), Vector3::z()).unwrap();
        assert_eq!(away.compute_intersection(&plane), Err(MissReason::Behind));
        assert!(away.intersect_plane(&plane).is_none());
        assert_abs_diff_eq!(away.position, Vector3::new(0.0, 0.0, 5.0));
    }

    #[test]
    fn scan_with_zero_angles_folds_the_beam() {
        // fixed mirror 2 の後と同じ状態から始める。
        let mut ray = Ray::new(Vector3::new(0.0, 20.0, 200.0), Vector3::y()).unwrap();
        let hit = ray
            .scan(
                Vector3::new(0.0, 180.0, 200.0),
                Vector3::new(13.05, 180.0, 200.0),
                &unit(-1.0, 1.0, 0.0),
                &unit(1.0, 0.0, 1.0),
                &Vector3::z_axis(),
                &Vector3::y_axis(),
                0.0,
                0.0,
            )
            .unwrap();
        assert_abs_diff_eq!(hit, Vector3::new(13.05, 180.0, 200.0), epsilon = 1e-9);
        assert_abs_diff_eq!(ray.direction.into_inner(), -Vector3::z(), epsilon = 1e-12);
    }

    #[test]
    fn scan_stops_on_first_miss() {
        let mut ray = Ray::new(Vector3::new(0.0, 20.0, 200.0), Vector3::y()).unwrap();
        let before = ray.clone();
        // 45度回すと1枚目の法線が(-1,0,0)になりRayと平行になる。
        let hit = ray.scan(
            Vector3::new(0.0, 180.0, 200.0),
            Vector3::new(13.05, 180.0, 200.0),
            &unit(-1.0, 1.0, 0.0),
            &unit(1.0, 0.0, 1.0),
            &Vector3::z_axis(),
            &Vector3::y_axis(),
            45.0,
            0.0,
        );
        assert!(hit.is_none());
        assert_eq!(ray, before);
    }
}
