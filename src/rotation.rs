use na::{Rotation3, Unit, Vector3};
use nalgebra as na;

/// Rodriguesの回転公式で[v]を[axis]まわりに[angle]ラジアン回転させる。
///
/// v_rot = v cosθ + (a × v) sinθ + a (a・v)(1 − cosθ)
///
/// 結果は数値誤差を落とすため再度正規化している。
pub fn rotate_about_axis(
    v: &Unit<Vector3<f64>>,
    axis: &Unit<Vector3<f64>>,
    angle: f64,
) -> Unit<Vector3<f64>> {
    let (sin, cos) = angle.sin_cos();
    let v = v.as_ref();
    let a = axis.as_ref();
    let rotated = v * cos + a.cross(v) * sin + a * a.dot(v) * (1.0 - cos);
    Unit::new_normalize(rotated)
}

/// X軸、Y軸、Z軸の順に固定軸まわりで回転させる。角度は度数法。
/// 合成される回転行列は Rz・Ry・Rx になる。
/// 光学素子の取り付け角度の誤差(あおり)を表すのに使う。
pub fn rotate_euler_xyz(v: &Unit<Vector3<f64>>, angles_deg: &Vector3<f64>) -> Unit<Vector3<f64>> {
    let rot = Rotation3::from_euler_angles(
        angles_deg.x.to_radians(),
        angles_deg.y.to_radians(),
        angles_deg.z.to_radians(),
    );
    Unit::new_normalize(rot * v.into_inner())
}

/// 位置を平行移動する。取り付け位置の誤差を表すのに使う。
pub fn translate_position(position: &Vector3<f64>, offset: &Vector3<f64>) -> Vector3<f64> {
    position + offset
}
