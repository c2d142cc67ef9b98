use std::path::Path;

use image::{ImageBuffer, Rgb, RgbImage};
use log::info;
use na::Vector2;
use nalgebra as na;

use super::error::Result;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const AXIS: Rgb<u8> = Rgb([160, 160, 160]);
const MARKER: Rgb<u8> = Rgb([0, 0, 255]);

// マーカーの半径(px)。
const MARKER_RADIUS: i64 = 2;

/// 余白の割合。
const MARGIN: f64 = 0.05;

/// データ座標から画素座標への変換。
/// X,Yで同じ縮尺を使い、範囲の中央を画像の中央に合わせる。
struct Viewport {
    center: Vector2<f64>,
    scale: f64,
    width: u32,
    height: u32,
}

impl Viewport {
    fn fit(points: &[Vector2<f64>], width: u32, height: u32) -> Self {
        let (lo, hi) = match points.split_first() {
            None => (Vector2::new(-1.0, -1.0), Vector2::new(1.0, 1.0)),
            Some((first, rest)) => rest
                .iter()
                .fold((*first, *first), |(lo, hi), p| (lo.inf(p), hi.sup(p))),
        };
        let span = hi - lo;
        // 全ての点が一点に重なる場合は単位幅にする。
        let span_x = if span.x > 0.0 { span.x } else { 1.0 };
        let span_y = if span.y > 0.0 { span.y } else { 1.0 };

        let usable = 1.0 - 2.0 * MARGIN;
        let scale = (width as f64 * usable / span_x).min(height as f64 * usable / span_y);

        Self {
            center: (lo + hi) / 2.0,
            scale,
            width,
            height,
        }
    }

    /// 画素座標。Yは上向きが正なので反転させる。
    fn to_pixel(&self, p: &Vector2<f64>) -> (i64, i64) {
        let d = (p - self.center) * self.scale;
        let px = (self.width as f64 / 2.0 + d.x).round() as i64;
        let py = (self.height as f64 / 2.0 - d.y).round() as i64;
        (px, py)
    }

    fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < self.width as i64 && y < self.height as i64
    }
}

/// 焦点面上の点のX,Y分布を散布図として描く。
///
/// 白背景に、原点を通る灰色の軸(範囲内にある場合)と、点ごとの青い正方形のマーカーを描く。
/// 範囲は点から自動で決めて、5%の余白をとる。
pub fn render_scatter(points: &[Vector2<f64>], width: u32, height: u32) -> RgbImage {
    let mut img = ImageBuffer::from_pixel(width, height, BACKGROUND);
    let view = Viewport::fit(points, width, height);

    let (ox, oy) = view.to_pixel(&Vector2::zeros());
    if ox >= 0 && ox < width as i64 {
        for y in 0..height {
            img.put_pixel(ox as u32, y, AXIS);
        }
    }
    if oy >= 0 && oy < height as i64 {
        for x in 0..width {
            img.put_pixel(x, oy as u32, AXIS);
        }
    }

    for p in points {
        let (cx, cy) = view.to_pixel(p);
        for y in (cy - MARKER_RADIUS)..=(cy + MARKER_RADIUS) {
            for x in (cx - MARKER_RADIUS)..=(cx + MARKER_RADIUS) {
                if view.contains(x, y) {
                    img.put_pixel(x as u32, y as u32, MARKER);
                }
            }
        }
    }

    img
}

/// 散布図をPNGなどに保存する。形式は拡張子から決まる。
pub fn save_scatter<P: AsRef<Path>>(
    path: P,
    points: &[Vector2<f64>],
    width: u32,
    height: u32,
) -> Result<()> {
    let path = path.as_ref();
    render_scatter(points, width, height).save(path)?;
    info!("save scatter plot {}...", path.display());
    Ok(())
}
