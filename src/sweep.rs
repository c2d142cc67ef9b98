use std::time::Instant;

use log::info;
use na::Vector3;
use nalgebra as na;

use super::galvanometer::MultiAxisGalvanometer;
use super::ray::Ray;

/// [start]から[end]までを両端を含めて[n]等分した値を返す。
/// n == 1 ならstartだけ、n == 0 なら空。
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => vec![],
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// X、Yの指令角を同じ範囲でふる格子。
#[derive(Debug, Clone, PartialEq)]
pub struct SweepGrid {
    pub min_deg: f64,
    pub max_deg: f64,
    pub samples: usize,
}

impl SweepGrid {
    pub fn angles(&self) -> Vec<f64> {
        linspace(self.min_deg, self.max_deg, self.samples)
    }

    pub fn len(&self) -> usize {
        self.samples * self.samples
    }

    pub fn is_empty(&self) -> bool {
        self.samples == 0
    }
}

impl Default for SweepGrid {
    fn default() -> Self {
        Self {
            min_deg: -11.0,
            max_deg: 11.0,
            samples: 11,
        }
    }
}

/// 一つの指令角の組に対する結果。当たらなかった場合は[point]がNone。
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub angle_x: f64,
    pub angle_y: f64,
    pub point: Option<Vector3<f64>>,
}

/// スイープ結果の集計。
#[derive(Debug, Clone, PartialEq)]
pub struct SweepSummary {
    pub hits: usize,
    pub misses: usize,
    /// 当たった点のX,Yの範囲。(min, max)
    pub extent: Option<(Vector3<f64>, Vector3<f64>)>,
}

impl SweepSummary {
    pub fn of(samples: &[Sample]) -> Self {
        let mut hits = 0;
        let mut extent: Option<(Vector3<f64>, Vector3<f64>)> = None;
        for p in samples.iter().filter_map(|s| s.point.as_ref()) {
            hits += 1;
            extent = Some(match extent {
                None => (*p, *p),
                Some((lo, hi)) => (lo.inf(p), hi.sup(p)),
            });
        }
        Self {
            hits,
            misses: samples.len() - hits,
            extent,
        }
    }
}

/// 指令角の格子でガルバノスキャナをスイープする。
///
/// サンプルごとに[initial]を複製した新しいRayを使うので、前のサンプルの状態は持ち越さない。
/// 順序はXが外側、Yが内側のループで、結果は常に samples² 個になる。
pub fn run(system: &MultiAxisGalvanometer, initial: &Ray, grid: &SweepGrid) -> Vec<Sample> {
    info!(
        "Start sweep: {}x{} samples over [{}, {}] deg.",
        grid.samples, grid.samples, grid.min_deg, grid.max_deg
    );
    let start = Instant::now();

    let angles = grid.angles();
    let mut samples = Vec::with_capacity(grid.len());
    for &angle_x in angles.iter() {
        for &angle_y in angles.iter() {
            let mut mag = system.clone();
            mag.bind_ray(initial.clone());
            // Rayをbindした直後なのでNoRayBoundにはならない。
            let point = mag.trace(angle_x, angle_y).unwrap_or(None);
            samples.push(Sample {
                angle_x,
                angle_y,
                point,
            });
        }
    }

    let end = start.elapsed();
    let summary = SweepSummary::of(&samples);
    info!(
        "Finish sweep: {} hits, {} misses in {}.{:03}s",
        summary.hits,
        summary.misses,
        end.as_secs(),
        end.subsec_millis()
    );

    samples
}

/// 各点から基準点[reference]を引いて相対位置にする。当たらなかったサンプルはそのまま。
pub fn relative_to(samples: &[Sample], reference: &Vector3<f64>) -> Vec<Sample> {
    samples
        .iter()
        .map(|s| Sample {
            point: s.point.map(|p| p - reference),
            ..s.clone()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn fresh_ray() -> Ray {
        Ray::new(Vector3::zeros(), Vector3::y()).unwrap()
    }

    #[test]
    fn linspace_includes_endpoints() {
        let v = linspace(-11.0, 11.0, 5);
        assert_eq!(v, vec![-11.0, -5.5, 0.0, 5.5, 11.0]);
        assert_eq!(linspace(2.0, 9.0, 1), vec![2.0]);
        assert!(linspace(0.0, 1.0, 0).is_empty());
    }

    #[test]
    fn sweep_produces_n_squared_samples_in_order() {
        let mag = MultiAxisGalvanometer::new(165.0, 13.05).unwrap();
        let grid = SweepGrid {
            min_deg: -11.0,
            max_deg: 11.0,
            samples: 4,
        };
        let samples = run(&mag, &fresh_ray(), &grid);
        assert_eq!(samples.len(), 16);
        assert_eq!((samples[0].angle_x, samples[0].angle_y), (-11.0, -11.0));
        assert_eq!((samples[1].angle_x, samples[1].angle_y), (-11.0, grid.angles()[1]));
        assert_eq!((samples[15].angle_x, samples[15].angle_y), (11.0, 11.0));
        assert!(samples.iter().all(|s| s.point.is_some()));
    }

    #[test]
    fn sweep_keeps_rows_for_misses() {
        let mag = MultiAxisGalvanometer::new(165.0, 13.05).unwrap();
        let grid = SweepGrid {
            min_deg: -45.0,
            max_deg: 45.0,
            samples: 3,
        };
        let samples = run(&mag, &fresh_ray(), &grid);
        assert_eq!(samples.len(), 9);

        let summary = SweepSummary::of(&samples);
        assert_eq!(summary.hits + summary.misses, 9);
        // 中央の(0,0)だけが当たる。±45度はどちらかのスキャンミラー以降で平行になる。
        assert_eq!(summary.hits, 1);
        assert_abs_diff_eq!(samples[4].point.unwrap(), Vector3::new(13.05, 180.0, 5.0), epsilon = 1e-6);
    }

    #[test]
    fn sweep_does_not_touch_system_or_initial_ray() {
        let mag = MultiAxisGalvanometer::new(165.0, 13.05).unwrap();
        let ray = fresh_ray();
        run(&mag, &ray, &SweepGrid::default());
        assert!(mag.ray().is_none());
        assert_eq!(ray, fresh_ray());
    }

    #[test]
    fn relative_points_center_on_reference() {
        let mag = MultiAxisGalvanometer::new(165.0, 13.05).unwrap();
        let grid = SweepGrid {
            min_deg: -11.0,
            max_deg: 11.0,
            samples: 3,
        };
        let samples = relative_to(&run(&mag, &fresh_ray(), &grid), &mag.nominal_focus());
        let center = samples[4].point.unwrap();
        assert_abs_diff_eq!(center, Vector3::zeros(), epsilon = 1e-6);

        // 対称な格子なので相対位置の和は0になる。
        let sum: Vector3<f64> = samples.iter().filter_map(|s| s.point).sum();
        assert_abs_diff_eq!(sum, Vector3::zeros(), epsilon = 1e-6);
    }

    #[test]
    fn summary_extent() {
        let samples = vec![
            Sample {
                angle_x: 0.0,
                angle_y: 0.0,
                point: Some(Vector3::new(1.0, -2.0, 0.0)),
            },
            Sample {
                angle_x: 0.0,
                angle_y: 1.0,
                point: None,
            },
            Sample {
                angle_x: 1.0,
                angle_y: 0.0,
                point: Some(Vector3::new(-3.0, 4.0, 0.0)),
            },
        ];
        let summary = SweepSummary::of(&samples);
        assert_eq!((summary.hits, summary.misses), (2, 1));
        let (lo, hi) = summary.extent.unwrap();
        assert_eq!(lo, Vector3::new(-3.0, -2.0, 0.0));
        assert_eq!(hi, Vector3::new(1.0, 4.0, 0.0));
    }
}
