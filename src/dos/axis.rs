//! # 坐标轴范围估计
//!
//! x 轴固定为以费米能为中心的窗口；y 轴取窗口内曲线最大值，
//! 封顶后乘以 1.05 留白。封顶只影响显示范围，不修改曲线数据。
//!
//! ## 依赖关系
//! - 被 `dos/plot.rs` 和 `commands/` 调用
//! - 使用 `models/dos.rs`

use crate::models::{AxisBounds, Curve};

/// 默认能量窗口 (eV, 相对费米能)
pub const DEFAULT_X_WINDOW: (f64, f64) = (-6.0, 6.0);

/// 默认 y 轴封顶值
pub const DEFAULT_Y_CAP: f64 = 5.0;

/// y 轴留白系数
pub const HEADROOM: f64 = 1.05;

/// 坐标轴估计器
#[derive(Debug, Clone, Copy)]
pub struct AxisEstimator {
    pub x_min: f64,
    pub x_max: f64,
    pub y_cap: f64,
}

impl Default for AxisEstimator {
    fn default() -> Self {
        AxisEstimator {
            x_min: DEFAULT_X_WINDOW.0,
            x_max: DEFAULT_X_WINDOW.1,
            y_cap: DEFAULT_Y_CAP,
        }
    }
}

impl AxisEstimator {
    pub fn new(x_min: f64, x_max: f64, y_cap: f64) -> Self {
        AxisEstimator {
            x_min,
            x_max,
            y_cap,
        }
    }

    /// 非自旋曲线: y ∈ [0, 1.05 × min(窗口内最大值, cap)]
    pub fn estimate(&self, curves: &[&Curve]) -> AxisBounds {
        let peak = curves
            .iter()
            .map(|c| self.window_max(c))
            .fold(0.0_f64, f64::max);

        AxisBounds {
            x_min: self.x_min,
            x_max: self.x_max,
            y_min: 0.0,
            y_max: HEADROOM * peak.min(self.y_cap),
        }
    }

    /// 自旋极化: up 与 down 分别封顶，down 画在负半轴
    ///
    /// `down` 曲线的值为正 (未取反)。
    pub fn estimate_spin(&self, up: &[&Curve], down: &[&Curve]) -> AxisBounds {
        let up_max = up.iter().map(|c| self.window_max(c)).fold(0.0_f64, f64::max);
        let down_max = down
            .iter()
            .map(|c| self.window_max(c))
            .fold(0.0_f64, f64::max);

        AxisBounds {
            x_min: self.x_min,
            x_max: self.x_max,
            y_min: -HEADROOM * down_max.min(self.y_cap),
            y_max: HEADROOM * up_max.min(self.y_cap),
        }
    }

    /// 窗口 [x_min, x_max] 内的最大值 (负值记为 0)
    fn window_max(&self, curve: &Curve) -> f64 {
        curve
            .points()
            .filter(|(e, _)| *e >= self.x_min && *e <= self.x_max)
            .map(|(_, v)| v)
            .fold(0.0_f64, f64::max)
    }
}

/// 全数据范围 (用户指定 plot-range 时不做自动裁剪)
pub fn data_bounds(curves: &[&Curve]) -> AxisBounds {
    let mut bounds = AxisBounds {
        x_min: f64::INFINITY,
        x_max: f64::NEG_INFINITY,
        y_min: 0.0,
        y_max: 0.0,
    };
    for (e, v) in curves.iter().flat_map(|c| c.points()) {
        bounds.x_min = bounds.x_min.min(e);
        bounds.x_max = bounds.x_max.max(e);
        bounds.y_min = bounds.y_min.min(v);
        bounds.y_max = bounds.y_max.max(v);
    }
    if !bounds.x_min.is_finite() {
        let (x_min, x_max) = DEFAULT_X_WINDOW;
        bounds.x_min = x_min;
        bounds.x_max = x_max;
    }
    bounds.y_min *= HEADROOM;
    bounds.y_max *= HEADROOM;
    bounds
}

/// y 轴整数刻度: 0..ceil(y_max)，自旋时对称延伸到负半轴
pub fn y_ticks(bounds: &AxisBounds) -> Vec<f64> {
    let top = bounds.y_max.max(0.0).ceil() as i64;
    let bottom = if bounds.y_min < 0.0 {
        -((-bounds.y_min).ceil() as i64) + 1
    } else {
        0
    };
    (bottom..top).map(|t| t as f64).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve(points: &[(f64, f64)]) -> Curve {
        Curve {
            energies: points.iter().map(|p| p.0).collect(),
            values: points.iter().map(|p| p.1).collect(),
        }
    }

    #[test]
    fn test_peak_above_cap_is_clipped() {
        let c = curve(&[(-1.0, 1.0), (0.0, 7.2), (1.0, 2.0)]);
        let bounds = AxisEstimator::default().estimate(&[&c]);
        assert_eq!(bounds.x_min, -6.0);
        assert_eq!(bounds.x_max, 6.0);
        assert_eq!(bounds.y_min, 0.0);
        assert!((bounds.y_max - 5.25).abs() < 1e-12);
        // 曲线本身不变
        assert_eq!(c.values[1], 7.2);
    }

    #[test]
    fn test_peak_below_cap() {
        let c = curve(&[(-1.0, 3.0), (0.0, 1.0)]);
        let bounds = AxisEstimator::default().estimate(&[&c]);
        assert!((bounds.y_max - 3.15).abs() < 1e-12);
    }

    #[test]
    fn test_peaks_outside_window_ignored() {
        let c = curve(&[(-10.0, 4.5), (-2.0, 1.0), (8.0, 4.0)]);
        let bounds = AxisEstimator::default().estimate(&[&c]);
        assert!((bounds.y_max - 1.05).abs() < 1e-12);
    }

    #[test]
    fn test_multiple_curves_use_largest() {
        let a = curve(&[(0.0, 1.0)]);
        let b = curve(&[(0.0, 2.0)]);
        let bounds = AxisEstimator::default().estimate(&[&a, &b]);
        assert!((bounds.y_max - 2.1).abs() < 1e-12);
    }

    #[test]
    fn test_spin_bounds_are_independent() {
        let up = curve(&[(0.0, 2.0), (1.0, 9.0)]);
        let down = curve(&[(0.0, 1.0), (1.0, 3.0)]);
        let bounds = AxisEstimator::default().estimate_spin(&[&up], &[&down]);
        assert!((bounds.y_max - 5.25).abs() < 1e-12);
        assert!((bounds.y_min + 3.15).abs() < 1e-12);
    }

    #[test]
    fn test_y_ticks() {
        let bounds = AxisBounds {
            x_min: -6.0,
            x_max: 6.0,
            y_min: 0.0,
            y_max: 3.15,
        };
        assert_eq!(y_ticks(&bounds), vec![0.0, 1.0, 2.0, 3.0]);

        let spin = AxisBounds {
            y_min: -2.1,
            ..bounds
        };
        assert_eq!(y_ticks(&spin), vec![-2.0, -1.0, 0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_data_bounds() {
        let c = curve(&[(-10.0, 1.0), (5.0, 2.0)]);
        let b = data_bounds(&[&c]);
        assert_eq!(b.x_min, -10.0);
        assert_eq!(b.x_max, 5.0);
        assert!((b.y_max - 2.1).abs() < 1e-12);
    }
}
