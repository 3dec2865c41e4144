//! # DOS 图表生成
//!
//! 使用 `plotters` 库绘制总 DOS 与投影 DOS 图。
//!
//! ## 功能
//! - 总 DOS: 黑色曲线 + 灰色填充；自旋极化时 down 通道画在负半轴
//! - 投影 DOS: 可选总 DOS 背景 + 每条投影曲线与半透明填充 + 图例
//! - 支持 PNG 和 SVG 输出
//!
//! ## 依赖关系
//! - 被 `commands/tdos.rs`, `commands/pdos.rs` 调用
//! - 使用 `dos/axis.rs` 计算刻度
//! - 使用 `plotters` 渲染图表

use crate::dos::axis;
use crate::error::{DosError, Result};
use crate::models::{AxisBounds, Curve, LabeledCurve, TotalDos};

use plotters::coord::combinators::WithKeyPoints;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::Path;
use tracing::warn;

const X_DESC: &str = "E - E_Fermi (eV)";
const Y_DESC: &str = "DOS (states/atom/eV)";

/// 未能识别颜色时的回退色
const FALLBACK_COLOR: RGBColor = RGBColor(0, 102, 204);
const TOTAL_LINE: RGBColor = RGBColor(0, 0, 0);
const TOTAL_FILL: RGBColor = RGBColor(187, 187, 187);

/// 图像输出选项
#[derive(Debug, Clone)]
pub struct PlotStyle {
    pub width: u32,
    pub height: u32,
    pub title: Option<String>,
    pub use_svg: bool,
}

/// 一条待绘制的曲线
struct Layer<'a> {
    curve: &'a Curve,
    line: RGBColor,
    fill: RGBColor,
    fill_alpha: f64,
    label: Option<String>,
}

/// 绘制总 DOS
pub fn plot_total_dos(
    total: &TotalDos,
    bounds: &AxisBounds,
    output_path: &Path,
    style: &PlotStyle,
) -> Result<()> {
    let up = total
        .channel_curve(0)
        .ok_or_else(|| DosError::PlotError("total DOS has no channels".to_string()))?;
    let down = if total.spin.is_polarized() {
        total.channel_curve(1).map(|c| c.negated())
    } else {
        None
    };

    let mut layers = vec![Layer {
        curve: &up,
        line: TOTAL_LINE,
        fill: TOTAL_FILL,
        fill_alpha: 0.5,
        label: down.as_ref().map(|_| "up".to_string()),
    }];
    if let Some(ref down) = down {
        layers.push(Layer {
            curve: down,
            line: TOTAL_LINE,
            fill: TOTAL_FILL,
            fill_alpha: 0.5,
            label: Some("down".to_string()),
        });
    }

    render(&layers, bounds, output_path, style)
}

/// 绘制投影 DOS，`total` 为可选的总 DOS 背景
pub fn plot_projected_dos(
    total: Option<&Curve>,
    curves: &[LabeledCurve],
    bounds: &AxisBounds,
    output_path: &Path,
    style: &PlotStyle,
) -> Result<()> {
    let mut layers = Vec::with_capacity(curves.len() + 1);

    if let Some(total) = total {
        layers.push(Layer {
            curve: total,
            line: TOTAL_FILL,
            fill: TOTAL_FILL,
            fill_alpha: 0.4,
            label: Some("total".to_string()),
        });
    }

    for c in curves {
        let color = parse_color(&c.color).unwrap_or_else(|| {
            warn!(color = %c.color, "unrecognised color, using default");
            FALLBACK_COLOR
        });
        layers.push(Layer {
            curve: &c.curve,
            line: color,
            fill: color,
            fill_alpha: 0.3,
            label: Some(c.label.clone()),
        });
    }

    render(&layers, bounds, output_path, style)
}

fn render(layers: &[Layer], bounds: &AxisBounds, output_path: &Path, style: &PlotStyle) -> Result<()> {
    if style.use_svg {
        let root = SVGBackend::new(output_path, (style.width, style.height)).into_drawing_area();
        draw_dos_chart(&root, layers, bounds, style.title.as_deref())?;
        root.present()
            .map_err(|e| DosError::PlotError(e.to_string()))?;
    } else {
        let root = BitMapBackend::new(output_path, (style.width, style.height)).into_drawing_area();
        draw_dos_chart(&root, layers, bounds, style.title.as_deref())?;
        root.present()
            .map_err(|e| DosError::PlotError(e.to_string()))?;
    }
    Ok(())
}

/// 绘制 DOS 图表的核心逻辑
fn draw_dos_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    layers: &[Layer],
    bounds: &AxisBounds,
    title: Option<&str>,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)
        .map_err(|e| DosError::PlotError(format!("{:?}", e)))?;

    let bounds = drawable(bounds);
    let y_range = y_axis(&bounds);
    let tick_count = y_range.key_points(usize::MAX).len();

    let mut chart = ChartBuilder::on(root)
        .margin(30)
        .x_label_area_size(60)
        .y_label_area_size(70)
        .build_cartesian_2d(bounds.x_min..bounds.x_max, y_range)
        .map_err(|e| DosError::PlotError(format!("{:?}", e)))?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc(X_DESC)
        .y_desc(Y_DESC)
        .y_labels(tick_count.max(2))
        .y_label_formatter(&|y| format!("{:.0}", y))
        .x_label_style(("sans-serif", 20))
        .y_label_style(("sans-serif", 20))
        .axis_desc_style(("sans-serif", 24))
        .draw()
        .map_err(|e| DosError::PlotError(format!("{:?}", e)))?;

    for layer in layers {
        let points = visible_points(layer.curve, &bounds);

        chart
            .draw_series(AreaSeries::new(
                points.iter().copied(),
                0.0,
                layer.fill.mix(layer.fill_alpha),
            ))
            .map_err(|e| DosError::PlotError(format!("{:?}", e)))?;

        let line = layer.line;
        let series = chart
            .draw_series(LineSeries::new(points.iter().copied(), line.stroke_width(2)))
            .map_err(|e| DosError::PlotError(format!("{:?}", e)))?;

        if let Some(ref label) = layer.label {
            series
                .label(label.clone())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], line.stroke_width(3)));
        }
    }

    if layers.iter().any(|l| l.label.is_some()) {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .label_font(("sans-serif", 20))
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .map_err(|e| DosError::PlotError(format!("{:?}", e)))?;
    }

    if let Some(title) = title {
        chart
            .draw_series(std::iter::once(Text::new(
                title.to_string(),
                ((-2.0_f64).max(bounds.x_min), bounds.y_max * 0.9),
                ("sans-serif", 28).into_font().color(&BLACK),
            )))
            .map_err(|e| DosError::PlotError(format!("{:?}", e)))?;
    }

    Ok(())
}

/// y 轴只在整数刻度处标注
fn y_axis(bounds: &AxisBounds) -> WithKeyPoints<RangedCoordf64> {
    (bounds.y_min..bounds.y_max).with_key_points(axis::y_ticks(bounds))
}

/// 避免零高度坐标系
fn drawable(bounds: &AxisBounds) -> AxisBounds {
    let mut b = *bounds;
    if b.y_max - b.y_min <= f64::EPSILON {
        b.y_max = b.y_min + 1.0;
    }
    if b.x_max - b.x_min <= f64::EPSILON {
        b.x_max = b.x_min + 1.0;
    }
    b
}

/// 裁剪到显示窗口内的点，y 值截断到坐标轴范围 (仅用于显示)
fn visible_points(curve: &Curve, bounds: &AxisBounds) -> Vec<(f64, f64)> {
    curve
        .points()
        .filter(|(e, _)| *e >= bounds.x_min && *e <= bounds.x_max)
        .map(|(e, v)| (e, v.clamp(bounds.y_min, bounds.y_max)))
        .collect()
}

/// 解析颜色: `#rrggbb`, `#rgb`, 常用颜色名与单字母缩写
pub fn parse_color(spec: &str) -> Option<RGBColor> {
    let s = spec.trim().to_lowercase();

    if let Some(hex) = s.strip_prefix('#') {
        if !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize, width: usize| u8::from_str_radix(&hex[i..i + width], 16).ok();
        return match hex.len() {
            6 => Some(RGBColor(channel(0, 2)?, channel(2, 2)?, channel(4, 2)?)),
            3 => {
                let (r, g, b) = (channel(0, 1)?, channel(1, 1)?, channel(2, 1)?);
                Some(RGBColor(r * 17, g * 17, b * 17))
            }
            _ => None,
        };
    }

    let rgb = match s.as_str() {
        "k" | "black" => (0, 0, 0),
        "w" | "white" => (255, 255, 255),
        "r" | "red" => (214, 39, 40),
        "g" | "green" => (44, 160, 44),
        "b" | "blue" => (31, 119, 180),
        "c" | "cyan" => (23, 190, 207),
        "m" | "magenta" => (227, 119, 194),
        "y" | "yellow" => (188, 189, 34),
        "orange" => (255, 127, 14),
        "purple" => (148, 103, 189),
        "brown" => (140, 86, 75),
        "pink" => (247, 182, 210),
        "gray" | "grey" => (127, 127, 127),
        "navy" => (0, 0, 128),
        "olive" => (128, 128, 0),
        "teal" => (0, 128, 128),
        _ => return None,
    };
    Some(RGBColor(rgb.0, rgb.1, rgb.2))
}
