//! # tdos 命令实现
//!
//! 读取 DOSCAR 总 DOS 块并绘图。
//!
//! ## 依赖关系
//! - 使用 `cli/plot.rs` 定义的 TdosArgs
//! - 使用 `parsers/doscar.rs`, `dos/axis.rs`, `dos/plot.rs`

use super::{axis_estimator, for_each_input, plot_style, skip_existing, to_process_result};
use crate::cli::plot::TdosArgs;
use crate::config::PlotConfig;
use crate::dos::{axis, plot};
use crate::error::{DosError, Result};
use crate::models::{AxisBounds, DosHeader, SpinMode, TotalDos};
use crate::parsers::doscar;
use crate::utils::output;

use std::path::{Path, PathBuf};

/// 单个 DOSCAR 的绘图结果
#[derive(Debug)]
pub struct TdosReport {
    pub header: DosHeader,
    pub spin: SpinMode,
    pub bounds: AxisBounds,
    pub output: PathBuf,
}

/// 执行 tdos 命令
pub fn execute(args: TdosArgs) -> Result<()> {
    output::print_header("Total Density of States");

    let mut config = PlotConfig::load(args.input.config.as_deref())?;
    args.image.apply(&mut config, false);
    let overwrite = args.input.overwrite;

    for_each_input(
        &args.input,
        |path| {
            let report = plot_tdos(path, &config)?;
            output::print_success(&format!(
                "Read {} bins for {} atoms ({}), E_F = {:.4} eV",
                report.header.bin_count, report.header.atom_count, report.spin, report.header.fermi_energy
            ));
            output::print_info(&format!(
                "Axis: x [{:.1}, {:.1}], y [{:.2}, {:.2}]",
                report.bounds.x_min, report.bounds.x_max, report.bounds.y_min, report.bounds.y_max
            ));
            output::print_success(&format!("tDOS plot saved to '{}'", report.output.display()));
            Ok(())
        },
        |path| {
            let out = config.output_path(path, &config.tdos_name);
            if let Some(skipped) = skip_existing(&out, overwrite) {
                return skipped;
            }
            to_process_result(path, &out, plot_tdos(path, &config))
        },
    )
}

/// 读取、估计坐标范围并绘制总 DOS
pub fn plot_tdos(path: &Path, config: &PlotConfig) -> Result<TdosReport> {
    let (header, total) = doscar::read_total_dos(path)?;
    let bounds = total_bounds(&total, config)?;
    let output_path = config.output_path(path, &config.tdos_name);

    plot::plot_total_dos(&total, &bounds, &output_path, &plot_style(config))?;

    Ok(TdosReport {
        header,
        spin: total.spin,
        bounds,
        output: output_path,
    })
}

/// 总 DOS 的显示范围；自旋极化时 down 通道画在负半轴
pub fn total_bounds(total: &TotalDos, config: &PlotConfig) -> Result<AxisBounds> {
    let up = total
        .channel_curve(0)
        .ok_or_else(|| DosError::Other("total DOS has no channels".to_string()))?;

    let down = if total.spin.is_polarized() {
        total.channel_curve(1)
    } else {
        None
    };

    let bounds = match (&down, config.plot_range.is_some()) {
        (Some(down), true) => axis::data_bounds(&[&up, &down.negated()]),
        (None, true) => axis::data_bounds(&[&up]),
        (Some(down), false) => axis_estimator(config).estimate_spin(&[&up], &[down]),
        (None, false) => axis_estimator(config).estimate(&[&up]),
    };
    Ok(bounds)
}
