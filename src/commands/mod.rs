//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `parsers/`, `dos/`, `batch/`, `utils/`
//! - 子模块: tdos, pdos, export

pub mod export;
pub mod pdos;
pub mod tdos;

use crate::batch::{BatchRunner, FileCollector, ProcessResult};
use crate::cli::plot::InputArgs;
use crate::cli::Commands;
use crate::config::{ImageFormat, PlotConfig};
use crate::dos::plot::PlotStyle;
use crate::dos::AxisEstimator;
use crate::error::{DosError, Result};
use crate::utils::output;

use std::path::{Path, PathBuf};

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Tdos(args) => tdos::execute(args),
        Commands::Pdos(args) => pdos::execute(args),
        Commands::Export(args) => export::execute(args),
    }
}

/// 单文件 / 批量模式分派
///
/// 输入为文件时调用 `single`；为目录时收集匹配文件并用 `batch` 并行处理。
fn for_each_input<S, B>(args: &InputArgs, single: S, batch: B) -> Result<()>
where
    S: FnOnce(&Path) -> Result<()>,
    B: Fn(&Path) -> ProcessResult + Sync + Send,
{
    if args.input.is_file() {
        output::print_info(&format!("Single file mode: '{}'", args.input.display()));
        single(&args.input)
    } else if args.input.is_dir() {
        run_batch(args, batch)
    } else {
        Err(DosError::FileNotFound {
            path: args.input.display().to_string(),
        })
    }
}

/// 批量处理模式
fn run_batch<B>(args: &InputArgs, batch: B) -> Result<()>
where
    B: Fn(&Path) -> ProcessResult + Sync + Send,
{
    output::print_info(&format!("Batch mode: directory '{}'", args.input.display()));

    let files = FileCollector::new(args.input.clone())
        .with_pattern(&args.pattern)?
        .recursive(args.recursive)
        .collect();

    if files.is_empty() {
        output::print_warning(&format!(
            "No matching files found with pattern '{}'",
            args.pattern
        ));
        return Ok(());
    }

    output::print_info(&format!("Found {} DOSCAR files", files.len()));

    let runner = BatchRunner::new(args.jobs);
    let result = runner.run(files, |file: &PathBuf| batch(file.as_path()))?;

    output::print_separator();
    output::print_success(&format!(
        "Batch complete: {} files, {} success, {} skipped, {} failed",
        result.total(),
        result.success,
        result.skipped,
        result.failed
    ));

    if !result.failures.is_empty() {
        output::print_warning("Failed files:");
        for (path, err) in result.failures.iter().take(10) {
            output::print_error(&format!("  {}: {}", path, err));
        }
        if result.failures.len() > 10 {
            output::print_warning(&format!("  ... and {} more", result.failures.len() - 10));
        }
    }

    Ok(())
}

/// 批量模式下已存在的输出文件跳过
fn skip_existing(output_path: &Path, overwrite: bool) -> Option<ProcessResult> {
    if output_path.exists() && !overwrite {
        Some(ProcessResult::Skipped(format!(
            "Output exists, skipping: {}",
            output_path.display()
        )))
    } else {
        None
    }
}

/// 结果转换为批量处理状态
fn to_process_result<T>(input: &Path, output_path: &Path, result: Result<T>) -> ProcessResult {
    match result {
        Ok(_) => ProcessResult::Success(format!("{} -> {}", input.display(), output_path.display())),
        Err(e) => ProcessResult::Failed(input.display().to_string(), e.to_string()),
    }
}

fn plot_style(config: &PlotConfig) -> PlotStyle {
    PlotStyle {
        width: config.width,
        height: config.height,
        title: config.title.clone(),
        use_svg: config.format == ImageFormat::Svg,
    }
}

fn axis_estimator(config: &PlotConfig) -> AxisEstimator {
    AxisEstimator::new(config.x_min, config.x_max, config.y_cap)
}
