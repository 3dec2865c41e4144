//! # tdos / pdos / export 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/` 相应模块
//! - 使用 `config.rs` 合并配置

use crate::config::{ImageFormat, PlotConfig};

use clap::{Args, ValueEnum};
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────
// 输入与批量参数
// ─────────────────────────────────────────────────────────────

/// 输入路径与批量处理参数
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Input: DOSCAR file or directory containing DOSCAR files
    pub input: PathBuf,

    /// Glob pattern for DOSCAR files (batch mode)
    #[arg(long, default_value = "DOSCAR*")]
    pub pattern: String,

    /// Recurse into subdirectories (batch mode)
    #[arg(long, default_value_t = false)]
    pub recursive: bool,

    /// Number of parallel jobs (0 = auto, batch mode only)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,

    /// Overwrite existing output files (batch mode)
    #[arg(long, default_value_t = false)]
    pub overwrite: bool,

    /// TOML configuration file
    #[arg(long, env = "DOSPLOT_CONFIG")]
    pub config: Option<PathBuf>,
}

// ─────────────────────────────────────────────────────────────
// 图像参数
// ─────────────────────────────────────────────────────────────

/// 图像输出参数，覆盖配置文件中的值
#[derive(Args, Debug, Clone, Default)]
pub struct ImageArgs {
    /// Output file base name (default: tdos / pdos)
    #[arg(long)]
    pub fname: Option<String>,

    /// Image format
    #[arg(short, long, value_enum)]
    pub format: Option<ImageFormat>,

    /// Output prefix; also disables automatic axis limits
    #[arg(long)]
    pub plot_range: Option<String>,

    /// Figure width in pixels (for PNG) or points (for SVG)
    #[arg(long)]
    pub width: Option<u32>,

    /// Figure height in pixels (for PNG) or points (for SVG)
    #[arg(long)]
    pub height: Option<u32>,

    /// Title drawn inside the plot
    #[arg(long)]
    pub title: Option<String>,
}

impl ImageArgs {
    /// 将命令行参数合并到配置，`pdos` 决定 `fname` 覆盖哪个文件名
    pub fn apply(&self, config: &mut PlotConfig, pdos: bool) {
        if let Some(ref fname) = self.fname {
            if pdos {
                config.pdos_name = fname.clone();
            } else {
                config.tdos_name = fname.clone();
            }
        }
        if let Some(format) = self.format {
            config.format = format;
        }
        if self.plot_range.is_some() {
            config.plot_range = self.plot_range.clone();
        }
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if self.title.is_some() {
            config.title = self.title.clone();
        }
    }
}

// ─────────────────────────────────────────────────────────────
// tdos
// ─────────────────────────────────────────────────────────────

/// tdos 子命令参数
#[derive(Args, Debug)]
pub struct TdosArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub image: ImageArgs,
}

// ─────────────────────────────────────────────────────────────
// pdos
// ─────────────────────────────────────────────────────────────

/// pdos 子命令参数
#[derive(Args, Debug)]
pub struct PdosArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub image: ImageArgs,

    /// Structure file with element symbols (default: POSCAR next to DOSCAR)
    #[arg(long)]
    pub poscar: Option<PathBuf>,

    /// Projection definitions (default: params.in next to DOSCAR)
    #[arg(long)]
    pub params: Option<PathBuf>,

    /// Do not draw the total DOS behind the projections
    #[arg(long, default_value_t = false)]
    pub no_total: bool,

    /// Abort on the first invalid projection instead of skipping it
    #[arg(long, default_value_t = false)]
    pub strict: bool,
}

// ─────────────────────────────────────────────────────────────
// export
// ─────────────────────────────────────────────────────────────

/// 数据导出格式
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum DataFormat {
    /// CSV data file
    Csv,
    /// Tab-separated XY data file
    Xy,
}

impl DataFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            DataFormat::Csv => "csv",
            DataFormat::Xy => "dat",
        }
    }
}

/// export 子命令参数
#[derive(Args, Debug)]
pub struct ExportArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Data format
    #[arg(short, long, value_enum, default_value = "csv")]
    pub format: DataFormat,

    /// Output file base name, written next to each DOSCAR
    #[arg(short, long, default_value = "dos")]
    pub output: String,

    /// Projection definitions to include as extra columns
    #[arg(long)]
    pub params: Option<PathBuf>,
}
