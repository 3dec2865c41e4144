//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `tdos`: 绘制总 DOS
//! - `pdos`: 绘制投影 DOS
//! - `export`: 导出 DOS 数据
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: plot

pub mod plot;

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// dosplot - VASP 态密度绘图工具
#[derive(Parser)]
#[command(name = "dosplot")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(about = "Total and projected density-of-states plots from VASP DOSCAR files", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase diagnostic verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Silence diagnostic output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Also write diagnostics to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Plot the total density of states
    Tdos(plot::TdosArgs),

    /// Plot site/orbital-projected densities of states defined in params.in
    Pdos(plot::PdosArgs),

    /// Export total and projected DOS curves as CSV or XY data
    Export(plot::ExportArgs),
}
