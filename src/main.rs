//! # dosplot - VASP 态密度绘图工具
//!
//! 读取 DOSCAR 中的总 DOS 与投影 DOS，按 params.in 的定义求和投影曲线，
//! 估计坐标范围后输出图像或数据文件。
//!
//! ## 子命令
//! - `tdos`   - 绘制总 DOS
//! - `pdos`   - 绘制原子/轨道投影 DOS
//! - `export` - 导出 DOS 数据 (CSV / XY)
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── config.rs   (TOML 绘图配置)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── parsers/   (DOSCAR / POSCAR / params.in 解析)
//!   │     ├── dos/       (求和、坐标估计、绘图、导出)
//!   │     ├── batch/     (目录批量处理)
//!   │     └── models/    (数据模型)
//!   ├── utils/      (输出、日志、进度条)
//!   └── error.rs    (错误处理)
//! ```

mod batch;
mod cli;
mod commands;
mod config;
mod dos;
mod error;
mod models;
mod parsers;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = utils::logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.as_deref()) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
