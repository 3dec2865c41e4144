//! # 统一错误处理模块
//!
//! 定义 dosplot 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 错误分类
//! - 资源缺失: `FileNotFound` (DOSCAR / POSCAR / params.in 不存在)
//! - 格式版本: `FormatVersion` (POSCAR 缺少元素符号行)
//! - 投影定义: `IndexFormat`, `IndexOutOfRange`
//! - 未实现功能: `Unimplemented` (自旋极化投影 DOS)
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// dosplot 统一错误类型
#[derive(Error, Debug)]
pub enum DosError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 解析错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to parse {format} file: {path}\nReason: {reason}")]
    ParseError {
        format: String,
        path: String,
        reason: String,
    },

    #[error("{path} is not in VASP5 format: {reason}")]
    FormatVersion { path: String, reason: String },

    // ─────────────────────────────────────────────────────────────
    // 投影定义错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid index range '{spec}' (expected 'first-last', 1-based)")]
    IndexFormat { spec: String },

    #[error("{kind} range {first}-{last} is out of bounds (valid: 1-{max})")]
    IndexOutOfRange {
        kind: &'static str,
        first: usize,
        last: usize,
        max: usize,
    },

    #[error("Not implemented: {0}")]
    Unimplemented(String),

    // ─────────────────────────────────────────────────────────────
    // 配置与输出
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid configuration in {path}: {reason}")]
    ConfigError { path: String, reason: String },

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Plotting failed: {0}")]
    PlotError(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, DosError>;

impl DosError {
    /// 解析错误的便捷构造
    pub fn parse(format: &str, path: &str, reason: impl Into<String>) -> Self {
        DosError::ParseError {
            format: format.to_string(),
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}
