//! # 解析器模块
//!
//! 解析 DOSCAR、POSCAR 与 params.in。
//!
//! ## 依赖关系
//! - 被 `commands/` 模块使用
//! - 使用 `models/` 数据模型
//! - 子模块: doscar, poscar, params

pub mod doscar;
pub mod params;
pub mod poscar;

use std::path::{Path, PathBuf};

/// DOSCAR 同目录下的伴随文件 (POSCAR, params.in)
pub fn sibling_file(dos_path: &Path, name: &str) -> PathBuf {
    dos_path
        .parent()
        .map(|dir| dir.join(name))
        .unwrap_or_else(|| PathBuf::from(name))
}
