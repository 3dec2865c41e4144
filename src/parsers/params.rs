//! # params.in 投影定义解析器
//!
//! 每个非空行一条投影定义，5 个空白分隔字段：
//! ```text
//! # element  sites  orbitals  label  color
//! Fe         1-2    5-9       d      #d62728
//! O          3-8    2-4       p      #1f77b4
//! ```
//!
//! 范围字段此处不做校验，由 `dos/aggregate.rs` 在转换为索引时检查。
//!
//! ## 依赖关系
//! - 被 `commands/pdos.rs` 使用
//! - 使用 `models/projection.rs`

use crate::error::{DosError, Result};
use crate::models::ProjectionSpec;
use crate::parsers::doscar::read_source;

use std::path::Path;

/// 解析投影定义文件
pub fn parse_params_file(path: &Path) -> Result<Vec<ProjectionSpec>> {
    let content = read_source(path)?;
    parse_params(&content, &path.display().to_string())
}

/// 从字符串内容解析投影定义 (保持文件顺序)
pub fn parse_params(content: &str, path: &str) -> Result<Vec<ProjectionSpec>> {
    let mut specs = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 5 {
            return Err(DosError::parse(
                "params",
                path,
                format!(
                    "Line {}: expected 5 fields (element sites orbitals label color), found {}",
                    idx + 1,
                    fields.len()
                ),
            ));
        }

        specs.push(ProjectionSpec {
            element: fields[0].to_string(),
            site_range: fields[1].to_string(),
            orbital_range: fields[2].to_string(),
            label: fields[3].to_string(),
            color: fields[4].to_string(),
        });
    }

    Ok(specs)
}
