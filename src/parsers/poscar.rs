//! # VASP POSCAR 元素表解析器
//!
//! 只读取元素符号行与原子数行，用于投影曲线的标注。
//!
//! ## POSCAR 格式说明
//! ```text
//! Comment line (structure name)
//! 1.0                    # scaling factor
//! a1 a2 a3               # lattice vector a
//! b1 b2 b3               # lattice vector b
//! c1 c2 c3               # lattice vector c
//! Element1 Element2 ...  # element symbols (VASP 5+)
//! n1 n2 ...              # number of atoms per element
//! ...
//! ```
//!
//! VASP 4 格式没有元素符号行，此时返回 `FormatVersion` 错误。
//!
//! ## 依赖关系
//! - 被 `commands/pdos.rs` 使用
//! - 使用 `models/projection.rs`

use crate::error::{DosError, Result};
use crate::models::ElementTable;
use crate::parsers::doscar::read_source;

use std::path::Path;
use tracing::debug;

/// 解析 POSCAR/CONTCAR 文件中的元素表
pub fn parse_element_table_file(path: &Path) -> Result<ElementTable> {
    let content = read_source(path)?;
    parse_element_table(&content, &path.display().to_string())
}

/// 从字符串内容解析元素表
pub fn parse_element_table(content: &str, path: &str) -> Result<ElementTable> {
    let lines: Vec<&str> = content.lines().collect();

    if lines.len() < 7 {
        return Err(DosError::parse("poscar", path, "File too short"));
    }

    // Line 5: Element symbols (VASP 5+)
    let symbols: Vec<&str> = lines[5].split_whitespace().collect();
    if symbols.is_empty() {
        return Err(DosError::parse("poscar", path, "Line 6: no element symbols"));
    }
    if let Some(tok) = symbols.iter().find(|s| !is_symbol(s)) {
        return Err(DosError::FormatVersion {
            path: path.to_string(),
            reason: format!("line 6 holds '{}' where an element symbol is expected", tok),
        });
    }

    // Line 6: Atom counts
    let counts: Vec<usize> = lines[6]
        .split_whitespace()
        .map(|s| {
            s.parse::<usize>().map_err(|_| {
                DosError::parse("poscar", path, format!("Line 7: invalid atom count '{}'", s))
            })
        })
        .collect::<Result<_>>()?;

    if counts.len() != symbols.len() {
        return Err(DosError::parse(
            "poscar",
            path,
            format!(
                "{} element symbols but {} atom counts",
                symbols.len(),
                counts.len()
            ),
        ));
    }

    let pairs: Vec<(&str, usize)> = symbols.into_iter().zip(counts).collect();
    let table = ElementTable::from_counts(&pairs);
    debug!(atoms = table.len(), species = ?table.species(), "parsed element table");

    Ok(table)
}

/// 元素符号必须以字母开头 (允许 "Fe_pv" 这类 POTCAR 标记)
fn is_symbol(token: &str) -> bool {
    token
        .chars()
        .next()
        .map(|c| c.is_ascii_alphabetic())
        .unwrap_or(false)
        && token.parse::<f64>().is_err()
}
