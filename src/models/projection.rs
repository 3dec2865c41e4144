//! # 投影定义与元素表
//!
//! ## 依赖关系
//! - 被 `parsers/poscar.rs`, `parsers/params.rs` 构造
//! - 被 `dos/aggregate.rs` 和 `commands/pdos.rs` 使用

use serde::{Deserialize, Serialize};

/// params.in 中的一行投影定义
///
/// 范围保持原始字符串，直到聚合时才转换为索引。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionSpec {
    pub element: String,
    /// 原子范围 "a-b" (1-based, 闭区间)
    pub site_range: String,
    /// 轨道范围 "c-d" (1-based, 闭区间)
    pub orbital_range: String,
    pub label: String,
    pub color: String,
}

impl ProjectionSpec {
    /// 图例文本: "元素-标签"
    pub fn display_label(&self) -> String {
        format!("{}-{}", self.element, self.label)
    }
}

/// 零基闭区间索引范围
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexRange {
    pub first: usize,
    pub last: usize,
}

impl IndexRange {
    pub fn iter(&self) -> std::ops::RangeInclusive<usize> {
        self.first..=self.last
    }
}

/// 原子序号 (1-based) → 元素符号
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementTable {
    symbols: Vec<String>,
}

impl ElementTable {
    /// 按顺序展开 (元素, 数目) 列表
    pub fn from_counts<S: AsRef<str>>(pairs: &[(S, usize)]) -> Self {
        let mut symbols = Vec::new();
        for (symbol, count) in pairs {
            for _ in 0..*count {
                symbols.push(symbol.as_ref().to_string());
            }
        }
        ElementTable { symbols }
    }

    /// 查询 1-based 原子序号的元素
    pub fn get(&self, index: usize) -> Option<&str> {
        if index == 0 {
            return None;
        }
        self.symbols.get(index - 1).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// 按输入顺序去重后的元素列表
    pub fn species(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for s in &self.symbols {
            if !seen.contains(&s.as_str()) {
                seen.push(s);
            }
        }
        seen
    }
}
