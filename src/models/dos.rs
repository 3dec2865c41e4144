//! # DOS 数据模型
//!
//! DOSCAR 解析结果与派生曲线。
//!
//! ## 依赖关系
//! - 被 `parsers/doscar.rs` 构造
//! - 被 `dos/` 模块消费

use serde::{Deserialize, Serialize};

/// 自旋模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpinMode {
    /// 非自旋极化
    NonPolarized,
    /// 自旋极化 (up / down)
    Polarized,
}

impl SpinMode {
    pub fn is_polarized(&self) -> bool {
        matches!(self, SpinMode::Polarized)
    }
}

impl std::fmt::Display for SpinMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpinMode::NonPolarized => write!(f, "non-polarized"),
            SpinMode::Polarized => write!(f, "spin-polarized"),
        }
    }
}

/// DOSCAR 头部 (第 0 行与第 5 行)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DosHeader {
    /// 原子总数
    pub atom_count: usize,
    pub max_energy: f64,
    pub min_energy: f64,
    /// 能量网格点数 (NEDOS)
    pub bin_count: usize,
    /// 费米能 (eV)
    pub fermi_energy: f64,
    pub weight: f64,
}

impl DosHeader {
    /// 总 DOS 块的第一行行号
    pub const TOTAL_BLOCK_START: usize = 6;

    /// 投影 DOS 块的第一行行号
    pub fn projected_block_start(&self) -> usize {
        Self::TOTAL_BLOCK_START + self.bin_count
    }

    /// 每个原子段的行数 (分隔行 + bins 行数据)
    pub fn segment_len(&self) -> usize {
        self.bin_count + 1
    }
}

/// 总 DOS
///
/// `channels[bin]` 长度为 1 (非自旋) 或 2 (up, down)，已按原子数归一化。
#[derive(Debug, Clone, PartialEq)]
pub struct TotalDos {
    pub energies: Vec<f64>,
    pub channels: Vec<Vec<f64>>,
    pub spin: SpinMode,
}

impl TotalDos {
    pub fn bins(&self) -> usize {
        self.energies.len()
    }

    pub fn channel_count(&self) -> usize {
        self.channels.first().map(|c| c.len()).unwrap_or(0)
    }

    /// 取出单个通道作为曲线 (0 = total / up, 1 = down)
    pub fn channel_curve(&self, channel: usize) -> Option<Curve> {
        if channel >= self.channel_count() {
            return None;
        }
        Some(Curve {
            energies: self.energies.clone(),
            values: self.channels.iter().map(|row| row[channel]).collect(),
        })
    }
}

/// 投影 DOS: `tensor[site][bin][orbital]`
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedDos {
    pub energies: Vec<f64>,
    pub tensor: Vec<Vec<Vec<f64>>>,
    pub spin: SpinMode,
}

impl ProjectedDos {
    pub fn site_count(&self) -> usize {
        self.tensor.len()
    }

    pub fn bins(&self) -> usize {
        self.energies.len()
    }

    pub fn orbital_count(&self) -> usize {
        self.tensor
            .first()
            .and_then(|site| site.first())
            .map(|row| row.len())
            .unwrap_or(0)
    }
}

/// 一条 DOS 曲线
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    pub energies: Vec<f64>,
    pub values: Vec<f64>,
}

impl Curve {
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.energies.iter().copied().zip(self.values.iter().copied())
    }

    /// 曲线值取反 (用于自旋 down 通道的镜像绘制)
    pub fn negated(&self) -> Curve {
        Curve {
            energies: self.energies.clone(),
            values: self.values.iter().map(|v| -v).collect(),
        }
    }
}

/// 带标签和颜色的曲线，交给渲染器
#[derive(Debug, Clone)]
pub struct LabeledCurve {
    pub curve: Curve,
    pub label: String,
    pub color: String,
}

/// 坐标轴范围
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisBounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}
