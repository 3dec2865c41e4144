//! # 数据模型模块
//!
//! 定义 DOS 数据、投影定义与元素表。
//!
//! ## 依赖关系
//! - 被 `parsers/`、`dos/` 和 `commands/` 使用
//! - 子模块: dos, projection

pub mod dos;
pub mod projection;

pub use dos::{AxisBounds, Curve, DosHeader, LabeledCurve, ProjectedDos, SpinMode, TotalDos};
pub use projection::{ElementTable, IndexRange, ProjectionSpec};
