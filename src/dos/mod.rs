//! # DOS 计算与输出模块
//!
//! ## 子模块
//! - `aggregate`: 投影 DOS 按原子/轨道求和
//! - `axis`: 显示坐标范围估计
//! - `plot`: 图表生成
//! - `export`: 数据导出
//!
//! ## 依赖关系
//! - 被 `commands/` 使用
//! - 使用 `models/`

pub mod aggregate;
pub mod axis;
pub mod export;
pub mod plot;

pub use aggregate::aggregate_all;
pub use axis::AxisEstimator;
