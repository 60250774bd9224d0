//! # 数据模型模块
//!
//! 定义衍射面、实验数据和精修结果的数据模型。
//!
//! ## 依赖关系
//! - 被 `parsers/`, `xrd/` 和 `commands/` 使用
//! - 子模块: reflection, experiment, fit

pub mod experiment;
pub mod fit;
pub mod reflection;

pub use experiment::{Experiment, IndexedPeak};
pub use fit::{CycleRecord, FitResult, Trial};
pub use reflection::Reflection;
