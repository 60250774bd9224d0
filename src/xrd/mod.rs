//! # XRD 晶格参数精修模块
//!
//! 从已指标化的粉末衍射峰位精修立方晶格参数。
//!
//! ## 子模块
//! - `calculator`: 正向模型（Bragg 定律 → 2θ）与目标函数
//! - `grid`: 一维偏移网格
//! - `refine`: 由粗到细的网格搜索
//! - `report`: 精修报告与报告接收端
//! - `export`: 数据导出
//! - `plot`: 图表生成
//!
//! ## 依赖关系
//! - 被 `commands/refine.rs`, `commands/predict.rs` 使用
//! - 使用 `models/`

pub mod calculator;
pub mod export;
pub mod grid;
pub mod plot;
pub mod refine;
pub mod report;

pub use refine::{RefineOptions, Refiner};
pub use report::{AppendFileSink, RefinementReport, ReportSink};
