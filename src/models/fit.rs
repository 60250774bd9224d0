//! # 精修结果数据模型
//!
//! ## 依赖关系
//! - 被 `xrd/calculator.rs`（Trial）和 `xrd/refine.rs`（FitResult）产生
//! - 被 `xrd/report.rs`, `xrd/export.rs`, `commands/` 使用

use serde::{Deserialize, Serialize};

/// 单个试探晶格参数的评估结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trial {
    /// 试探晶格参数（Å）
    pub lattice_parameter: f64,
    /// 预测 2θ（度，保留 5 位小数），与观测峰一一对应
    pub predicted: Vec<f64>,
    /// 平均绝对偏差（度，保留 5 位小数）
    pub deviation: f64,
}

/// 一轮网格搜索的记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleRecord {
    /// 轮次（从 1 开始）
    pub iteration: usize,
    /// 搜索半宽
    pub variation: f64,
    /// 网格步长
    pub resolution: f64,
    /// 网格点数
    pub grid_points: usize,
    /// 因 Bragg 条件不满足而被排除的试探数
    pub invalid_trials: usize,
    /// 选中的偏移量
    pub best_offset: f64,
    /// 本轮结束后的晶格参数
    pub lattice_parameter: f64,
    /// 本轮最小偏差
    pub deviation: f64,
}

/// 晶格参数精修结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    /// 最终晶格参数（Å）
    pub lattice_parameter: f64,
    /// 最后一轮的最小平均绝对偏差（度）
    pub deviation: f64,
    /// 最终晶格参数下的预测 2θ
    pub predicted: Vec<f64>,
    /// 各轮搜索记录
    pub history: Vec<CycleRecord>,
}

impl FitResult {
    /// 偏差的百分数表示（deviation × 100）
    pub fn deviation_percent(&self) -> f64 {
        self.deviation * 100.0
    }
}
