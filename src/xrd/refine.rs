//! # 晶格参数精修
//!
//! 由粗到细的一维网格搜索：每轮在 `a ± variation` 内按 `resolution` 步长扫描，
//! 取目标函数最小的偏移量更新 a，然后窗口与步长同时缩小 `shrink` 倍。
//!
//! ## 约定
//! - 扫描顺序为偏移量升序，最小值并列时取最先出现者
//! - Bragg 条件无解的试探视为 +∞，不参与取最小
//! - 可选 rayon 并行评估网格，结果按网格顺序收集，选择结果与串行一致
//!
//! ## 依赖关系
//! - 被 `commands/refine.rs` 调用
//! - 使用 `xrd/calculator.rs` 评估试探值
//! - 使用 `xrd/grid.rs` 生成偏移量

use crate::error::{LatrefineError, Result};
use crate::models::{CycleRecord, Experiment, FitResult};
use crate::xrd::calculator;
use crate::xrd::grid;

use rayon::prelude::*;

/// 单轮网格点数上限
pub const MAX_GRID_POINTS: usize = 1_000_000;

/// 精修参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefineOptions {
    /// 迭代轮数
    pub iterations: usize,
    /// 初始搜索半宽（Å）
    pub variation: f64,
    /// 初始网格步长（Å）
    pub resolution: f64,
    /// 每轮缩小倍数
    pub shrink: f64,
    /// 是否并行评估网格
    pub parallel: bool,
}

impl Default for RefineOptions {
    fn default() -> Self {
        Self {
            iterations: 3,
            variation: 1.0,
            resolution: 0.1,
            shrink: 5.0,
            parallel: false,
        }
    }
}

/// 网格搜索精修器
#[derive(Debug, Clone, Default)]
pub struct Refiner {
    options: RefineOptions,
}

impl Refiner {
    pub fn new(options: RefineOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RefineOptions {
        &self.options
    }

    /// 在任何计算之前检查参数
    pub fn validate(&self, initial: f64) -> Result<()> {
        let o = &self.options;

        if o.iterations == 0 {
            return Err(LatrefineError::InvalidArgument(
                "iterations must be at least 1".to_string(),
            ));
        }
        if !o.variation.is_finite() || o.variation <= 0.0 {
            return Err(LatrefineError::InvalidArgument(format!(
                "variation must be positive, got {}",
                o.variation
            )));
        }
        if !o.resolution.is_finite() || o.resolution <= 0.0 {
            return Err(LatrefineError::InvalidArgument(format!(
                "resolution must be positive, got {}",
                o.resolution
            )));
        }
        if !o.shrink.is_finite() || o.shrink <= 1.0 {
            return Err(LatrefineError::InvalidArgument(format!(
                "shrink factor must be greater than 1, got {}",
                o.shrink
            )));
        }
        if !initial.is_finite() || initial <= 0.0 {
            return Err(LatrefineError::InvalidArgument(format!(
                "initial lattice parameter must be positive, got {}",
                initial
            )));
        }

        let points = grid::grid_len(o.variation, o.resolution);
        if points == 0 {
            return Err(LatrefineError::EmptyGrid {
                iteration: 1,
                variation: o.variation,
                resolution: o.resolution,
            });
        }
        if points > MAX_GRID_POINTS {
            return Err(LatrefineError::InvalidArgument(format!(
                "search grid of {} points exceeds the limit of {} (increase resolution)",
                points, MAX_GRID_POINTS
            )));
        }

        Ok(())
    }

    /// 从初始晶格参数出发精修
    pub fn refine(&self, experiment: &Experiment, initial: f64) -> Result<FitResult> {
        self.validate(initial)?;

        let mut a = initial;
        let mut variation = self.options.variation;
        let mut resolution = self.options.resolution;
        let mut history = Vec::with_capacity(self.options.iterations);

        for iteration in 1..=self.options.iterations {
            let offsets = grid::offsets(variation, resolution);
            if offsets.is_empty() {
                return Err(LatrefineError::EmptyGrid {
                    iteration,
                    variation,
                    resolution,
                });
            }

            let scores = self.scan(experiment, a, &offsets);
            let invalid_trials = scores.iter().filter(|s| s.is_infinite()).count();

            let (best, deviation) =
                stable_argmin(&scores).ok_or(LatrefineError::NoValidTrial { iteration })?;

            let best_offset = offsets[best];
            a += best_offset;

            history.push(CycleRecord {
                iteration,
                variation,
                resolution,
                grid_points: offsets.len(),
                invalid_trials,
                best_offset,
                lattice_parameter: a,
                deviation,
            });

            variation /= self.options.shrink;
            resolution /= self.options.shrink;
        }

        // a 与最后一轮最优试探值按相同方式累加，此处重新评估得到同一组预测峰位
        let final_trial = calculator::evaluate(experiment, a)?;
        let deviation = history
            .last()
            .map(|c| c.deviation)
            .unwrap_or(final_trial.deviation);

        Ok(FitResult {
            lattice_parameter: a,
            deviation,
            predicted: final_trial.predicted,
            history,
        })
    }

    /// 按网格顺序评估所有试探值；无解的试探记为 +∞
    fn scan(&self, experiment: &Experiment, a: f64, offsets: &[f64]) -> Vec<f64> {
        let score = |offset: &f64| {
            calculator::objective(experiment, a + offset).unwrap_or(f64::INFINITY)
        };

        if self.options.parallel {
            offsets.par_iter().map(score).collect()
        } else {
            offsets.iter().map(score).collect()
        }
    }
}

/// 稳定的最小值下标：严格更小才替换，并列时保留最先出现者；全部为 +∞ 时返回 None
pub fn stable_argmin(scores: &[f64]) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;

    for (i, &s) in scores.iter().enumerate() {
        if !s.is_finite() {
            continue;
        }
        match best {
            Some((_, b)) if s >= b => {}
            _ => best = Some((i, s)),
        }
    }

    best
}
