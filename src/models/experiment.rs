//! # 衍射实验数据模型
//!
//! 固定不变的实验数据：波长 + 成对的 (衍射面, 观测 2θ) 记录。
//! 衍射面与观测峰在构造时配对，之后不再允许单独修改。
//!
//! ## 依赖关系
//! - 被 `parsers/peaks.rs` 构造
//! - 被 `xrd/calculator.rs`, `xrd/refine.rs`, `xrd/report.rs` 使用

use crate::error::{LatrefineError, Result};
use crate::models::Reflection;

use serde::{Deserialize, Serialize};

/// 已指标化的观测峰
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndexedPeak {
    /// 对应衍射面
    pub reflection: Reflection,
    /// 观测 2θ（度）
    pub two_theta: f64,
}

impl IndexedPeak {
    pub fn new(reflection: Reflection, two_theta: f64) -> Self {
        Self {
            reflection,
            two_theta,
        }
    }
}

/// 粉末衍射实验
#[derive(Debug, Clone, Serialize)]
pub struct Experiment {
    /// 样品名称（通常取自文件名）
    pub name: String,
    /// X 射线波长（Å）
    wavelength: f64,
    /// 观测峰列表（保持输入顺序）
    peaks: Vec<IndexedPeak>,
}

impl Experiment {
    /// 由两个等长序列构造；长度不一致时立即失败
    pub fn new(
        name: impl Into<String>,
        wavelength: f64,
        reflections: Vec<Reflection>,
        observed: Vec<f64>,
    ) -> Result<Self> {
        if reflections.len() != observed.len() {
            return Err(LatrefineError::ShapeMismatch {
                reflections: reflections.len(),
                peaks: observed.len(),
            });
        }

        let peaks = reflections
            .into_iter()
            .zip(observed)
            .map(|(reflection, two_theta)| IndexedPeak::new(reflection, two_theta))
            .collect();

        Self::from_pairs(name, wavelength, peaks)
    }

    /// 由配对记录构造
    pub fn from_pairs(
        name: impl Into<String>,
        wavelength: f64,
        peaks: Vec<IndexedPeak>,
    ) -> Result<Self> {
        if !wavelength.is_finite() || wavelength <= 0.0 {
            return Err(LatrefineError::InvalidArgument(format!(
                "wavelength must be a positive number of Å, got {}",
                wavelength
            )));
        }

        if peaks.is_empty() {
            return Err(LatrefineError::InvalidArgument(
                "at least one indexed peak is required".to_string(),
            ));
        }

        if let Some(bad) = peaks.iter().find(|p| !p.two_theta.is_finite()) {
            return Err(LatrefineError::InvalidArgument(format!(
                "observed 2θ for {} is not a finite number",
                bad.reflection
            )));
        }

        Ok(Self {
            name: name.into(),
            wavelength,
            peaks,
        })
    }

    pub fn wavelength(&self) -> f64 {
        self.wavelength
    }

    pub fn peaks(&self) -> &[IndexedPeak] {
        &self.peaks
    }

    pub fn len(&self) -> usize {
        self.peaks.len()
    }

    /// 衍射面（按输入顺序）
    pub fn reflections(&self) -> impl Iterator<Item = &Reflection> + '_ {
        self.peaks.iter().map(|p| &p.reflection)
    }

    /// 观测 2θ（按输入顺序）
    pub fn observed(&self) -> impl Iterator<Item = f64> + '_ {
        self.peaks.iter().map(|p| p.two_theta)
    }
}
