//! # 解析器模块
//!
//! 读取指标化峰位文件并构造实验数据。
//!
//! ## 依赖关系
//! - 被 `commands/` 模块使用
//! - 使用 `models/` 数据模型
//! - 子模块: peaks

pub mod peaks;

use crate::error::{LatrefineError, Result};
use crate::models::{Experiment, IndexedPeak};
use std::path::Path;

/// 从文件扩展名推断格式并解析峰位
pub fn parse_peak_file(path: &Path) -> Result<Vec<IndexedPeak>> {
    if !path.is_file() {
        return Err(LatrefineError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "csv" => peaks::parse_peak_csv(path),
        _ => peaks::parse_peak_text_file(path),
    }
}

/// 读取峰位文件并构造实验，名称取文件名主干
pub fn load_experiment(path: &Path, wavelength: f64) -> Result<Experiment> {
    let peaks = parse_peak_file(path)?;
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("sample")
        .to_string();

    Experiment::from_pairs(name, wavelength, peaks)
}
