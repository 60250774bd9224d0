//! # predict 子命令 CLI 定义
//!
//! 给定晶格参数，计算衍射面的理论 2θ 与 d 间距。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/predict.rs`

use super::refine::{parse_reflection, parse_wavelength};
use crate::models::Reflection;

use clap::Args;
use std::path::PathBuf;

/// predict 子命令参数
#[derive(Args, Debug)]
pub struct PredictArgs {
    /// X-ray wavelength: radiation source name (cu-ka1, mo-ka, etc.) or value in Å
    #[arg(short, long, value_parser = parse_wavelength)]
    pub wavelength: f64,

    /// Cubic lattice parameter (Å)
    #[arg(short = 'a', long)]
    pub lattice: f64,

    /// Reflection to evaluate, e.g. "4 3 1" or "[4, 3, 1]" (repeatable)
    #[arg(long = "hkl", value_parser = parse_reflection)]
    pub hkl: Vec<Reflection>,

    /// Indexed peak file whose reflections (and observed 2θ) are also evaluated
    #[arg(short, long)]
    pub input: Option<PathBuf>,
}
