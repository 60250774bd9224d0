//! # refine 子命令 CLI 定义
//!
//! 从指标化峰位文件（或命令行内联给出的 hkl 与 2θ 列表）精修立方晶格参数。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/refine.rs`

use crate::models::Reflection;

use clap::Args;
use std::path::PathBuf;

/// 报告文件默认路径
pub const DEFAULT_REPORT: &str = "refinement_results.txt";

/// 预定义辐射源波长 (Å)
pub fn get_predefined_wavelength(name: &str) -> Option<f64> {
    match name.to_lowercase().as_str() {
        "cu-ka" | "cuka" => Some(1.5418),
        "cu-ka1" | "cuka1" => Some(1.5406),
        "cu-ka2" | "cuka2" => Some(1.5444),
        "cu-kb1" | "cukb1" => Some(1.3922),
        "mo-ka" | "moka" => Some(0.7107),
        "mo-ka1" | "moka1" => Some(0.7093),
        "co-ka" | "coka" => Some(1.7903),
        "fe-ka" | "feka" => Some(1.9373),
        "cr-ka" | "crka" => Some(2.2910),
        "ag-ka" | "agka" => Some(0.5609),
        _ => None,
    }
}

/// 解析波长输入（辐射源名称或数值）
pub fn parse_wavelength(input: &str) -> Result<f64, String> {
    if let Some(wl) = get_predefined_wavelength(input) {
        return Ok(wl);
    }

    let value = input.parse::<f64>().map_err(|_| {
        format!(
            "Invalid wavelength '{}'. Use a number (e.g., 0.621485) or a name: cu-ka, cu-ka1, mo-ka, co-ka, fe-ka, cr-ka, ag-ka",
            input
        )
    })?;

    if !value.is_finite() || value <= 0.0 {
        return Err(format!("Wavelength must be positive, got {}", input));
    }
    Ok(value)
}

/// 解析命令行中的衍射面
pub fn parse_reflection(s: &str) -> Result<Reflection, String> {
    s.parse::<Reflection>().map_err(|e| e.to_string())
}

/// refine 子命令参数
#[derive(Args, Debug)]
pub struct RefineArgs {
    /// Input: indexed peak file (h k l 2θ per line, or CSV) or a directory of them
    #[arg(required_unless_present = "hkl")]
    pub input: Option<PathBuf>,

    /// Inline reflection, e.g. "4 3 1" (repeatable, paired in order with --peaks)
    #[arg(long = "hkl", value_parser = parse_reflection, conflicts_with = "input", requires = "peaks")]
    pub hkl: Vec<Reflection>,

    /// Inline observed 2θ values (°), comma separated, one per --hkl
    #[arg(long, value_delimiter = ',', requires = "hkl")]
    pub peaks: Vec<f64>,

    /// X-ray wavelength: radiation source name (cu-ka1, mo-ka, etc.) or value in Å (e.g., 0.621485)
    #[arg(short, long, value_parser = parse_wavelength)]
    pub wavelength: f64,

    /// Initial guess for the cubic lattice parameter (Å)
    #[arg(short = 'a', long)]
    pub lattice: f64,

    /// Number of coarse-to-fine search cycles
    #[arg(short = 'n', long, default_value_t = 3)]
    pub iterations: usize,

    /// Initial half-width of the search window (Å)
    #[arg(long, default_value_t = 1.0)]
    pub variation: f64,

    /// Initial grid step (Å)
    #[arg(long, default_value_t = 0.1)]
    pub resolution: f64,

    /// Factor by which window and step shrink after each cycle
    #[arg(long, default_value_t = 5.0)]
    pub shrink: f64,

    /// Evaluate each search grid in parallel
    #[arg(long, default_value_t = false)]
    pub parallel: bool,

    /// Report file; each run appends a block (never truncated)
    #[arg(long, env = "LATREFINE_REPORT", default_value = DEFAULT_REPORT)]
    pub report: PathBuf,

    /// Do not append to the report file
    #[arg(long, default_value_t = false)]
    pub no_report: bool,

    /// Export observed vs fitted peaks (.csv, or .xy/.dat/.txt)
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Plot observed vs fitted peaks (.png or .svg)
    #[arg(long)]
    pub plot: Option<PathBuf>,

    /// Figure width in pixels (for PNG) or points (for SVG)
    #[arg(long, default_value_t = 1200)]
    pub width: u32,

    /// Figure height in pixels (for PNG) or points (for SVG)
    #[arg(long, default_value_t = 800)]
    pub height: u32,

    /// Label observed peaks with Miller indices (hkl) in the plot
    #[arg(long, default_value_t = false)]
    pub label_peaks: bool,

    /// Print the per-cycle search history
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    // ─────────────────────────────────────────────────────────────
    // 批量处理参数
    // ─────────────────────────────────────────────────────────────
    /// Glob pattern for input files (batch mode, e.g., "*.csv,*.dat")
    #[arg(long, default_value = "*.csv,*.dat,*.txt")]
    pub pattern: String,

    /// Recurse into subdirectories (batch mode)
    #[arg(long, default_value_t = false)]
    pub recursive: bool,

    /// Number of parallel jobs (0 = auto, batch mode only)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,

    /// Directory for per-file CSV exports (batch mode)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Overwrite existing export files (batch mode)
    #[arg(long, default_value_t = false)]
    pub overwrite: bool,
}
