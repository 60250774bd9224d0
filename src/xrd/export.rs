//! # 精修结果数据导出
//!
//! 导出观测峰与拟合峰位到 CSV 和 XY 格式。
//!
//! ## 支持格式
//! - CSV: h, k, l, 观测 2θ, 预测 2θ, 残差, d 间距
//! - XY: 注释头 + 每行 `预测 2θ  观测 2θ`
//!
//! ## 依赖关系
//! - 被 `commands/refine.rs` 调用
//! - 使用 `models/` 的 Experiment, FitResult
//! - 使用 `csv` 库写入 CSV 文件

use crate::error::{LatrefineError, Result};
use crate::models::{Experiment, FitResult};

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// 导出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Xy,
}

impl ExportFormat {
    /// 从文件扩展名推断格式（默认 CSV）
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_lowercase())
            .as_deref()
        {
            Some("xy") | Some("dat") | Some("txt") => ExportFormat::Xy,
            _ => ExportFormat::Csv,
        }
    }
}

/// 按扩展名导出
pub fn export(experiment: &Experiment, fit: &FitResult, output_path: &Path) -> Result<()> {
    match ExportFormat::from_path(output_path) {
        ExportFormat::Csv => to_csv(experiment, fit, output_path),
        ExportFormat::Xy => to_xy(experiment, fit, output_path),
    }
}

/// 导出为 CSV 格式
pub fn to_csv(experiment: &Experiment, fit: &FitResult, output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;

    wtr.write_record([
        "h",
        "k",
        "l",
        "observed_2theta",
        "predicted_2theta",
        "residual",
        "d_spacing",
    ])?;

    for (peak, predicted) in experiment.peaks().iter().zip(&fit.predicted) {
        let r = &peak.reflection;
        let d = fit.lattice_parameter / r.q();
        wtr.write_record(&[
            r.h.to_string(),
            r.k.to_string(),
            r.l.to_string(),
            format!("{:.5}", peak.two_theta),
            format!("{:.5}", predicted),
            format!("{:.5}", peak.two_theta - predicted),
            format!("{:.6}", d),
        ])?;
    }

    wtr.flush().map_err(|e| LatrefineError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

/// 导出为 XY 格式
pub fn to_xy(experiment: &Experiment, fit: &FitResult, output_path: &Path) -> Result<()> {
    let write_err = |e| LatrefineError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    };

    let mut file = BufWriter::new(File::create(output_path).map_err(write_err)?);

    writeln!(file, "# Lattice refinement: {}", experiment.name).map_err(write_err)?;
    writeln!(file, "# Wavelength: {:.6} Angstrom", experiment.wavelength()).map_err(write_err)?;
    writeln!(
        file,
        "# Lattice parameter: {:.5} Angstrom, mean |delta 2theta|: {:.5} deg",
        fit.lattice_parameter, fit.deviation
    )
    .map_err(write_err)?;
    writeln!(file, "# Columns: predicted 2theta (degrees), observed 2theta (degrees)")
        .map_err(write_err)?;
    writeln!(file, "#").map_err(write_err)?;

    for (peak, predicted) in experiment.peaks().iter().zip(&fit.predicted) {
        writeln!(file, "{:.5}\t{:.5}", predicted, peak.two_theta).map_err(write_err)?;
    }

    file.flush().map_err(write_err)
}
