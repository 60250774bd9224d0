//! # 精修报告
//!
//! 将精修结果格式化为文本块，并交给报告接收端（文件追加、任意 writer）。
//!
//! ## 报告格式
//! ```text
//! ----------------------------------------------------
//!  Lattice parameter: 19.49450
//!  Lambda: 0.62148
//!  Variation per peak: 0.361%
//!
//! Peaks: 9.32411; 12.4128; ...
//! Reflections: [4, 3, 1]; [6, 3, 1]; ...
//!
//! =-=-=-=-=-=-=-=-=-=-=-=-End=-=-=-=-=-=-=-=-=-=-=-=-
//! ```
//!
//! ## 依赖关系
//! - 被 `commands/refine.rs` 调用
//! - 使用 `models/` 的 Experiment, FitResult, Reflection

use crate::error::{LatrefineError, Result};
use crate::models::{Experiment, FitResult, Reflection};

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// 一次精修的报告内容
#[derive(Debug, Clone, PartialEq)]
pub struct RefinementReport {
    pub lattice_parameter: f64,
    pub wavelength: f64,
    pub deviation: f64,
    pub predicted: Vec<f64>,
    pub reflections: Vec<Reflection>,
}

impl RefinementReport {
    pub fn new(experiment: &Experiment, fit: &FitResult) -> Self {
        Self {
            lattice_parameter: fit.lattice_parameter,
            wavelength: experiment.wavelength(),
            deviation: fit.deviation,
            predicted: fit.predicted.clone(),
            reflections: experiment.reflections().copied().collect(),
        }
    }
}

/// 报告接收端
pub trait ReportSink {
    fn write_report(&mut self, report: &RefinementReport) -> Result<()>;
}

/// 以追加模式写入文件，从不截断已有内容
#[derive(Debug, Clone)]
pub struct AppendFileSink {
    path: PathBuf,
}

impl AppendFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReportSink for AppendFileSink {
    fn write_report(&mut self, report: &RefinementReport) -> Result<()> {
        let write_err = |e| LatrefineError::FileWriteError {
            path: self.path.display().to_string(),
            source: e,
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(write_err)?;

        file.write_all(format_report(report).as_bytes())
            .map_err(write_err)
    }
}

/// 写入任意 `Write`（标准输出、内存缓冲等）
pub struct WriterSink<W: Write> {
    writer: W,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ReportSink for WriterSink<W> {
    fn write_report(&mut self, report: &RefinementReport) -> Result<()> {
        self.writer
            .write_all(format_report(report).as_bytes())
            .map_err(|e| LatrefineError::Other(format!("Failed to write report: {}", e)))
    }
}

/// 格式化报告文本块
pub fn format_report(report: &RefinementReport) -> String {
    let peaks: Vec<String> = report.predicted.iter().map(|&p| format_angle(p)).collect();
    let reflections: Vec<String> = report.reflections.iter().map(|r| r.to_string()).collect();

    let mut out = String::new();
    out.push_str(&"-".repeat(52));
    out.push_str(&format!(
        "\n Lattice parameter: {:.5}\n Lambda: {:.5}\n ",
        report.lattice_parameter, report.wavelength
    ));
    out.push_str(&format!(
        "Variation per peak: {:.3}%\n\n",
        report.deviation * 100.0
    ));
    out.push_str(&format!(
        "Peaks: {}\nReflections: {}\n\n",
        peaks.join("; "),
        reflections.join("; ")
    ));
    out.push_str(&format!("{}End{}\n\n", "=-".repeat(12), "=-".repeat(12)));
    out
}

/// 角度的最短表示，整数值保留 ".0"
pub fn format_angle(angle: f64) -> String {
    if angle.is_finite() && angle.fract() == 0.0 {
        format!("{:.1}", angle)
    } else {
        angle.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> RefinementReport {
        RefinementReport {
            lattice_parameter: 19.494496,
            wavelength: 0.621485,
            deviation: 0.00361,
            predicted: vec![9.32411, 12.4128, 26.0],
            reflections: vec![
                Reflection::new(4, 3, 1),
                Reflection::new(6, 3, 1),
                Reflection::new(14, 1, 1),
            ],
        }
    }

    #[test]
    fn test_format_report_layout() {
        let text = format_report(&sample_report());
        let expected = format!(
            "{}\n Lattice parameter: 19.49450\n Lambda: 0.62148\n Variation per peak: 0.361%\n\n\
             Peaks: 9.32411; 12.4128; 26.0\n\
             Reflections: [4, 3, 1]; [6, 3, 1]; [14, 1, 1]\n\n\
             =-=-=-=-=-=-=-=-=-=-=-=-End=-=-=-=-=-=-=-=-=-=-=-=-\n\n",
            "-".repeat(52)
        );
        assert_eq!(text, expected);
    }

    #[test]
    fn test_writer_sink() {
        let mut sink = WriterSink::new(Vec::new());
        sink.write_report(&sample_report()).unwrap();
        sink.write_report(&sample_report()).unwrap();

        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(text.matches("End").count(), 2);
    }

    #[test]
    fn test_append_file_sink_never_truncates() {
        let path = std::env::temp_dir().join(format!(
            "latrefine_report_test_{}.txt",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);

        let mut sink = AppendFileSink::new(&path);
        sink.write_report(&sample_report()).unwrap();
        let mut sink = AppendFileSink::new(&path);
        sink.write_report(&sample_report()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.matches("Lattice parameter").count(), 2);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_format_angle() {
        assert_eq!(format_angle(25.926), "25.926");
        assert_eq!(format_angle(26.0), "26.0");
        assert_eq!(format_angle(9.32411), "9.32411");
    }
}
