//! # predict 命令实现
//!
//! 给定晶格参数与波长，列出各衍射面的 d 间距和理论 2θ。
//! 若提供峰位文件，同时给出观测值与残差。
//!
//! ## 依赖关系
//! - 使用 `cli/predict.rs` 定义的参数
//! - 使用 `xrd/calculator.rs` 计算峰位
//! - 使用 `parsers/` 读取峰位文件

use crate::cli::predict::PredictArgs;
use crate::error::{LatrefineError, Result};
use crate::models::{IndexedPeak, Reflection};
use crate::parsers;
use crate::utils::output;
use crate::xrd::calculator;

use tabled::{Table, Tabled};

/// 单行预测结果
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub reflection: Reflection,
    /// d 间距（Å），(000) 时为 None
    pub d_spacing: Option<f64>,
    /// 理论 2θ，Bragg 条件无解时为 None
    pub two_theta: Option<f64>,
    pub observed: Option<f64>,
}

/// 执行 predict 命令
pub fn execute(args: PredictArgs) -> Result<()> {
    output::print_header("Cubic Peak Position Prediction");

    if !args.lattice.is_finite() || args.lattice <= 0.0 {
        return Err(LatrefineError::InvalidArgument(format!(
            "lattice parameter must be positive, got {}",
            args.lattice
        )));
    }

    let mut entries: Vec<(Reflection, Option<f64>)> =
        args.hkl.iter().map(|r| (*r, None)).collect();

    if let Some(ref path) = args.input {
        let peaks: Vec<IndexedPeak> = parsers::parse_peak_file(path)?;
        output::print_success(&format!(
            "Loaded {} indexed peaks from '{}'",
            peaks.len(),
            path.display()
        ));
        entries.extend(peaks.iter().map(|p| (p.reflection, Some(p.two_theta))));
    }

    if entries.is_empty() {
        return Err(LatrefineError::InvalidArgument(
            "no reflections given (use --hkl or --input)".to_string(),
        ));
    }

    output::print_info(&format!(
        "a = {:.5} Å, λ = {:.6} Å",
        args.lattice, args.wavelength
    ));

    let predictions = predict(args.wavelength, args.lattice, &entries);
    let unreachable = predictions.iter().filter(|p| p.two_theta.is_none()).count();

    print_prediction_table(&predictions);

    if unreachable > 0 {
        output::print_warning(&format!(
            "{} reflection(s) cannot diffract at this wavelength (λq/2a > 1)",
            unreachable
        ));
    }

    Ok(())
}

/// 逐个计算衍射面的 d 与 2θ；无解的衍射面不会中断其他计算
pub fn predict(
    wavelength: f64,
    lattice_parameter: f64,
    entries: &[(Reflection, Option<f64>)],
) -> Vec<Prediction> {
    entries
        .iter()
        .map(|(reflection, observed)| {
            let q = reflection.q();
            Prediction {
                reflection: *reflection,
                d_spacing: (q > 0.0).then(|| lattice_parameter / q),
                two_theta: calculator::two_theta(wavelength, lattice_parameter, reflection).ok(),
                observed: *observed,
            }
        })
        .collect()
}

fn print_prediction_table(predictions: &[Prediction]) {
    #[derive(Tabled)]
    struct PredictionRow {
        #[tabled(rename = "(hkl)")]
        hkl: String,
        #[tabled(rename = "h²+k²+l²")]
        squared_sum: i128,
        #[tabled(rename = "d (Å)")]
        d_spacing: String,
        #[tabled(rename = "2θ calc (°)")]
        two_theta: String,
        #[tabled(rename = "2θ obs (°)")]
        observed: String,
        #[tabled(rename = "Δ (°)")]
        residual: String,
    }

    let dash = || "-".to_string();

    let rows: Vec<PredictionRow> = predictions
        .iter()
        .map(|p| {
            let r = &p.reflection;
            PredictionRow {
                hkl: format!("({} {} {})", r.h, r.k, r.l),
                squared_sum: r.squared_sum(),
                d_spacing: p.d_spacing.map(|d| format!("{:.5}", d)).unwrap_or_else(dash),
                two_theta: p.two_theta.map(|t| format!("{:.5}", t)).unwrap_or_else(dash),
                observed: p.observed.map(|o| format!("{:.4}", o)).unwrap_or_else(dash),
                residual: match (p.observed, p.two_theta) {
                    (Some(o), Some(t)) => format!("{:+.5}", o - t),
                    _ => dash(),
                },
            }
        })
        .collect();

    println!("{}", Table::new(&rows));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predict_handles_unreachable_reflections() {
        let entries = vec![
            (Reflection::new(1, 1, 1), Some(28.44)),
            (Reflection::new(0, 0, 0), None),
            (Reflection::new(9, 9, 9), None),
        ];
        let out = predict(1.5406, 5.4307, &entries);

        assert!((out[0].two_theta.unwrap() - 28.44371).abs() < 1e-5);
        assert!((out[0].d_spacing.unwrap() - 5.4307 / 3f64.sqrt()).abs() < 1e-12);
        assert_eq!(out[0].observed, Some(28.44));

        assert_eq!(out[1].d_spacing, None);
        assert_eq!(out[1].two_theta, Some(0.0));

        assert_eq!(out[2].two_theta, None);
    }
}
