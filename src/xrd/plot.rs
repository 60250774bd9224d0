//! # 精修结果图表
//!
//! 使用 `plotters` 绘制观测峰位与拟合峰位的对比 stick 图。
//!
//! ## 功能
//! - 观测峰（蓝色，满高度）与拟合峰（红色，较短）叠加
//! - 可选 hkl 标注
//! - 支持 PNG 和 SVG 输出（按扩展名选择）
//!
//! ## 依赖关系
//! - 被 `commands/refine.rs` 调用
//! - 使用 `models/` 的 Experiment, FitResult
//! - 使用 `plotters` 渲染图表

use crate::error::{LatrefineError, Result};
use crate::models::{Experiment, FitResult};

use plotters::prelude::*;
use std::path::Path;

/// 观测峰高度
const OBSERVED_HEIGHT: f64 = 100.0;
/// 拟合峰高度
const PREDICTED_HEIGHT: f64 = 80.0;

/// 图表参数
#[derive(Debug, Clone)]
pub struct PlotOptions {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub label_peaks: bool,
}

/// 生成对比图表，扩展名为 .svg 时输出 SVG，否则 PNG
pub fn generate_fit_plot(
    experiment: &Experiment,
    fit: &FitResult,
    output_path: &Path,
    options: &PlotOptions,
) -> Result<()> {
    let use_svg = output_path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("svg"))
        .unwrap_or(false);

    if use_svg {
        let root =
            SVGBackend::new(output_path, (options.width, options.height)).into_drawing_area();
        draw_fit_chart(&root, experiment, fit, options)?;
        root.present()
            .map_err(|e| LatrefineError::Other(e.to_string()))?;
    } else {
        let root =
            BitMapBackend::new(output_path, (options.width, options.height)).into_drawing_area();
        draw_fit_chart(&root, experiment, fit, options)?;
        root.present()
            .map_err(|e| LatrefineError::Other(e.to_string()))?;
    }
    Ok(())
}

/// 2θ 轴范围：所有峰位向外取整并留 2° 边距
fn x_range(experiment: &Experiment, fit: &FitResult) -> (f64, f64) {
    let angles = experiment
        .observed()
        .chain(fit.predicted.iter().copied())
        .filter(|a| a.is_finite());

    let (min, max) = angles.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), a| {
        (lo.min(a), hi.max(a))
    });

    if min > max {
        (5.0, 90.0)
    } else {
        let hi = (max.ceil() + 2.0).min(180.0);
        let lo = (min.floor() - 2.0).max(0.0).min(hi - 1.0);
        (lo, hi)
    }
}

/// 绘制对比图表的核心逻辑
fn draw_fit_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    experiment: &Experiment,
    fit: &FitResult,
    options: &PlotOptions,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)
        .map_err(|e| LatrefineError::Other(format!("{:?}", e)))?;

    let (x_min, x_max) = x_range(experiment, fit);

    let mut chart = ChartBuilder::on(root)
        .caption(&options.title, ("sans-serif", 28).into_font())
        .margin(30)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, 0.0..120.0)
        .map_err(|e| LatrefineError::Other(format!("{:?}", e)))?;

    chart
        .configure_mesh()
        .x_desc("2θ (°)")
        .y_desc("Peak marker")
        .disable_y_mesh()
        .x_label_style(("sans-serif", 16))
        .y_label_style(("sans-serif", 16))
        .axis_desc_style(("sans-serif", 18))
        .draw()
        .map_err(|e| LatrefineError::Other(format!("{:?}", e)))?;

    let observed_color = RGBColor(0, 102, 204);
    let predicted_color = RGBColor(204, 0, 0);

    chart
        .draw_series(experiment.observed().map(|x| {
            PathElement::new(
                vec![(x, 0.0), (x, OBSERVED_HEIGHT)],
                observed_color.stroke_width(2),
            )
        }))
        .map_err(|e| LatrefineError::Other(format!("{:?}", e)))?
        .label("Observed")
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], observed_color));

    chart
        .draw_series(fit.predicted.iter().map(|&x| {
            PathElement::new(
                vec![(x, 0.0), (x, PREDICTED_HEIGHT)],
                predicted_color.stroke_width(2),
            )
        }))
        .map_err(|e| LatrefineError::Other(format!("{:?}", e)))?
        .label(format!("Fitted (a = {:.5} Å)", fit.lattice_parameter))
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], predicted_color));

    if options.label_peaks {
        for peak in experiment.peaks() {
            let r = &peak.reflection;
            let label = format!("({}{}{})", r.h, r.k, r.l);
            let text_style = ("sans-serif", 12).into_font().color(&BLACK);

            chart
                .draw_series(std::iter::once(Text::new(
                    label,
                    (peak.two_theta, OBSERVED_HEIGHT + 3.0),
                    text_style,
                )))
                .map_err(|e| LatrefineError::Other(format!("{:?}", e)))?;
        }
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(|e| LatrefineError::Other(format!("{:?}", e)))?;

    let info_text = format!(
        "λ = {:.4} Å, mean |Δ2θ| = {:.5}°",
        experiment.wavelength(),
        fit.deviation
    );
    chart
        .draw_series(std::iter::once(Text::new(
            info_text,
            (x_min + 0.5, 115.0),
            ("sans-serif", 14).into_font().color(&BLACK),
        )))
        .map_err(|e| LatrefineError::Other(format!("{:?}", e)))?;

    Ok(())
}
