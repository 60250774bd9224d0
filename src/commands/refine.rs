//! # refine 命令实现
//!
//! 从指标化峰位精修立方晶格参数。
//!
//! ## 功能
//! - 单文件模式：精修、控制台摘要、追加报告、可选导出与作图
//! - 内联模式：`--hkl` 与 `--peaks` 按顺序配对，其余同单文件模式
//! - 目录批量模式：并行精修所有匹配文件，报告依次追加到同一文件
//!
//! ## 依赖关系
//! - 使用 `cli/refine.rs` 定义的 RefineArgs
//! - 使用 `parsers/` 读取峰位
//! - 使用 `xrd/` 进行精修、报告、导出和作图
//! - 使用 `batch/` 进行批量处理

use crate::batch::{BatchRunner, FileCollector, ProcessResult};
use crate::cli::refine::RefineArgs;
use crate::error::{LatrefineError, Result};
use crate::models::{Experiment, FitResult};
use crate::parsers;
use crate::utils::output;
use crate::xrd::plot::{self, PlotOptions};
use crate::xrd::report::{format_angle, WriterSink};
use crate::xrd::{export, AppendFileSink, RefineOptions, RefinementReport, Refiner, ReportSink};

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tabled::{Table, Tabled};

/// 执行 refine 命令
pub fn execute(args: RefineArgs) -> Result<()> {
    output::print_header("Cubic Lattice Parameter Refinement");

    let refiner = Refiner::new(RefineOptions {
        iterations: args.iterations,
        variation: args.variation,
        resolution: args.resolution,
        shrink: args.shrink,
        parallel: args.parallel,
    });
    refiner.validate(args.lattice)?;

    match args.input {
        Some(ref input) if input.is_file() => {
            let experiment = parsers::load_experiment(input, args.wavelength)?;
            output::print_success(&format!(
                "Loaded {} indexed peaks from '{}'",
                experiment.len(),
                input.display()
            ));
            execute_single(&args, &refiner, &experiment)
        }
        Some(ref input) if input.is_dir() => execute_batch(&args, &refiner, input),
        Some(ref input) => Err(LatrefineError::FileNotFound {
            path: input.display().to_string(),
        }),
        None => {
            let experiment = inline_experiment(&args)?;
            output::print_success(&format!(
                "Using {} indexed peaks from the command line",
                experiment.len()
            ));
            execute_single(&args, &refiner, &experiment)
        }
    }
}

/// 由 `--hkl` 与 `--peaks` 构造实验，两者数量必须一致
fn inline_experiment(args: &RefineArgs) -> Result<Experiment> {
    Experiment::new(
        "inline",
        args.wavelength,
        args.hkl.clone(),
        args.peaks.clone(),
    )
}

/// 单个实验的精修与输出
fn execute_single(args: &RefineArgs, refiner: &Refiner, experiment: &Experiment) -> Result<()> {
    output::print_info(&format!("Using wavelength: {:.6} Å", experiment.wavelength()));
    let options = refiner.options();
    output::print_info(&format!(
        "Initial a = {:.5} Å, {} cycles, ±{} Å window, {} Å step",
        args.lattice, options.iterations, options.variation, options.resolution
    ));

    let fit = refiner.refine(experiment, args.lattice)?;

    print_summary(&fit);
    print_peak_table(experiment, &fit);
    let report = RefinementReport::new(experiment, &fit);

    if args.verbose {
        print_history(&fit);
        output::print_header("Report Block");
        WriterSink::new(std::io::stdout().lock()).write_report(&report)?;
    }

    if !args.no_report {
        let mut sink = AppendFileSink::new(&args.report);
        sink.write_report(&report)?;
        output::print_saved("Report appended", &sink.path().display().to_string());
    }

    if let Some(ref path) = args.export {
        export::export(experiment, &fit, path)?;
        output::print_saved("Peaks exported", &path.display().to_string());
    }

    if let Some(ref path) = args.plot {
        plot::generate_fit_plot(experiment, &fit, path, &plot_options(args, experiment))?;
        output::print_saved("Plot saved", &path.display().to_string());
    }

    Ok(())
}

/// 批量模式共享上下文
struct BatchContext<'a> {
    args: &'a RefineArgs,
    refiner: &'a Refiner,
    sink: Option<Mutex<AppendFileSink>>,
}

/// 批量模式中单个文件的精修摘要
struct BatchFit {
    name: String,
    peaks: usize,
    fit: FitResult,
}

/// 批量处理模式
fn execute_batch(args: &RefineArgs, refiner: &Refiner, dir: &Path) -> Result<()> {
    output::print_info(&format!("Batch mode: directory '{}'", dir.display()));

    let files = FileCollector::new(dir.to_path_buf())
        .with_pattern(&args.pattern)?
        .recursive(args.recursive)
        .collect();

    if files.is_empty() {
        output::print_warning(&format!(
            "No matching files found with pattern '{}'",
            args.pattern
        ));
        return Ok(());
    }

    output::print_info(&format!("Found {} peak files", files.len()));
    output::print_info(&format!("Using wavelength: {:.6} Å", args.wavelength));

    if let Some(ref dir) = args.output_dir {
        fs::create_dir_all(dir).map_err(|e| LatrefineError::FileWriteError {
            path: dir.display().to_string(),
            source: e,
        })?;
    }

    let context = BatchContext {
        args,
        refiner,
        sink: (!args.no_report).then(|| Mutex::new(AppendFileSink::new(&args.report))),
    };

    let runner = BatchRunner::new(args.jobs);
    output::print_info(&format!("Running on {} threads", runner.jobs()));
    let result = runner.run(files, |file| process_batch_file(file, &context))?;

    output::print_separator();
    output::print_success(&format!(
        "Batch complete: {} files, {} success, {} skipped, {} failed",
        result.total(),
        result.successes.len(),
        result.skipped.len(),
        result.failed()
    ));

    if args.verbose {
        for reason in &result.skipped {
            output::print_warning(reason);
        }
    }

    print_batch_table(&result.successes);

    if !result.failures.is_empty() {
        output::print_warning("Failed files:");
        for (path, err) in result.failures.iter().take(10) {
            output::print_error(&format!("  {}: {}", path, err));
        }
        if result.failures.len() > 10 {
            output::print_warning(&format!("  ... and {} more", result.failures.len() - 10));
        }
    }

    if context.sink.is_some() && !result.successes.is_empty() {
        output::print_saved("Reports appended", &args.report.display().to_string());
    }

    Ok(())
}

/// 处理批量模式中的单个文件
fn process_batch_file(input: &PathBuf, context: &BatchContext) -> ProcessResult<BatchFit> {
    let export_path = context.args.output_dir.as_ref().map(|dir| {
        let stem = input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("output");
        dir.join(format!("{}_fit.csv", stem))
    });

    if let Some(ref path) = export_path {
        if path.exists() && !context.args.overwrite {
            return ProcessResult::Skipped(format!("Output exists, skipping: {}", path.display()));
        }
    }

    match refine_file(input, export_path.as_deref(), context) {
        Ok(batch_fit) => ProcessResult::Success(batch_fit),
        Err(e) => ProcessResult::Failed(input.display().to_string(), e.to_string()),
    }
}

/// 精修单个文件并写出报告与导出文件
fn refine_file(
    input: &Path,
    export_path: Option<&Path>,
    context: &BatchContext,
) -> Result<BatchFit> {
    let experiment = parsers::load_experiment(input, context.args.wavelength)?;
    let fit = context.refiner.refine(&experiment, context.args.lattice)?;

    if let Some(ref sink) = context.sink {
        let mut sink = sink
            .lock()
            .map_err(|_| LatrefineError::Other("report sink lock poisoned".to_string()))?;
        sink.write_report(&RefinementReport::new(&experiment, &fit))?;
    }

    if let Some(path) = export_path {
        export::to_csv(&experiment, &fit, path)?;
    }

    Ok(BatchFit {
        name: experiment.name.clone(),
        peaks: experiment.len(),
        fit,
    })
}

fn plot_options(args: &RefineArgs, experiment: &Experiment) -> PlotOptions {
    PlotOptions {
        title: format!("{}: cubic lattice refinement", experiment.name),
        width: args.width,
        height: args.height,
        label_peaks: args.label_peaks,
    }
}

/// 控制台摘要
fn print_summary(fit: &FitResult) {
    let peaks: Vec<String> = fit.predicted.iter().map(|&p| format_angle(p)).collect();

    output::print_success(&format!(
        "Lattice parameter best fit {:.5} Å, variation of {:.2}%",
        fit.lattice_parameter,
        fit.deviation_percent()
    ));
    output::print_result("Lattice parameter", &format!("{:.5}", fit.lattice_parameter), "Å");
    output::print_deviation(fit.deviation);
    output::print_result("Search cycles", &fit.history.len().to_string(), "");
    output::print_info(&format!("Final peak positions: {}", peaks.join(", ")));
}

/// 打印观测与拟合峰位表格
fn print_peak_table(experiment: &Experiment, fit: &FitResult) {
    #[derive(Tabled)]
    struct PeakRow {
        #[tabled(rename = "(hkl)")]
        hkl: String,
        #[tabled(rename = "2θ obs (°)")]
        observed: String,
        #[tabled(rename = "2θ calc (°)")]
        predicted: String,
        #[tabled(rename = "Δ (°)")]
        residual: String,
    }

    let rows: Vec<PeakRow> = experiment
        .peaks()
        .iter()
        .zip(&fit.predicted)
        .map(|(peak, predicted)| {
            let r = &peak.reflection;
            PeakRow {
                hkl: format!("({} {} {})", r.h, r.k, r.l),
                observed: format!("{:.4}", peak.two_theta),
                predicted: format!("{:.5}", predicted),
                residual: format!("{:+.5}", peak.two_theta - predicted),
            }
        })
        .collect();

    output::print_header("Observed vs Fitted Peaks");
    println!("{}", Table::new(&rows));
}

/// 打印各轮搜索记录
fn print_history(fit: &FitResult) {
    #[derive(Tabled)]
    struct CycleRow {
        #[tabled(rename = "Cycle")]
        iteration: usize,
        #[tabled(rename = "Window (Å)")]
        variation: String,
        #[tabled(rename = "Step (Å)")]
        resolution: String,
        #[tabled(rename = "Points")]
        grid_points: usize,
        #[tabled(rename = "Invalid")]
        invalid_trials: usize,
        #[tabled(rename = "Offset (Å)")]
        best_offset: String,
        #[tabled(rename = "a (Å)")]
        lattice_parameter: String,
        #[tabled(rename = "Mean |Δ2θ| (°)")]
        deviation: String,
    }

    let rows: Vec<CycleRow> = fit
        .history
        .iter()
        .map(|c| CycleRow {
            iteration: c.iteration,
            variation: format!("±{:.3e}", c.variation),
            resolution: format!("{:.3e}", c.resolution),
            grid_points: c.grid_points,
            invalid_trials: c.invalid_trials,
            best_offset: format!("{:+.6}", c.best_offset),
            lattice_parameter: format!("{:.6}", c.lattice_parameter),
            deviation: format!("{:.5}", c.deviation),
        })
        .collect();

    output::print_header("Search History");
    println!("{}", Table::new(&rows));
}

/// 打印批量精修结果表格
fn print_batch_table(successes: &[(PathBuf, BatchFit)]) {
    #[derive(Tabled)]
    struct FitRow {
        #[tabled(rename = "Sample")]
        name: String,
        #[tabled(rename = "Peaks")]
        peaks: usize,
        #[tabled(rename = "a (Å)")]
        lattice_parameter: String,
        #[tabled(rename = "Variation (%)")]
        deviation: String,
    }

    let rows: Vec<FitRow> = successes
        .iter()
        .map(|(_, b)| FitRow {
            name: b.name.clone(),
            peaks: b.peaks,
            lattice_parameter: format!("{:.5}", b.fit.lattice_parameter),
            deviation: format!("{:.2}", b.fit.deviation_percent()),
        })
        .collect();

    if !rows.is_empty() {
        output::print_header(&format!("Refined Lattice Parameters ({} samples)", rows.len()));
        println!("{}", Table::new(&rows));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;

    fn refine_args(argv: &[&str]) -> RefineArgs {
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Refine(args) => args,
            _ => panic!("expected refine"),
        }
    }

    #[test]
    fn test_single_file_run_appends_report_and_exports() {
        let dir = std::env::temp_dir().join(format!("latrefine_cmd_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let input = dir.join("reference.dat");
        fs::write(
            &input,
            "4 3 1 9.3323\n6 3 1 12.4103\n8 5 3 18.1539\n12 3 1 22.8179\n14 1 1 25.926\n",
        )
        .unwrap();
        let report = dir.join("report.txt");
        let export = dir.join("fit.csv");

        let argv = [
            "latrefine",
            "refine",
            input.to_str().unwrap(),
            "-w",
            "0.621485",
            "-a",
            "19",
            "-n",
            "6",
            "--report",
            report.to_str().unwrap(),
            "--export",
            export.to_str().unwrap(),
        ];
        execute(refine_args(&argv)).unwrap();
        execute(refine_args(&argv)).unwrap();

        let text = fs::read_to_string(&report).unwrap();
        assert_eq!(text.matches(" Lattice parameter: 19.49450").count(), 2);
        assert!(text.contains("Reflections: [4, 3, 1]; [6, 3, 1]"));
        assert!(export.exists());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_batch_run_collects_failures() {
        let dir = std::env::temp_dir().join(format!("latrefine_batch_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("good.dat"), "1 1 1 28.44371\n2 2 0 47.30507\n").unwrap();
        fs::write(dir.join("broken.dat"), "1 1 28.4\n").unwrap();
        let out = dir.join("fits");

        let argv = [
            "latrefine",
            "refine",
            dir.to_str().unwrap(),
            "-w",
            "cu-ka1",
            "-a",
            "5.2",
            "-n",
            "6",
            "--no-report",
            "-o",
            out.to_str().unwrap(),
            "-j",
            "2",
        ];
        execute(refine_args(&argv)).unwrap();

        assert!(out.join("good_fit.csv").exists());
        assert!(!out.join("broken_fit.csv").exists());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_inline_peaks_run() {
        let dir = std::env::temp_dir().join(format!("latrefine_inline_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let report = dir.join("report.txt");

        execute(refine_args(&[
            "latrefine",
            "refine",
            "-w",
            "cu-ka1",
            "-a",
            "5.2",
            "-n",
            "6",
            "--hkl",
            "1 1 1",
            "--hkl",
            "[2, 2, 0]",
            "--peaks",
            "28.44371,47.30507",
            "--report",
            report.to_str().unwrap(),
        ]))
        .unwrap();

        let text = fs::read_to_string(&report).unwrap();
        assert!(text.contains("Reflections: [1, 1, 1]; [2, 2, 0]"));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_inline_peaks_must_pair_with_reflections() {
        let args = refine_args(&[
            "latrefine",
            "refine",
            "-w",
            "cu-ka1",
            "-a",
            "5.2",
            "--hkl",
            "1 1 1",
            "--hkl",
            "2 2 0",
            "--peaks",
            "28.44371",
            "--no-report",
        ]);
        assert!(matches!(
            execute(args),
            Err(LatrefineError::ShapeMismatch {
                reflections: 2,
                peaks: 1
            })
        ));
    }

    #[test]
    fn test_existing_export_is_skipped_with_reason() {
        let dir = std::env::temp_dir().join(format!("latrefine_skip_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let input = dir.join("si.dat");
        fs::write(&input, "1 1 1 28.44371\n2 2 0 47.30507\n").unwrap();
        let out = dir.join("fits");
        fs::create_dir_all(&out).unwrap();

        let args = refine_args(&[
            "latrefine",
            "refine",
            dir.to_str().unwrap(),
            "-w",
            "cu-ka1",
            "-a",
            "5.2",
            "--no-report",
            "-o",
            out.to_str().unwrap(),
        ]);
        let refiner = Refiner::default();
        let context = BatchContext {
            args: &args,
            refiner: &refiner,
            sink: None,
        };

        assert!(matches!(
            process_batch_file(&input, &context),
            ProcessResult::Success(_)
        ));
        match process_batch_file(&input, &context) {
            ProcessResult::Skipped(reason) => assert!(reason.contains("si_fit.csv")),
            _ => panic!("expected the second run to be skipped"),
        }

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_input() {
        let args = refine_args(&[
            "latrefine",
            "refine",
            "/nonexistent/peaks.dat",
            "-w",
            "1.0",
            "-a",
            "5",
        ]);
        assert!(matches!(
            execute(args),
            Err(LatrefineError::FileNotFound { .. })
        ));
    }
}
