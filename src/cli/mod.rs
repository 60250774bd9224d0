//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `refine`: 从指标化峰位精修立方晶格参数（单文件或目录批量）
//! - `predict`: 给定晶格参数计算理论 2θ
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: refine, predict

pub mod predict;
pub mod refine;

use clap::{Parser, Subcommand};

/// latrefine - 立方晶格参数精修工具
#[derive(Parser)]
#[command(name = "latrefine")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(about = "Refine the cubic lattice parameter from indexed X-ray powder diffraction peaks", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Refine the lattice parameter against observed 2θ peak positions
    Refine(refine::RefineArgs),

    /// Predict 2θ positions of reflections for a given lattice parameter
    Predict(predict::PredictArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_refine_defaults() {
        let cli = Cli::try_parse_from([
            "latrefine", "refine", "peaks.dat", "-w", "0.621485", "-a", "19",
        ])
        .unwrap();

        match cli.command {
            Commands::Refine(args) => {
                assert_eq!(args.iterations, 3);
                assert_eq!(args.variation, 1.0);
                assert_eq!(args.resolution, 0.1);
                assert_eq!(args.shrink, 5.0);
                assert_eq!(args.lattice, 19.0);
                assert_eq!(args.input, Some("peaks.dat".into()));
                assert!(args.hkl.is_empty());
                assert!(!args.no_report);
            }
            _ => panic!("expected refine"),
        }
    }

    #[test]
    fn test_parse_refine_inline_peaks() {
        let cli = Cli::try_parse_from([
            "latrefine", "refine", "-w", "cu-ka1", "-a", "5.2", "--hkl", "1 1 1", "--hkl",
            "2 2 0", "--peaks", "28.44371,47.30507",
        ])
        .unwrap();

        match cli.command {
            Commands::Refine(args) => {
                assert_eq!(args.input, None);
                assert_eq!(args.hkl.len(), 2);
                assert_eq!(args.peaks, vec![28.44371, 47.30507]);
            }
            _ => panic!("expected refine"),
        }
    }

    #[test]
    fn test_refine_needs_input_or_inline_peaks() {
        assert!(Cli::try_parse_from(["latrefine", "refine", "-w", "1.0", "-a", "5"]).is_err());
        assert!(Cli::try_parse_from([
            "latrefine", "refine", "peaks.dat", "-w", "1.0", "-a", "5", "--hkl", "1 1 1",
            "--peaks", "20",
        ])
        .is_err());
    }

    #[test]
    fn test_parse_predict_hkl() {
        let cli = Cli::try_parse_from([
            "latrefine", "predict", "-w", "cu-ka1", "-a", "5.4307", "--hkl", "1 1 1", "--hkl",
            "[2, 2, 0]",
        ])
        .unwrap();

        match cli.command {
            Commands::Predict(args) => assert_eq!(args.hkl.len(), 2),
            _ => panic!("expected predict"),
        }
    }
}
