//! # 统一错误处理模块
//!
//! 定义 latrefine 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 使用 `models/reflection.rs` 的 Reflection（DomainError 携带出错的衍射面）

use crate::models::Reflection;

use thiserror::Error;

/// latrefine 统一错误类型
#[derive(Error, Debug)]
pub enum LatrefineError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 解析错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to parse {format} file: {path}\nReason: {reason}")]
    ParseError {
        format: String,
        path: String,
        reason: String,
    },

    #[error("Invalid reflection '{0}' (expected three integers, e.g. '4 3 1' or '[4, 3, 1]')")]
    InvalidReflection(String),

    // ─────────────────────────────────────────────────────────────
    // 数据与参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Shape mismatch: {reflections} reflections but {peaks} observed peaks")]
    ShapeMismatch { reflections: usize, peaks: usize },

    // ─────────────────────────────────────────────────────────────
    // 精修错误
    // ─────────────────────────────────────────────────────────────
    #[error(
        "Bragg condition cannot be satisfied for {reflection} at a = {lattice_parameter} Å (|λq/2a| > 1)"
    )]
    DomainError {
        lattice_parameter: f64,
        reflection: Reflection,
    },

    #[error(
        "Empty search grid in iteration {iteration} (variation = {variation:e}, resolution = {resolution:e})"
    )]
    EmptyGrid {
        iteration: usize,
        variation: f64,
        resolution: f64,
    },

    #[error("No trial lattice parameter in iteration {iteration} satisfies the Bragg condition for every reflection")]
    NoValidTrial { iteration: usize },

    // ─────────────────────────────────────────────────────────────
    // CSV 错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, LatrefineError>;
