//! # 指标化峰位文件解析器
//!
//! 读取 (hkl, 观测 2θ) 列表。
//!
//! ## 支持格式
//! - CSV（.csv）：表头 `h,k,l,two_theta`（`2theta` 亦可）
//! - 文本（其他扩展名）：每行 `h k l 2θ`，空白或逗号分隔，`#` 开始注释
//!
//! ```text
//! # h  k  l   2theta
//!   4  3  1   9.3323
//!   6  3  1  12.4103
//! ```
//!
//! ## 依赖关系
//! - 被 `parsers/mod.rs` 调用
//! - 产生 `models::IndexedPeak`

use crate::error::{LatrefineError, Result};
use crate::models::{IndexedPeak, Reflection};

use serde::Deserialize;
use std::fs;
use std::path::Path;

/// CSV 行
#[derive(Debug, Deserialize)]
struct PeakRecord {
    h: i32,
    k: i32,
    l: i32,
    #[serde(alias = "2theta", alias = "two_theta_deg")]
    two_theta: f64,
}

/// 读取 CSV 峰位文件
pub fn parse_peak_csv(path: &Path) -> Result<Vec<IndexedPeak>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_path(path)
        .map_err(|e| parse_error(path, e.to_string()))?;

    let mut peaks = Vec::new();
    for (i, record) in rdr.deserialize::<PeakRecord>().enumerate() {
        let record = record.map_err(|e| parse_error(path, format!("row {}: {}", i + 1, e)))?;
        peaks.push(IndexedPeak::new(
            Reflection::new(record.h, record.k, record.l),
            record.two_theta,
        ));
    }

    if peaks.is_empty() {
        return Err(parse_error(path, "no peaks found".to_string()));
    }

    Ok(peaks)
}

/// 读取文本峰位文件
pub fn parse_peak_text_file(path: &Path) -> Result<Vec<IndexedPeak>> {
    let content = fs::read_to_string(path).map_err(|e| LatrefineError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_peak_content(&content).map_err(|reason| parse_error(path, reason))
}

/// 解析文本内容
pub fn parse_peak_content(content: &str) -> std::result::Result<Vec<IndexedPeak>, String> {
    let mut peaks = Vec::new();

    for (line_no, raw) in content.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }

        let fields: Vec<&str> = line
            .split(|c: char| c.is_whitespace() || c == ',' || c == ';')
            .filter(|s| !s.is_empty())
            .collect();

        if fields.len() != 4 {
            return Err(format!(
                "line {}: expected 'h k l 2theta', found {} fields",
                line_no + 1,
                fields.len()
            ));
        }

        let index = |s: &str| {
            s.parse::<i32>()
                .map_err(|_| format!("line {}: invalid Miller index '{}'", line_no + 1, s))
        };
        let two_theta: f64 = fields[3]
            .parse()
            .map_err(|_| format!("line {}: invalid 2theta '{}'", line_no + 1, fields[3]))?;

        peaks.push(IndexedPeak::new(
            Reflection::new(index(fields[0])?, index(fields[1])?, index(fields[2])?),
            two_theta,
        ));
    }

    if peaks.is_empty() {
        return Err("no peaks found".to_string());
    }

    Ok(peaks)
}

fn parse_error(path: &Path, reason: String) -> LatrefineError {
    LatrefineError::ParseError {
        format: "peak list".to_string(),
        path: path.display().to_string(),
        reason,
    }
}
