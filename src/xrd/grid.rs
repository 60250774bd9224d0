//! # 一维偏移网格
//!
//! 生成 `[-v, -v + r, -v + 2r, ...]`（不含 +v）的偏移量序列。
//!
//! ## 依赖关系
//! - 被 `xrd/refine.rs` 使用

/// 浮点误差容限：2v/r 恰为整数时不额外生成 +v 这一点
const GRID_EPS: f64 = 1e-9;

/// 网格点数 `ceil(2v/r)`，非法输入返回 0
pub fn grid_len(variation: f64, resolution: f64) -> usize {
    if !(variation > 0.0 && resolution > 0.0) {
        return 0;
    }

    let ratio = 2.0 * variation / resolution;
    if !ratio.is_finite() {
        return 0;
    }

    (ratio - GRID_EPS).ceil().max(0.0) as usize
}

/// 生成偏移量网格（升序）
pub fn offsets(variation: f64, resolution: f64) -> Vec<f64> {
    (0..grid_len(variation, resolution))
        .map(|i| -variation + i as f64 * resolution)
        .collect()
}
