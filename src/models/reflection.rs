//! # 衍射面（Miller 指数）数据模型
//!
//! 定义 (hkl) 三元组及其文本表示。
//!
//! ## 依赖关系
//! - 被 `models/experiment.rs`, `xrd/`, `parsers/` 使用
//! - 使用 `regex` 解析文本形式

use crate::error::{LatrefineError, Result};

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// 接受 `4 3 1`, `4,3,1`, `[4, 3, 1]`, `(4 3 1)` 等写法
static REFLECTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\[(]?\s*(-?\d+)\s*[,\s]\s*(-?\d+)\s*[,\s]\s*(-?\d+)\s*[\])]?$")
        .expect("reflection pattern is valid")
});

/// Miller 指数 (h, k, l)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reflection {
    pub h: i32,
    pub k: i32,
    pub l: i32,
}

impl Reflection {
    pub fn new(h: i32, k: i32, l: i32) -> Self {
        Self { h, k, l }
    }

    /// h² + k² + l²（i128 容纳任意 i32 指数）
    pub fn squared_sum(&self) -> i128 {
        let (h, k, l) = (self.h as i128, self.k as i128, self.l as i128);
        h * h + k * k + l * l
    }

    /// 立方晶系面间距因子 q = √(h²+k²+l²)，d = a / q
    pub fn q(&self) -> f64 {
        (self.squared_sum() as f64).sqrt()
    }
}

impl From<[i32; 3]> for Reflection {
    fn from(hkl: [i32; 3]) -> Self {
        Self::new(hkl[0], hkl[1], hkl[2])
    }
}

impl fmt::Display for Reflection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.h, self.k, self.l)
    }
}

impl FromStr for Reflection {
    type Err = LatrefineError;

    fn from_str(s: &str) -> Result<Self> {
        let caps = REFLECTION_RE
            .captures(s.trim())
            .ok_or_else(|| LatrefineError::InvalidReflection(s.to_string()))?;

        let index = |i: usize| -> Result<i32> {
            caps[i]
                .parse::<i32>()
                .map_err(|_| LatrefineError::InvalidReflection(s.to_string()))
        };

        Ok(Reflection::new(index(1)?, index(2)?, index(3)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_q_factor() {
        let r = Reflection::new(4, 3, 1);
        assert_eq!(r.squared_sum(), 26);
        assert!((r.q() - 26f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_extreme_indices_do_not_overflow() {
        let r: Reflection = "-2147483648 -2147483648 -2147483648".parse().unwrap();
        assert_eq!(r.squared_sum(), 3 * (1i128 << 62));
        assert!(r.q().is_finite() && r.q() > 0.0);
    }

    #[test]
    fn test_display_matches_list_form() {
        assert_eq!(Reflection::new(12, 3, 1).to_string(), "[12, 3, 1]");
        assert_eq!(Reflection::new(-1, 0, 2).to_string(), "[-1, 0, 2]");
    }

    #[test]
    fn test_parse_variants() {
        let expected = Reflection::new(8, 5, 3);
        for s in ["8 5 3", "8,5,3", "[8, 5, 3]", "(8 5 3)", "  8  5\t3 "] {
            assert_eq!(s.parse::<Reflection>().unwrap(), expected, "input {:?}", s);
        }
        assert_eq!(
            "-1 1 0".parse::<Reflection>().unwrap(),
            Reflection::new(-1, 1, 0)
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("1 1".parse::<Reflection>().is_err());
        assert!("a b c".parse::<Reflection>().is_err());
        assert!("1 2 3 4".parse::<Reflection>().is_err());
        assert!("99999999999 0 0".parse::<Reflection>().is_err());
    }
}
