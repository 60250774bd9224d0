//! # 立方晶系衍射峰位计算器
//!
//! 正向模型：给定晶格参数 a，计算各衍射面的理论 2θ，并评估与观测峰的吻合程度。
//!
//! ## 算法概述
//! 1. 面间距 d = a / √(h²+k²+l²)
//! 2. Bragg 定律 λ = 2d·sinθ，得 2θ = 2·arcsin(λq / 2a)
//! 3. 2θ 保留 5 位小数
//! 4. 目标函数：|观测 − 预测| 的算术平均，保留 5 位小数
//!
//! ## 依赖关系
//! - 被 `xrd/refine.rs` 反复调用
//! - 被 `commands/predict.rs` 直接调用
//! - 使用 `models/` 的 Experiment, Reflection, Trial

use crate::error::{LatrefineError, Result};
use crate::models::{Experiment, Reflection, Trial};

/// 按 5 位小数舍入（银行家舍入）
pub fn round5(x: f64) -> f64 {
    (x * 1e5).round_ties_even() / 1e5
}

/// 计算单个衍射面的 2θ（度）
///
/// `|λq / 2a| > 1` 时 Bragg 条件无解，返回 `DomainError`；a ≤ 0 同样视为无解。
pub fn two_theta(wavelength: f64, lattice_parameter: f64, reflection: &Reflection) -> Result<f64> {
    let sin_theta = wavelength * reflection.q() / (2.0 * lattice_parameter);

    if lattice_parameter <= 0.0 || !sin_theta.is_finite() || sin_theta.abs() > 1.0 {
        return Err(LatrefineError::DomainError {
            lattice_parameter,
            reflection: *reflection,
        });
    }

    Ok(round5(2.0 * sin_theta.asin().to_degrees()))
}

/// 计算一组衍射面的理论 2θ，顺序与输入一致
pub fn predict_angles<'a, I>(
    wavelength: f64,
    lattice_parameter: f64,
    reflections: I,
) -> Result<Vec<f64>>
where
    I: IntoIterator<Item = &'a Reflection>,
{
    reflections
        .into_iter()
        .map(|r| two_theta(wavelength, lattice_parameter, r))
        .collect()
}

/// 平均绝对偏差（保留 5 位小数）
pub fn mean_abs_deviation(observed: &[f64], predicted: &[f64]) -> f64 {
    let total: f64 = observed
        .iter()
        .zip(predicted)
        .map(|(obs, pred)| (obs - pred).abs())
        .sum();
    round5(total / observed.len() as f64)
}

/// 在给定晶格参数下评估实验（纯函数，不修改任何状态）
pub fn evaluate(experiment: &Experiment, lattice_parameter: f64) -> Result<Trial> {
    let predicted = predict_angles(
        experiment.wavelength(),
        lattice_parameter,
        experiment.reflections(),
    )?;
    let observed: Vec<f64> = experiment.observed().collect();
    let deviation = mean_abs_deviation(&observed, &predicted);

    Ok(Trial {
        lattice_parameter,
        predicted,
        deviation,
    })
}

/// 目标函数值
pub fn objective(experiment: &Experiment, lattice_parameter: f64) -> Result<f64> {
    evaluate(experiment, lattice_parameter).map(|t| t.deviation)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WL: f64 = 0.621485;

    fn reference_experiment() -> Experiment {
        let reflections = [[4, 3, 1], [6, 3, 1], [8, 5, 3], [12, 3, 1], [14, 1, 1]]
            .into_iter()
            .map(Reflection::from)
            .collect();
        Experiment::new(
            "reference",
            WL,
            reflections,
            vec![9.3323, 12.4103, 18.1539, 22.8179, 25.926],
        )
        .unwrap()
    }

    #[test]
    fn test_round5() {
        assert_eq!(round5(1.234567), 1.23457);
        assert_eq!(round5(-0.000004), -0.0);
        assert_eq!(round5(28.443712), 28.44371);
    }

    #[test]
    fn test_si_111_cu_ka1() {
        // Si a = 5.4307 Å, Cu Kα1: (111) 约 28.44°
        let angle = two_theta(1.5406, 5.4307, &Reflection::new(1, 1, 1)).unwrap();
        assert!((angle - 28.44371).abs() < 1e-5, "got {}", angle);
    }

    #[test]
    fn test_permutation_invariance() {
        let a = two_theta(WL, 19.0, &Reflection::new(4, 3, 1)).unwrap();
        let b = two_theta(WL, 19.0, &Reflection::new(3, 4, 1)).unwrap();
        let c = two_theta(WL, 19.0, &Reflection::new(1, -3, 4)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn test_angles_decrease_with_lattice_parameter() {
        let exp = reference_experiment();
        let small = predict_angles(WL, 18.5, exp.reflections()).unwrap();
        let large = predict_angles(WL, 19.5, exp.reflections()).unwrap();
        for (s, l) in small.iter().zip(&large) {
            assert!(s > l, "{} should exceed {}", s, l);
        }
    }

    #[test]
    fn test_zero_reflection_is_zero_angle() {
        assert_eq!(two_theta(WL, 5.0, &Reflection::new(0, 0, 0)).unwrap(), 0.0);
    }

    #[test]
    fn test_domain_error_when_lattice_too_small() {
        // (14 1 1): λq/2a > 1 需要 a < 4.373
        let err = two_theta(WL, 4.0, &Reflection::new(14, 1, 1)).unwrap_err();
        match err {
            LatrefineError::DomainError {
                lattice_parameter,
                reflection,
            } => {
                assert_eq!(lattice_parameter, 4.0);
                assert_eq!(reflection, Reflection::new(14, 1, 1));
            }
            other => panic!("unexpected error: {}", other),
        }

        assert!(two_theta(WL, 0.0, &Reflection::new(1, 0, 0)).is_err());
        assert!(two_theta(WL, -3.0, &Reflection::new(1, 0, 0)).is_err());

        for hkl in ["2147483647 2147483647 2147483647", "-2147483648 -2147483648 -2147483648"] {
            let r: Reflection = hkl.parse().unwrap();
            assert!(matches!(
                two_theta(1.5406, 5.0, &r),
                Err(LatrefineError::DomainError { .. })
            ));
        }
    }

    #[test]
    fn test_objective_zero_on_synthetic_peaks() {
        let reflections: Vec<Reflection> = vec![
            Reflection::new(1, 1, 1),
            Reflection::new(2, 2, 0),
            Reflection::new(3, 1, 1),
        ];
        let peaks = predict_angles(1.5406, 5.4307, &reflections).unwrap();
        let exp = Experiment::new("Si", 1.5406, reflections, peaks).unwrap();

        assert_eq!(objective(&exp, 5.4307).unwrap(), 0.0);
        assert!(objective(&exp, 5.5).unwrap() > 0.0);
    }

    #[test]
    fn test_objective_non_negative_and_idempotent() {
        let exp = reference_experiment();
        for a in [18.0, 19.0, 19.4945, 21.0] {
            let first = objective(&exp, a).unwrap();
            let second = objective(&exp, a).unwrap();
            assert!(first >= 0.0);
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_evaluate_reference_point() {
        let trial = evaluate(&reference_experiment(), 19.494496).unwrap();
        assert_eq!(trial.predicted.len(), 5);
        assert!((trial.deviation - 0.00361).abs() < 1e-5, "{}", trial.deviation);
        assert!((trial.predicted[0] - 9.32411).abs() < 1e-5);
    }
}
