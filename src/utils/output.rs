//! # 美化输出工具
//!
//! 提供统一的终端输出样式：状态行、结果行、拟合质量着色、标题栏。
//!
//! ## 依赖关系
//! - 被 `main.rs` 和 `commands/` 模块使用
//! - 使用 `colored` crate

use colored::Colorize;

/// 打印成功消息
pub fn print_success(msg: &str) {
    println!("{} {}", "[OK]".green().bold(), msg);
}

/// 打印错误消息
pub fn print_error(msg: &str) {
    eprintln!("{} {}", "[ERR]".red().bold(), msg);
}

/// 打印警告消息
pub fn print_warning(msg: &str) {
    println!("{} {}", "[WARN]".yellow().bold(), msg);
}

/// 打印信息消息
pub fn print_info(msg: &str) {
    println!("{} {}", "[*]".blue().bold(), msg);
}

/// 打印输出文件消息
pub fn print_saved(what: &str, path: &str) {
    println!("{} {} {} {}", "[OK]".green().bold(), what, "->".cyan(), path);
}

/// 打印对齐的结果行，例如 `a:  19.49450 Å`
pub fn print_result(label: &str, value: &str, unit: &str) {
    let label = format!("{:<20}", format!("{}:", label));
    println!("  {} {} {}", label.cyan(), value.bold(), unit.dimmed());
}

/// 平均绝对偏差（度）的着色等级
pub fn fit_quality(deviation: f64) -> &'static str {
    if deviation < 0.01 {
        "good"
    } else if deviation < 0.05 {
        "fair"
    } else {
        "poor"
    }
}

/// 打印平均绝对偏差并按拟合质量着色
pub fn print_deviation(deviation: f64) {
    let value = format!("{:.5}", deviation);
    let value = match fit_quality(deviation) {
        "good" => value.green(),
        "fair" => value.yellow(),
        _ => value.red(),
    };
    let label = format!("{:<20}", "Mean |Δ2θ|:");
    println!(
        "  {} {} {} ({})",
        label.cyan(),
        value.bold(),
        "°".dimmed(),
        fit_quality(deviation)
    );
}

/// 打印标题栏
pub fn print_header(title: &str) {
    let line = "─".repeat(60);
    println!("\n{}", line.dimmed());
    println!("  {}", title.bold());
    println!("{}\n", line.dimmed());
}

/// 打印分隔线
pub fn print_separator() {
    println!("{}", "─".repeat(60).dimmed());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_quality_thresholds() {
        assert_eq!(fit_quality(0.00361), "good");
        assert_eq!(fit_quality(0.02), "fair");
        assert_eq!(fit_quality(0.427), "poor");
    }
}
