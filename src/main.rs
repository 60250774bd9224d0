//! # latrefine - 立方晶格参数精修工具
//!
//! 从已指标化的 X 射线粉末衍射峰位（hkl, 2θ）精修立方晶胞的晶格参数。
//!
//! ## 子命令
//! - `refine`  - 由粗到细网格搜索，最小化预测与观测 2θ 的平均绝对偏差
//! - `predict` - 给定晶格参数计算理论峰位
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── parsers/   (峰位文件解析)
//!   │     ├── xrd/       (正向模型、精修、报告、导出、作图)
//!   │     ├── batch/     (目录批量处理)
//!   │     └── models/    (数据模型)
//!   ├── utils/      (工具函数)
//!   └── error.rs    (错误处理)
//! ```

mod batch;
mod cli;
mod commands;
mod error;
mod models;
mod parsers;
mod utils;
mod xrd;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
