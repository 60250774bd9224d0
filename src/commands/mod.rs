//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `parsers/`, `xrd/`, `utils/`
//! - 子模块: refine, predict

pub mod predict;
pub mod refine;

use crate::cli::Commands;
use crate::error::Result;

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Refine(args) => refine::execute(args),
        Commands::Predict(args) => predict::execute(args),
    }
}
