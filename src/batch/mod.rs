//! # 批量处理模块
//!
//! 输入为目录时，收集结构文件并行生成 XAS 输入。
//!
//! ## 依赖关系
//! - 被 `commands/feff.rs`, `commands/fdmnes.rs` 使用
//! - 使用 `rayon` 进行并行处理
//! - 使用 `indicatif` 显示进度

pub mod collector;
pub mod runner;

pub use collector::{FileCollector, DEFAULT_PATTERN};
pub use runner::{file_seed, BatchRunner, ProcessResult};
