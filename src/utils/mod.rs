//! # 工具函数模块
//!
//! 终端输出、进度条与数字/文本格式化。
//!
//! ## 依赖关系
//! - 被 `commands/`, `batch/`, `xas/` 使用
//! - 子模块: output, progress, format

pub mod format;
pub mod output;
pub mod progress;
