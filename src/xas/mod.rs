//! # XAS 输入生成模块
//!
//! 从结构到 XAS 计算输入的完整流程：
//! 吸收位点分析 → 团簇构建 → FEFF / FDMNES 输入文本。
//!
//! ## 依赖关系
//! - 被 `commands/` 和 `batch/` 使用
//! - 使用 `symmetry/`, `models/`, `elements.rs`
//! - 子模块: sites, cluster, feff, fdmnes, titles, template

pub mod cluster;
pub mod fdmnes;
pub mod feff;
pub mod sites;
pub mod template;
pub mod titles;

#[cfg(test)]
pub(crate) mod fixtures;

pub use cluster::build_cluster;
pub use fdmnes::{FdmnesInput, FdmnesMode, FdmnesOptions};
pub use feff::{cif2feffinp, FeffOptions, FeffVersion};
pub use sites::{SiteRow, XasStructure};
