//! # 对称性模块
//!
//! 对称操作解析、非对称单元展开以及基于 moyo 的空间群分析。
//!
//! ## 依赖关系
//! - 被 `parsers/cif.rs`, `xas/sites.rs` 使用
//! - 子模块: symop, expand, analysis, spacegroups

pub mod analysis;
pub mod expand;
pub mod spacegroups;
pub mod symop;

pub use analysis::{analyze, DEFAULT_SYMPREC};
pub use expand::{expand_asymmetric_unit, AsymAtom, SITE_TOLERANCE};
pub use symop::SymOp;
