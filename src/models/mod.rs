//! # 数据模型模块
//!
//! 定义统一的结构与团簇数据模型。
//!
//! ## 依赖关系
//! - 被 `parsers/`, `symmetry/`, `xas/` 和 `commands/` 使用
//! - 子模块: structure, cluster

pub mod cluster;
pub mod structure;

pub use cluster::{Cluster, ClusterAtom};
pub use structure::{CifMetadata, Lattice, Site, Species, Structure, StructureKind};
