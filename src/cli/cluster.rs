//! # cluster 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/cluster.rs`

use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ClusterArgs {
    /// CIF or XYZ file
    pub input: PathBuf,

    /// Absorbing element (symbol or atomic number)
    #[arg(short, long)]
    pub absorber: String,

    /// Cluster radius in Angstrom [default: 8.0]
    #[arg(short, long)]
    pub radius: Option<f64>,

    /// Unique absorber site index (see `sites`)
    #[arg(short, long)]
    pub site: Option<usize>,

    /// Structure index in multi-block CIF or multi-frame XYZ (0 = first)
    #[arg(long, default_value_t = 0)]
    pub frame: usize,

    /// Seed for choosing atoms on partially occupied sites
    #[arg(long)]
    pub seed: Option<u64>,

    /// Output XYZ file, or '-' for stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
