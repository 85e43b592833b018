//! # fdmnes 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/fdmnes.rs`

use super::BatchArgs;
use crate::elements::Edge;

use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct FdmnesArgs {
    /// CIF or XYZ file, or a directory of them
    pub input: PathBuf,

    /// Absorbing element (symbol or atomic number)
    #[arg(short, long)]
    pub absorber: String,

    /// Absorption edge; default by atomic number
    #[arg(short, long)]
    pub edge: Option<Edge>,

    /// Cluster radius in Angstrom [default: 7.0]
    #[arg(short, long)]
    pub radius: Option<f64>,

    /// Unique absorber site index (see `sites`)
    #[arg(short, long)]
    pub site: Option<usize>,

    /// Structure index in multi-block CIF or multi-frame XYZ (0 = first)
    #[arg(long, default_value_t = 0)]
    pub frame: usize,

    /// Write the full unit cell (Crystal block) instead of a cluster
    #[arg(long, default_value_t = false)]
    pub crystal: bool,

    /// Use the multiple scattering (Green) mode
    #[arg(long, default_value_t = false)]
    pub green: bool,

    /// Include quadrupole transitions
    #[arg(long, default_value_t = false)]
    pub quadrupole: bool,

    /// Self-consistent potential
    #[arg(long, default_value_t = false)]
    pub scf: bool,

    /// Seed for choosing atoms on partially occupied sites
    #[arg(long)]
    pub seed: Option<u64>,

    /// Output file, directory, or '-' for stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub batch: BatchArgs,
}
