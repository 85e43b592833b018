//! # feff 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/feff.rs`

use super::BatchArgs;
use crate::elements::Edge;

use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct FeffArgs {
    /// CIF or XYZ file, or a directory of them
    pub input: PathBuf,

    /// Absorbing element (symbol or atomic number)
    #[arg(short, long)]
    pub absorber: String,

    /// Absorption edge (K, L1, L2, L3, M1..M5); default by atomic number
    #[arg(short, long)]
    pub edge: Option<Edge>,

    /// Cluster radius in Angstrom [default: 8.0]
    #[arg(short, long)]
    pub radius: Option<f64>,

    /// Unique absorber site index (see `sites`)
    #[arg(short, long)]
    pub site: Option<usize>,

    /// Structure index in multi-block CIF or multi-frame XYZ (0 = first)
    #[arg(long, default_value_t = 0)]
    pub frame: usize,

    /// Keep hydrogen atoms in the cluster
    #[arg(long, default_value_t = false)]
    pub with_h: bool,

    /// Write a FEFF6 input instead of FEFF8
    #[arg(long, default_value_t = false)]
    pub feff6: bool,

    /// Seed for choosing atoms on partially occupied sites
    #[arg(long)]
    pub seed: Option<u64>,

    /// Extra TITLE line (repeatable)
    #[arg(long = "title", value_name = "TEXT")]
    pub titles: Vec<String>,

    /// Custom template file with {placeholders}
    #[arg(long, value_name = "FILE")]
    pub template: Option<PathBuf>,

    /// Skip titles taken from CIF metadata
    #[arg(long, default_value_t = false)]
    pub no_cif_titles: bool,

    /// Output file, directory, or '-' for stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub batch: BatchArgs,
}
