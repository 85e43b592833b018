//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `feff`: 生成 FEFF6 / FEFF8 输入
//! - `fdmnes`: 生成 FDMNES 输入
//! - `sites`: 列出唯一晶体学位点
//! - `cluster`: 导出吸收原子周围的团簇 (XYZ)
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: feff, fdmnes, sites, cluster

pub mod cluster;
pub mod fdmnes;
pub mod feff;
pub mod sites;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// cif4xas - CIF / XYZ 结构转换为 XAS 计算输入
#[derive(Parser, Debug)]
#[command(name = "cif4xas")]
#[command(version)]
#[command(about = "Build FEFF and FDMNES inputs from CIF and XYZ structures", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress logs and progress bars
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Also write logs to this file
    #[arg(long, global = true, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// TOML file with default options
    #[arg(long, global = true, env = "CIF4XAS_CONFIG", value_name = "TOML")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a FEFF input file (feff.inp) for an absorber
    Feff(feff::FeffArgs),

    /// Write an FDMNES input file for an absorber
    Fdmnes(fdmnes::FdmnesArgs),

    /// Show the unique crystallographic sites of a structure
    Sites(sites::SitesArgs),

    /// Write the atom cluster around an absorber as XYZ
    Cluster(cluster::ClusterArgs),
}

/// 目录输入时的批量参数
#[derive(Args, Debug, Clone)]
pub struct BatchArgs {
    /// Glob pattern(s) for files in a directory input, comma separated
    #[arg(short, long, default_value = crate::batch::DEFAULT_PATTERN)]
    pub pattern: String,

    /// Recurse into subdirectories
    #[arg(short = 'R', long, default_value_t = false)]
    pub recursive: bool,

    /// Number of parallel jobs (0 = auto)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Overwrite existing output files
    #[arg(long, default_value_t = false)]
    pub overwrite: bool,
}
