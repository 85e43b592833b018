//! # sites 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/sites.rs`

use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct SitesArgs {
    /// CIF or XYZ file
    pub input: PathBuf,

    /// Absorbing element to mark; default is the first element
    #[arg(short, long)]
    pub absorber: Option<String>,

    /// Structure index in multi-block CIF or multi-frame XYZ (0 = first)
    #[arg(long, default_value_t = 0)]
    pub frame: usize,

    /// Export the site table as CSV
    #[arg(long, value_name = "FILE")]
    pub csv: Option<PathBuf>,
}
