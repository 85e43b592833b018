//! # cif4xas - 晶体 / 分子结构转换为 XAS 计算输入
//!
//! 读取 CIF 或 XYZ 结构，分析晶体学位点，围绕吸收原子构建团簇，
//! 写出 FEFF6 / FEFF8 和 FDMNES 输入文件。
//!
//! ## 子命令
//! - `feff`    - 生成 FEFF 输入 (feff.inp)
//! - `fdmnes`  - 生成 FDMNES 输入
//! - `sites`   - 列出唯一晶体学位点
//! - `cluster` - 导出团簇 (XYZ)
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── config.rs   (TOML 默认值)
//!   ├── logging.rs  (tracing 初始化)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── parsers/   (CIF / XYZ 解析)
//!   │     ├── symmetry/  (对称操作展开与位点分析)
//!   │     ├── xas/       (团簇, FEFF, FDMNES)
//!   │     ├── batch/     (目录批量处理)
//!   │     └── models/    (数据模型)
//!   ├── elements.rs (元素与吸收边数据)
//!   ├── utils/      (工具函数)
//!   └── error.rs    (错误处理)
//! ```

mod batch;
mod cli;
mod commands;
mod config;
mod elements;
mod error;
mod logging;
mod models;
mod parsers;
mod symmetry;
mod utils;
mod xas;

use clap::Parser;
use cli::Cli;
use config::Config;

fn main() {
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.as_deref()) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }

    let result = Config::load(cli.config.as_deref())
        .and_then(|config| commands::run(cli.command, &config, cli.quiet));

    if let Err(e) = result {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
