//! # 终端输出
//!
//! 统一的状态行样式。写入的输入文件路径走 stdout，错误和警告走 stderr，
//! 方便把 stdout 重定向到文件列表。
//!
//! ## 依赖关系
//! - 被 `main.rs`, `commands/`, `batch/` 使用
//! - 使用 `colored` crate

use colored::Colorize;

pub fn print_success(msg: &str) {
    println!("{} {}", "[OK]".green().bold(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "[ERR]".red().bold(), msg);
}

pub fn print_warning(msg: &str) {
    eprintln!("{} {}", "[WARN]".yellow().bold(), msg);
}

pub fn print_info(msg: &str) {
    println!("{} {}", "[*]".blue().bold(), msg);
}

pub fn print_done(msg: &str) {
    println!("{} {}", "[DONE]".green().bold(), msg);
}

/// `结构文件 -> 生成文件`
pub fn print_written(input: &str, output: &str) {
    println!(
        "{} {} {} {}",
        "[OK]".green().bold(),
        input.dimmed(),
        "->".cyan(),
        output
    );
}

/// 对齐的 `键: 值` 行
pub fn print_kv(key: &str, value: &str) {
    println!("  {:<14} {}", format!("{}:", key).bold(), value);
}

pub fn print_header(title: &str) {
    let line = "─".repeat(60);
    println!("\n{}", line.dimmed());
    println!("  {}", title.bold());
    println!("{}\n", line.dimmed());
}
