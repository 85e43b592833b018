//! # 文本格式化工具
//!
//! 数值紧凑格式化、严格 ASCII 化和时间戳。
//!
//! ## 依赖关系
//! - 被 `models/`, `xas/` 使用
//! - 使用 `chrono` 生成时间戳

/// 格式化浮点数，去掉多余的尾随零 (6 位小数，至少保留一位)
pub fn fcompact(val: f64) -> String {
    let mut s = format!("{:.6}", val);
    while s.ends_with('0') {
        s.pop();
    }
    if s.ends_with('.') {
        s.push('0');
    }
    if s == "-0.0" {
        s = "0.0".to_string();
    }
    s
}

/// 保证输出为纯 ASCII：所有 >= 128 的字节替换为 `replacement`
pub fn strict_ascii(s: &str, replacement: char) -> String {
    s.bytes()
        .map(|b| if b < 128 { b as char } else { replacement })
        .collect()
}

/// 当前本地时间 `YYYY-MM-DD HH:MM:SS`
pub fn isotime() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
