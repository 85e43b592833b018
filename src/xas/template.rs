//! # 输入文件模板
//!
//! 内置 FEFF6 / FEFF8 模板以及 `{name}` 占位符替换。
//!
//! ## 依赖关系
//! - 被 `xas/feff.rs` 使用
//! - 使用 `regex` 匹配占位符

use crate::error::{Cif4xasError, Result};
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::LazyLock;

pub const FEFF8_TEMPLATE: &str = include_str!("templates/feff8_exafs.tmpl");
pub const FEFF6_TEMPLATE: &str = include_str!("templates/feff6_exafs.tmpl");

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([a-z_][a-z0-9_]*)\}").expect("valid placeholder regex"));

/// 用 `values` 替换模板中的 `{name}` 占位符，缺少的占位符视为错误
pub fn render(template: &str, values: &HashMap<&str, String>) -> Result<String> {
    if let Some(missing) = PLACEHOLDER_RE
        .captures_iter(template)
        .map(|c| c[1].to_string())
        .find(|name| !values.contains_key(name.as_str()))
    {
        return Err(Cif4xasError::TemplateError(missing));
    }

    let rendered = PLACEHOLDER_RE.replace_all(template, |caps: &Captures| {
        values.get(&caps[1]).cloned().unwrap_or_default()
    });
    Ok(rendered.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_placeholders() {
        let mut values = HashMap::new();
        values.insert("edge", "K".to_string());
        values.insert("radius", "8.00".to_string());
        let out = render("EDGE {edge}\nRPATH {radius}\n", &values).unwrap();
        assert_eq!(out, "EDGE K\nRPATH 8.00\n");
    }

    #[test]
    fn test_missing_placeholder_is_error() {
        let values = HashMap::new();
        let err = render("EDGE {edge}", &values).unwrap_err();
        assert!(matches!(err, Cif4xasError::TemplateError(ref name) if name == "edge"));
    }

    #[test]
    fn test_builtin_templates_have_core_placeholders() {
        for tmpl in [FEFF8_TEMPLATE, FEFF6_TEMPLATE] {
            for key in ["{titles}", "{comments}", "{potentials}", "{atoms}", "{radius}"] {
                assert!(tmpl.contains(key), "missing {}", key);
            }
        }
    }
}
