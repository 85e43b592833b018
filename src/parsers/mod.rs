//! # 解析器模块
//!
//! 提供结构文件的解析器，统一产出 `Structure`。
//!
//! ## 依赖关系
//! - 被 `commands/` 和 `batch/` 使用
//! - 使用 `models/` 数据模型
//! - 子模块: cif, xyz

pub mod cif;
pub mod xyz;

use crate::error::{Cif4xasError, Result};
use crate::models::Structure;
use std::path::Path;

/// 支持的结构文件扩展名
pub const SUPPORTED_EXTENSIONS: &[&str] = &["cif", "xyz"];

/// 从文件路径推断格式并解析第 `frame` 个结构
pub fn parse_structure_file(path: &Path, frame: usize) -> Result<Structure> {
    if !path.exists() {
        return Err(Cif4xasError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "cif" => cif::parse_cif_file(path, frame),
        "xyz" => xyz::parse_xyz_file(path, frame),
        _ => Err(Cif4xasError::UnsupportedFormat(format!(
            "file type '.{}' not supported (expected {}): {}",
            ext,
            SUPPORTED_EXTENSIONS.join(", "),
            path.display()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StructureKind;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_dispatch_by_extension() {
        let dir = tempdir().unwrap();
        let xyz = dir.path().join("co.xyz");
        fs::write(&xyz, "2\ncarbon monoxide\nC 0 0 0\nO 0 0 1.128\n").unwrap();
        let s = parse_structure_file(&xyz, 0).unwrap();
        assert_eq!(s.kind, StructureKind::Molecule);
        assert_eq!(s.label, "co");

        let other = dir.path().join("POSCAR.vasp");
        fs::write(&other, "").unwrap();
        assert!(matches!(
            parse_structure_file(&other, 0),
            Err(Cif4xasError::UnsupportedFormat(_))
        ));

        assert!(matches!(
            parse_structure_file(&dir.path().join("missing.cif"), 0),
            Err(Cif4xasError::FileNotFound { .. })
        ));
    }
}
