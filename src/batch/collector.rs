//! # 结构文件收集器
//!
//! 单文件直接返回；目录按 glob 模式收集 `.cif` / `.xyz` 文件，结果排序，
//! 保证批量输出顺序稳定。
//!
//! ## 依赖关系
//! - 被 `commands/feff.rs`, `commands/fdmnes.rs` 调用
//! - 使用 `walkdir` 遍历目录, `glob` 匹配文件名

use crate::error::{Cif4xasError, Result};

use glob::Pattern;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 默认匹配模式
pub const DEFAULT_PATTERN: &str = "*.cif,*.xyz";

pub struct FileCollector {
    input: PathBuf,
    patterns: Vec<Pattern>,
    recursive: bool,
}

impl FileCollector {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            patterns: Vec::new(),
            recursive: false,
        }
    }

    /// 逗号分隔的多个模式，如 `*.cif,*.xyz`
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self> {
        let mut patterns = Vec::new();
        for p in pattern.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let compiled = Pattern::new(p).map_err(|e| {
                Cif4xasError::InvalidArgument(format!("Invalid pattern '{}': {}", p, e))
            })?;
            patterns.push(compiled);
        }
        self.patterns = patterns;
        Ok(self)
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn collect(&self) -> Result<Vec<PathBuf>> {
        if self.input.is_file() {
            return Ok(vec![self.input.clone()]);
        }
        if !self.input.is_dir() {
            return Err(Cif4xasError::FileNotFound {
                path: self.input.display().to_string(),
            });
        }

        let max_depth = if self.recursive { usize::MAX } else { 1 };
        let mut files: Vec<PathBuf> = WalkDir::new(&self.input)
            .max_depth(max_depth)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| self.matches(e.path()))
            .map(|e| e.path().to_path_buf())
            .collect();
        files.sort();
        Ok(files)
    }

    fn matches(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        if self.patterns.is_empty() {
            return true;
        }
        self.patterns.iter().any(|p| p.matches(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_collect_directory() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.cif"), "").unwrap();
        fs::write(dir.path().join("a.xyz"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("c.cif"), "").unwrap();

        let files = FileCollector::new(dir.path())
            .with_pattern(DEFAULT_PATTERN)
            .unwrap()
            .collect()
            .unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.xyz", "b.cif"]);

        let files = FileCollector::new(dir.path())
            .with_pattern("*.cif")
            .unwrap()
            .recursive(true)
            .collect()
            .unwrap();
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_single_file_and_missing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("NaCl.cif");
        fs::write(&path, "").unwrap();
        let files = FileCollector::new(&path).collect().unwrap();
        assert_eq!(files, vec![path]);

        let missing = FileCollector::new(dir.path().join("none")).collect();
        assert!(matches!(missing, Err(Cif4xasError::FileNotFound { .. })));
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(FileCollector::new(".").with_pattern("[").is_err());
    }
}
