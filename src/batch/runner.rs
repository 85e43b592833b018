//! # 批量执行器
//!
//! 在 rayon 线程池中并行处理文件，显示进度并汇总成功/跳过/失败。
//!
//! ## 依赖关系
//! - 被 `commands/feff.rs`, `commands/fdmnes.rs` 调用
//! - 使用 `utils/progress.rs` 创建进度条
//! - 使用 `rayon` 进行并行计算

use crate::error::{Cif4xasError, Result};
use crate::utils::progress;

use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// 单个文件处理结果
#[derive(Debug, Clone)]
pub enum ProcessResult {
    /// 写出的文件路径
    Success(String),
    /// 输出已存在
    Skipped(String),
    /// (输入文件, 错误信息)
    Failed(String, String),
}

#[derive(Debug, Default)]
pub struct BatchResult {
    pub success: usize,
    pub skipped: usize,
    pub failed: usize,
    /// 写出的文件
    pub written: Vec<String>,
    /// 因输出已存在而跳过的文件
    pub kept: Vec<String>,
    pub failures: Vec<(String, String)>,
}

impl BatchResult {
    pub fn merge(&mut self, result: ProcessResult) {
        match result {
            ProcessResult::Success(path) => {
                self.success += 1;
                self.written.push(path);
            }
            ProcessResult::Skipped(path) => {
                self.skipped += 1;
                self.kept.push(path);
            }
            ProcessResult::Failed(path, err) => {
                self.failed += 1;
                self.failures.push((path, err));
            }
        }
    }

    pub fn total(&self) -> usize {
        self.success + self.skipped + self.failed
    }
}

pub struct BatchRunner {
    jobs: usize,
    quiet: bool,
}

impl BatchRunner {
    /// `jobs == 0` 时使用全部 CPU
    pub fn new(jobs: usize) -> Self {
        let jobs = if jobs == 0 { num_cpus::get() } else { jobs };
        Self { jobs, quiet: false }
    }

    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn run<F>(&self, files: &[PathBuf], message: &str, processor: F) -> Result<BatchResult>
    where
        F: Fn(&Path) -> ProcessResult + Sync + Send,
    {
        let pb = progress::create_progress_bar(files.len() as u64, message, self.quiet);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .build()
            .map_err(|e| Cif4xasError::Other(format!("Failed to build thread pool: {}", e)))?;

        let results: Vec<ProcessResult> = pool.install(|| {
            files
                .par_iter()
                .map(|file| {
                    let result = processor(file.as_path());
                    match &result {
                        ProcessResult::Success(out) => tracing::debug!("wrote {}", out),
                        ProcessResult::Skipped(out) => {
                            tracing::info!("{} exists, skipped", out)
                        }
                        ProcessResult::Failed(path, err) => {
                            pb.suspend(|| tracing::warn!("{}: {}", path, err))
                        }
                    }
                    pb.inc(1);
                    result
                })
                .collect()
        });

        pb.finish_and_clear();

        let mut batch_result = BatchResult::default();
        for result in results {
            batch_result.merge(result);
        }
        Ok(batch_result)
    }
}

/// 每个文件的随机种子：基础种子与文件名的 FNV-1a 哈希异或
///
/// 与线程调度无关，同一目录重复运行得到相同输出
pub fn file_seed(base: Option<u64>, path: &Path) -> Option<u64> {
    let base = base?;
    let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in name.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    Some(base ^ hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_collects_results() {
        let files: Vec<PathBuf> = ["a.cif", "b.cif", "c.xyz"].iter().map(PathBuf::from).collect();
        let result = BatchRunner::new(2)
            .quiet(true)
            .run(&files, "test", |path| {
                let name = path.display().to_string();
                match path.extension().and_then(|e| e.to_str()) {
                    Some("xyz") => ProcessResult::Failed(name, "bad frame".to_string()),
                    _ if name.starts_with('a') => ProcessResult::Skipped(name),
                    _ => ProcessResult::Success(name),
                }
            })
            .unwrap();
        assert_eq!(result.total(), 3);
        assert_eq!(result.success, 1);
        assert_eq!(result.skipped, 1);
        assert_eq!(result.failed, 1);
        assert_eq!(result.failures[0].0, "c.xyz");
        assert_eq!(result.written, vec!["b.cif".to_string()]);
        assert_eq!(result.kept, vec!["a.cif".to_string()]);
    }

    #[test]
    fn test_file_seed() {
        assert_eq!(file_seed(None, Path::new("a.cif")), None);
        let a = file_seed(Some(7), Path::new("dir/a.cif"));
        assert_eq!(a, file_seed(Some(7), Path::new("other/a.cif")));
        assert_ne!(a, file_seed(Some(7), Path::new("b.cif")));
    }
}
