//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑，以及 feff / fdmnes 共用的
//! 单文件 / 目录批量生成流程。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `config.rs`, `parsers/`, `xas/`, `batch/`, `utils/`
//! - 子模块: feff, fdmnes, sites, cluster

pub mod cluster;
pub mod fdmnes;
pub mod feff;
pub mod sites;

use crate::batch::{BatchRunner, FileCollector, ProcessResult};
use crate::cli::{BatchArgs, Commands};
use crate::config::Config;
use crate::error::{Cif4xasError, Result};
use crate::utils::output;

use std::fs;
use std::path::{Path, PathBuf};

pub fn run(cmd: Commands, config: &Config, quiet: bool) -> Result<()> {
    match cmd {
        Commands::Feff(args) => feff::execute(args, config, quiet),
        Commands::Fdmnes(args) => fdmnes::execute(args, config, quiet),
        Commands::Sites(args) => sites::execute(args),
        Commands::Cluster(args) => cluster::execute(args, config),
    }
}

/// 生成文本的去向
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
    Dir(PathBuf),
}

impl OutputTarget {
    /// `-o` 参数：缺省为当前目录，`-` 为标准输出，已有目录则写入其中
    pub fn from_arg(output: Option<&Path>) -> Self {
        match output {
            None => OutputTarget::Dir(PathBuf::from(".")),
            Some(p) if p == Path::new("-") => OutputTarget::Stdout,
            Some(p) if p.is_dir() => OutputTarget::Dir(p.to_path_buf()),
            Some(p) => OutputTarget::File(p.to_path_buf()),
        }
    }

    /// 写出文本，返回写入的路径（标准输出时为 None）
    pub fn write(&self, file_name: &str, text: &str) -> Result<Option<PathBuf>> {
        let path = match self {
            OutputTarget::Stdout => {
                print!("{}", text);
                return Ok(None);
            }
            OutputTarget::File(p) => p.clone(),
            OutputTarget::Dir(d) => d.join(file_name),
        };
        write_text(&path, text)?;
        Ok(Some(path))
    }
}

pub(crate) fn write_text(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Cif4xasError::FileWriteError {
            path: parent.display().to_string(),
            source: e,
        })?;
    }
    fs::write(path, text).map_err(|e| Cif4xasError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })
}

/// 单文件或目录输入的输入文件生成
///
/// `generate(path, batch)` 返回 `(文件名, 文本)`；批量模式下
/// 已存在的输出除非 `--overwrite` 否则跳过
pub(crate) fn generate_inputs<F>(
    input: &Path,
    output: Option<&Path>,
    batch: &BatchArgs,
    jobs: usize,
    quiet: bool,
    kind: &str,
    generate: F,
) -> Result<()>
where
    F: Fn(&Path, bool) -> Result<(String, String)> + Sync + Send,
{
    let target = OutputTarget::from_arg(output);

    if input.is_file() {
        let (file_name, text) = generate(input, false)?;
        if let Some(path) = target.write(&file_name, &text)? {
            output::print_written(&input.display().to_string(), &path.display().to_string());
        }
        return Ok(());
    }

    let out_dir = match target {
        OutputTarget::Stdout => {
            return Err(Cif4xasError::InvalidArgument(
                "a directory input cannot be written to stdout".to_string(),
            ))
        }
        OutputTarget::File(p) | OutputTarget::Dir(p) => p,
    };

    let files = FileCollector::new(input)
        .with_pattern(&batch.pattern)?
        .recursive(batch.recursive)
        .collect()?;
    if files.is_empty() {
        output::print_warning(&format!(
            "No files matched '{}' under {}",
            batch.pattern,
            input.display()
        ));
        return Ok(());
    }

    fs::create_dir_all(&out_dir).map_err(|e| Cif4xasError::FileWriteError {
        path: out_dir.display().to_string(),
        source: e,
    })?;

    output::print_header(&format!("Generating {} inputs", kind));
    output::print_info(&format!("Found {} structure file(s)", files.len()));

    let result = BatchRunner::new(jobs).quiet(quiet).run(&files, kind, |path| {
        let source = path.display().to_string();
        let (file_name, text) = match generate(path, true) {
            Ok(generated) => generated,
            Err(e) => return ProcessResult::Failed(source, e.to_string()),
        };
        let out_path = out_dir.join(&file_name);
        if out_path.exists() && !batch.overwrite {
            return ProcessResult::Skipped(out_path.display().to_string());
        }
        match write_text(&out_path, &text) {
            Ok(()) => ProcessResult::Success(out_path.display().to_string()),
            Err(e) => ProcessResult::Failed(source, e.to_string()),
        }
    })?;

    for (path, err) in &result.failures {
        output::print_error(&format!("{}: {}", path, err));
    }
    if !quiet && !result.kept.is_empty() {
        output::print_info(&format!(
            "{} existing output(s) kept, pass --overwrite to replace them",
            result.kept.len()
        ));
    }
    output::print_done(&format!(
        "Wrote {} {} input(s) to '{}' ({} skipped, {} failed)",
        result.success,
        kind,
        out_dir.display(),
        result.skipped,
        result.failed
    ));

    if result.failed > 0 && result.success + result.skipped == 0 {
        return Err(Cif4xasError::Other(format!(
            "all {} file(s) failed",
            result.total()
        )));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_data {
    /// 只含面心平移的岩盐结构，展开后 8 个位点
    pub const NACL_CIF: &str = "\
data_NaCl
_chemical_name_mineral 'Halite'
_cell_length_a 5.64
_cell_length_b 5.64
_cell_length_c 5.64
_cell_angle_alpha 90
_cell_angle_beta 90
_cell_angle_gamma 90
loop_
_symmetry_equiv_pos_as_xyz
x,y,z
x,y+1/2,z+1/2
x+1/2,y,z+1/2
x+1/2,y+1/2,z
loop_
_atom_site_label
_atom_site_type_symbol
_atom_site_fract_x
_atom_site_fract_y
_atom_site_fract_z
Na1 Na 0.0 0.0 0.0
Cl1 Cl 0.5 0.5 0.5
";

    pub const WATER_XYZ: &str = "\
3
water
O   0.000  0.000  0.000
H   0.757  0.586  0.000
H  -0.757  0.586  0.000
";
}
