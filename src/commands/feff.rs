//! # feff 命令实现
//!
//! 单个结构文件写出一个 `feff_<label>_<abs>_<edge>.inp`；
//! 目录输入时并行处理其中所有结构文件。
//!
//! ## 依赖关系
//! - 使用 `cli/feff.rs` 定义的参数, `config.rs` 提供的默认值
//! - 使用 `parsers/`, `xas/feff.rs`, `batch/`

use super::generate_inputs;
use crate::batch::file_seed;
use crate::cli::feff::FeffArgs;
use crate::config::Config;
use crate::elements::{resolve_absorber, Edge};
use crate::error::{Cif4xasError, Result};
use crate::parsers;
use crate::xas::{cif2feffinp, FeffOptions, FeffVersion};

use std::fs;
use std::path::Path;
use tracing::{debug, info};

pub fn execute(args: FeffArgs, config: &Config, quiet: bool) -> Result<()> {
    let opts = build_options(&args, config)?;
    let absorber = resolve_absorber(&args.absorber)?;
    let jobs = args.batch.jobs.unwrap_or(config.jobs);
    let frame = args.frame;

    debug!("FEFF options: {:?}", opts);

    generate_inputs(
        &args.input,
        args.output.as_deref(),
        &args.batch,
        jobs,
        quiet,
        "FEFF",
        |path, batch| {
            let structure = parsers::parse_structure_file(path, frame)?;
            let label = structure.label.clone();
            let mut opts = opts.clone();
            if batch {
                opts.seed = file_seed(opts.seed, path);
            }
            let input = cif2feffinp(structure, &absorber, &opts)?;
            info!(
                "{}: {} {} edge, site {}",
                path.display(),
                input.absorber,
                input.edge,
                input.absorber_site
            );
            Ok((feff_file_name(&label, &input.absorber, input.edge), input.text))
        },
    )
}

pub fn feff_file_name(label: &str, absorber: &str, edge: Edge) -> String {
    format!("feff_{}_{}_{}.inp", label, absorber, edge)
}

/// 命令行参数覆盖配置文件
fn build_options(args: &FeffArgs, config: &Config) -> Result<FeffOptions> {
    let cluster_size = args.radius.unwrap_or(config.feff.cluster_size);
    if cluster_size <= 0.0 {
        return Err(Cif4xasError::InvalidArgument(format!(
            "cluster radius must be positive, got {}",
            cluster_size
        )));
    }

    let template = match args.template.as_ref().or(config.feff.template.as_ref()) {
        Some(path) => Some(read_template(path)?),
        None => None,
    };

    Ok(FeffOptions {
        edge: args.edge.or(config.feff.edge),
        cluster_size,
        absorber_site: args.site,
        extra_titles: args.titles.clone(),
        with_h: args.with_h || config.with_h,
        version: if args.feff6 {
            FeffVersion::Feff6
        } else {
            config.feff.version
        },
        seed: args.seed.or(config.seed),
        template,
        cif_titles: config.feff.cif_titles && !args.no_cif_titles,
    })
}

fn read_template(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(Cif4xasError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    fs::read_to_string(path).map_err(|e| Cif4xasError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use crate::commands::test_data::{NACL_CIF, WATER_XYZ};
    use clap::Parser;
    use tempfile::tempdir;

    fn parse_args(argv: &[&str]) -> FeffArgs {
        let mut full = vec!["cif4xas", "feff"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full).unwrap().command {
            Commands::Feff(args) => args,
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_options_merge_config() {
        let mut config = Config::default();
        config.seed = Some(9);
        config.with_h = true;
        config.feff.cluster_size = 5.0;
        config.feff.version = FeffVersion::Feff6;

        let opts = build_options(&parse_args(&["x.cif", "-a", "Fe"]), &config).unwrap();
        assert_eq!(opts.cluster_size, 5.0);
        assert_eq!(opts.seed, Some(9));
        assert!(opts.with_h);
        assert_eq!(opts.version, FeffVersion::Feff6);

        let opts = build_options(
            &parse_args(&["x.cif", "-a", "Fe", "-r", "6", "--seed", "1", "--no-cif-titles"]),
            &config,
        )
        .unwrap();
        assert_eq!(opts.cluster_size, 6.0);
        assert_eq!(opts.seed, Some(1));
        assert!(!opts.cif_titles);
    }

    #[test]
    fn test_rejects_bad_radius_and_missing_template() {
        let config = Config::default();
        assert!(build_options(&parse_args(&["x.cif", "-a", "Fe", "-r", "0"]), &config).is_err());
        let err = build_options(
            &parse_args(&["x.cif", "-a", "Fe", "--template", "/nonexistent/t.tmpl"]),
            &config,
        )
        .unwrap_err();
        assert!(matches!(err, Cif4xasError::FileNotFound { .. }));
    }

    #[test]
    fn test_single_file_output_name() {
        let dir = tempdir().unwrap();
        let cif = dir.path().join("NaCl.cif");
        fs::write(&cif, NACL_CIF).unwrap();
        let out = dir.path().join("out");
        fs::create_dir(&out).unwrap();

        let args = parse_args(&[
            cif.to_str().unwrap(),
            "-a",
            "Cl",
            "-r",
            "4.0",
            "-o",
            out.to_str().unwrap(),
        ]);
        execute(args, &Config::default(), true).unwrap();

        let text = fs::read_to_string(out.join("feff_NaCl_Cl_K.inp")).unwrap();
        assert!(text.contains(" POTENTIALS"));
        assert!(text.contains(" ATOMS"));
    }

    #[test]
    fn test_batch_directory() {
        let input = tempdir().unwrap();
        fs::write(input.path().join("NaCl.cif"), NACL_CIF).unwrap();
        fs::write(input.path().join("water.xyz"), WATER_XYZ).unwrap();
        let out = tempdir().unwrap();

        let args = parse_args(&[
            input.path().to_str().unwrap(),
            "-a",
            "Cl",
            "--seed",
            "5",
            "-j",
            "1",
            "-o",
            out.path().to_str().unwrap(),
        ]);
        execute(args, &Config::default(), true).unwrap();

        assert!(out.path().join("feff_NaCl_Cl_K.inp").exists());
        assert!(!out.path().join("feff_water_Cl_K.inp").exists());
    }
}
