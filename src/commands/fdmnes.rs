//! # fdmnes 命令实现
//!
//! 写出 `fdmnes_<label>_<abs>_<edge>.txt`，团簇或晶胞两种写法。
//!
//! ## 依赖关系
//! - 使用 `cli/fdmnes.rs` 定义的参数, `config.rs` 提供的默认值
//! - 使用 `parsers/`, `xas/fdmnes.rs`, `batch/`

use super::generate_inputs;
use crate::batch::file_seed;
use crate::cli::fdmnes::FdmnesArgs;
use crate::config::Config;
use crate::elements::resolve_absorber;
use crate::error::{Cif4xasError, Result};
use crate::parsers;
use crate::xas::{FdmnesInput, FdmnesMode, FdmnesOptions, XasStructure};

use tracing::{debug, info};

pub fn execute(args: FdmnesArgs, config: &Config, quiet: bool) -> Result<()> {
    let opts = build_options(&args, config)?;
    let absorber = resolve_absorber(&args.absorber)?;
    let jobs = args.batch.jobs.unwrap_or(config.jobs);
    let frame = args.frame;

    debug!("FDMNES options: {:?}", opts);

    generate_inputs(
        &args.input,
        args.output.as_deref(),
        &args.batch,
        jobs,
        quiet,
        "FDMNES",
        |path, batch| {
            let structure = parsers::parse_structure_file(path, frame)?;
            let xs = XasStructure::new(structure, &absorber)?;
            let mut opts = opts.clone();
            if batch {
                opts.seed = file_seed(opts.seed, path);
            }
            let input = FdmnesInput::new(&xs, opts)?;
            info!(
                "{}: {} {} edge, site {}, {:?} mode",
                path.display(),
                xs.absorber,
                input.edge,
                input.absorber_site,
                input.opts.mode
            );
            Ok((format!("fdmnes_{}.txt", input.output_stem()), input.render()?))
        },
    )
}

fn build_options(args: &FdmnesArgs, config: &Config) -> Result<FdmnesOptions> {
    let defaults = &config.fdmnes;
    let radius = args.radius.unwrap_or(defaults.radius);
    if radius <= 0.0 {
        return Err(Cif4xasError::InvalidArgument(format!(
            "cluster radius must be positive, got {}",
            radius
        )));
    }
    Ok(FdmnesOptions {
        radius,
        edge: args.edge.or(defaults.edge),
        absorber_site: args.site,
        mode: if args.crystal {
            FdmnesMode::Crystal
        } else {
            defaults.mode
        },
        green: args.green || defaults.green,
        quadrupole: args.quadrupole || defaults.quadrupole,
        scf: args.scf || defaults.scf,
        seed: args.seed.or(config.seed),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use crate::commands::test_data::{NACL_CIF, WATER_XYZ};
    use clap::Parser;
    use std::fs;
    use tempfile::tempdir;

    fn parse_args(argv: &[&str]) -> FdmnesArgs {
        let mut full = vec!["cif4xas", "fdmnes"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full).unwrap().command {
            Commands::Fdmnes(args) => args,
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_options_merge_config() {
        let mut config = Config::default();
        config.fdmnes.mode = FdmnesMode::Crystal;
        config.fdmnes.scf = true;
        let opts = build_options(&parse_args(&["x.cif", "-a", "Fe", "--green"]), &config).unwrap();
        assert_eq!(opts.mode, FdmnesMode::Crystal);
        assert!(opts.green);
        assert!(opts.scf);
        assert_eq!(opts.radius, 7.0);
    }

    #[test]
    fn test_crystal_output_file() {
        let dir = tempdir().unwrap();
        let cif = dir.path().join("NaCl.cif");
        fs::write(&cif, NACL_CIF).unwrap();
        let out = dir.path().join("fd.txt");

        let args = parse_args(&[
            cif.to_str().unwrap(),
            "-a",
            "Na",
            "--crystal",
            "-o",
            out.to_str().unwrap(),
        ]);
        execute(args, &Config::default(), true).unwrap();

        let text = fs::read_to_string(&out).unwrap();
        assert!(text.contains("Crystal\n"));
        assert!(text.contains("\nAbsorber\n  1 2 3 4\n"));
    }

    #[test]
    fn test_crystal_mode_rejects_molecule() {
        let dir = tempdir().unwrap();
        let xyz = dir.path().join("water.xyz");
        fs::write(&xyz, WATER_XYZ).unwrap();
        let args = parse_args(&[
            xyz.to_str().unwrap(),
            "-a",
            "O",
            "--crystal",
            "-o",
            dir.path().to_str().unwrap(),
        ]);
        assert!(execute(args, &Config::default(), true).is_err());
    }

    #[test]
    fn test_molecule_cluster_name() {
        let dir = tempdir().unwrap();
        let xyz = dir.path().join("water.xyz");
        fs::write(&xyz, WATER_XYZ).unwrap();
        let args = parse_args(&[
            xyz.to_str().unwrap(),
            "-a",
            "O",
            "-o",
            dir.path().to_str().unwrap(),
        ]);
        execute(args, &Config::default(), true).unwrap();
        let text = fs::read_to_string(dir.path().join("fdmnes_water_O_K.txt")).unwrap();
        assert!(text.contains("Molecule\n"));
    }
}
