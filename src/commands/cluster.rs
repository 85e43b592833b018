//! # cluster 命令实现
//!
//! 以 XYZ 格式写出吸收原子周围的团簇，吸收原子在原点。
//!
//! ## 依赖关系
//! - 使用 `cli/cluster.rs` 定义的参数
//! - 使用 `parsers/`, `xas/cluster.rs`, `utils/output.rs`

use super::OutputTarget;
use crate::cli::cluster::ClusterArgs;
use crate::config::Config;
use crate::error::{Cif4xasError, Result};
use crate::parsers;
use crate::utils::output;
use crate::xas::{build_cluster, XasStructure};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

pub fn execute(args: ClusterArgs, config: &Config) -> Result<()> {
    let radius = args.radius.unwrap_or(config.feff.cluster_size);
    if radius <= 0.0 {
        return Err(Cif4xasError::InvalidArgument(format!(
            "cluster radius must be positive, got {}",
            radius
        )));
    }

    let structure = parsers::parse_structure_file(&args.input, args.frame)?;
    let mut xs = XasStructure::new(structure, &args.absorber)?;
    if let Some(site) = args.site {
        xs.select_absorber_site(site)?;
    }
    let site = xs.absorber_site;

    let mut rng = match args.seed.or(config.seed) {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let cluster = build_cluster(&xs, site, radius, &mut rng)?;
    info!(
        "{} atoms within {:.2} A of {} site {}",
        cluster.len(),
        radius,
        xs.absorber,
        site
    );

    let comment = format!(
        "{} cluster around {} (site {}), radius {:.2} A, {}",
        xs.formula(),
        xs.absorber,
        site,
        radius,
        xs.space_group
    );
    let file_name = format!("{}_{}_cluster.xyz", xs.structure.label, xs.absorber);
    let target = OutputTarget::from_arg(args.output.as_deref());
    if let Some(path) = target.write(&file_name, &cluster.to_xyz_string(&comment))? {
        output::print_written(&args.input.display().to_string(), &path.display().to_string());
    }
    Ok(())
}
