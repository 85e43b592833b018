//! # 团簇构建
//!
//! 以选定吸收位点为中心，收集半径内所有周期镜像原子，生成 `Cluster`。
//! 无序位点的每个镜像按占据率加权随机选择一种元素，随机数发生器可设种子以保证可复现。
//!
//! ## 依赖关系
//! - 被 `xas/feff.rs`, `xas/fdmnes.rs`, `commands/cluster.rs` 使用
//! - 使用 `xas/sites.rs`, `models/cluster.rs`
//! - 使用 `rand` 做加权抽样

use super::sites::XasStructure;
use crate::error::{Cif4xasError, Result};
use crate::models::{Cluster, ClusterAtom, Species, StructureKind};

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

/// 与吸收原子重合的判定距离 (Å)
const SELF_TOLERANCE: f64 = 1e-4;

/// 位点标记：无序位点为 `(species)_N`，有序位点为 `species_N`
pub fn site_tag(species: &Species, unique_index: usize) -> String {
    if species.occupants.len() > 1 {
        format!("({})_{}", species.species_string(), unique_index)
    } else {
        format!("{}_{}", species.species_string(), unique_index)
    }
}

/// 从位点占据中抽取一种元素
fn draw_element<R: Rng + ?Sized>(species: &Species, rng: &mut R) -> String {
    if species.occupants.len() == 1 {
        return species.occupants[0].0.clone();
    }
    let weights: Vec<f64> = species.occupants.iter().map(|(_, occ)| *occ).collect();
    match WeightedIndex::new(&weights) {
        Ok(dist) => species.occupants[dist.sample(rng)].0.clone(),
        Err(_) => species.majority_element().to_string(),
    }
}

/// 构建以 `absorber_site` (唯一位点编号) 为中心、半径 `cluster_size` 的团簇
pub fn build_cluster<R: Rng + ?Sized>(
    xs: &XasStructure,
    absorber_site: usize,
    cluster_size: f64,
    rng: &mut R,
) -> Result<Cluster> {
    let invalid = || Cif4xasError::InvalidAbsorberSite {
        absorber: xs.absorber.clone(),
        valid: xs.absorber_sites.clone(),
    };
    if !xs.absorber_sites.contains(&absorber_site) {
        return Err(invalid());
    }
    let center_site = xs.unique_site(absorber_site).ok_or_else(invalid)?;
    if cluster_size <= 0.0 {
        return Err(Cif4xasError::InvalidArgument(format!(
            "cluster size must be positive, got {}",
            cluster_size
        )));
    }

    let structure = &xs.structure;
    let lattice = &structure.lattice;
    let center = center_site.site.cart;
    let r2 = cluster_size * cluster_size;

    // 周期镜像搜索范围
    let ranges: [i32; 3] = match structure.kind {
        StructureKind::Molecule => [0, 0, 0],
        StructureKind::Crystal => {
            let spacings = lattice.plane_spacings();
            let mut n = [0; 3];
            for k in 0..3 {
                n[k] = if spacings[k] > 1e-8 {
                    (cluster_size / spacings[k]).ceil() as i32 + 1
                } else {
                    0
                };
            }
            n
        }
    };

    let mut neighbors: Vec<ClusterAtom> = Vec::new();
    for (idx, site) in structure.sites.iter().enumerate() {
        let tag = site_tag(&site.species, xs.unique_index_of(idx));
        for i in -ranges[0]..=ranges[0] {
            for j in -ranges[1]..=ranges[1] {
                for k in -ranges[2]..=ranges[2] {
                    let frac = [
                        site.frac[0] + i as f64,
                        site.frac[1] + j as f64,
                        site.frac[2] + k as f64,
                    ];
                    let cart = lattice.frac_to_cart(frac);
                    let rel = [cart[0] - center[0], cart[1] - center[1], cart[2] - center[2]];
                    let d2 = rel[0] * rel[0] + rel[1] * rel[1] + rel[2] * rel[2];
                    if d2 >= r2 || d2 < SELF_TOLERANCE * SELF_TOLERANCE {
                        continue;
                    }
                    neighbors.push(ClusterAtom {
                        symbol: draw_element(&site.species, rng),
                        position: rel,
                        distance: d2.sqrt(),
                        tag: tag.clone(),
                    });
                }
            }
        }
    }

    neighbors.sort_by(|a, b| {
        a.distance
            .partial_cmp(&b.distance)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut atoms = Vec::with_capacity(neighbors.len() + 1);
    atoms.push(ClusterAtom {
        symbol: xs.absorber.clone(),
        position: [0.0; 3],
        distance: 0.0,
        tag: site_tag(&center_site.site.species, absorber_site),
    });
    atoms.extend(neighbors);

    tracing::debug!(
        "[{}] cluster around {} site {}: {} atoms within {:.2} Å",
        structure.label,
        xs.absorber,
        absorber_site,
        atoms.len(),
        cluster_size
    );

    Ok(Cluster {
        absorber: xs.absorber.clone(),
        absorber_site,
        radius: cluster_size,
        atoms,
    })
}
