//! # 非对称单元展开
//!
//! 将 CIF 非对称单元中的原子按全部对称操作展开为完整晶胞，
//! 去除周期意义上重复的位置，并合并同一位置上的多个占据（无序位点）。
//!
//! CIF 常把 1/3、2/3 写成 `0.333`、`0.667`。展开前先把接近简单分数的
//! 坐标吸附到该分数上，否则特殊位置的像会相差几 mÅ 而不被合并。
//!
//! ## 依赖关系
//! - 被 `parsers/cif.rs` 使用
//! - 使用 `symmetry/symop.rs`, `models/structure.rs`

use super::symop::SymOp;
use crate::models::Species;

/// 默认去重容差（分数坐标周期距离，含等号）
pub const SITE_TOLERANCE: f64 = 5e-3;

/// 坐标吸附到简单分数的容差
pub const SNAP_TOLERANCE: f64 = 1e-3;

/// 特殊位置常见分母
const SNAP_DENOMINATORS: [f64; 6] = [2.0, 3.0, 4.0, 6.0, 8.0, 12.0];

/// 非对称单元中的原子
#[derive(Debug, Clone)]
pub struct AsymAtom {
    pub label: String,
    pub element: String,
    pub occupancy: f64,
    pub frac: [f64; 3],
}

/// 展开后的晶胞位点
#[derive(Debug, Clone)]
pub struct ExpandedSite {
    pub species: Species,
    pub frac: [f64; 3],
    pub label: String,
    /// 所属非对称单元轨道编号（从 0 开始，按首次出现排序）
    pub orbit: usize,
}

/// 坐标归一化到 [0, 1)
pub fn wrap_frac(frac: [f64; 3]) -> [f64; 3] {
    let mut out = [0.0; 3];
    for i in 0..3 {
        let mut v = frac[i] - frac[i].floor();
        // 1 - ε 与 0 视为同一点
        if (1.0 - v).abs() < 1e-8 {
            v = 0.0;
        }
        out[i] = v;
    }
    out
}

/// 把接近 k/d (d = 2, 3, 4, 6, 8, 12) 的分量替换为该分数
pub fn snap_frac(frac: [f64; 3], tol: f64) -> [f64; 3] {
    frac.map(|v| {
        SNAP_DENOMINATORS
            .iter()
            .map(|d| (v * d).round() / d)
            .find(|r| (v - r).abs() <= tol)
            .unwrap_or(v)
    })
}

/// 分数坐标的周期最小距离（各分量取最近镜像后的最大分量）
pub fn periodic_frac_distance(a: [f64; 3], b: [f64; 3]) -> f64 {
    (0..3)
        .map(|i| {
            let d = a[i] - b[i];
            (d - d.round()).abs()
        })
        .fold(0.0, f64::max)
}

/// 展开非对称单元
///
/// 同一非对称原子在不同操作下落到同一位置时只保留一次；
/// 不同非对称原子占据同一位置时合并为一个无序位点，轨道取首个原子的轨道。
pub fn expand_asymmetric_unit(atoms: &[AsymAtom], ops: &[SymOp], tol: f64) -> Vec<ExpandedSite> {
    let identity = [SymOp::identity()];
    let ops = if ops.is_empty() { &identity[..] } else { ops };

    let mut sites: Vec<ExpandedSite> = Vec::new();
    // 非对称原子在合并后的轨道编号
    let mut orbit_of_atom: Vec<usize> = Vec::with_capacity(atoms.len());
    let mut n_orbits = 0;

    for atom in atoms {
        let frac = snap_frac(atom.frac, SNAP_TOLERANCE);
        // 与已有位点重合（共享位点）时，沿用已有轨道
        let base = wrap_frac(frac);
        let shared = sites
            .iter()
            .find(|s| periodic_frac_distance(s.frac, base) <= tol)
            .map(|s| s.orbit);
        let orbit = match shared {
            Some(o) => o,
            None => {
                n_orbits += 1;
                n_orbits - 1
            }
        };
        orbit_of_atom.push(orbit);

        let mut images: Vec<[f64; 3]> = Vec::new();
        for op in ops {
            let p = wrap_frac(op.apply(frac));
            if images.iter().any(|q| periodic_frac_distance(*q, p) <= tol) {
                continue;
            }
            images.push(p);
        }

        for p in images {
            match sites
                .iter_mut()
                .find(|s| periodic_frac_distance(s.frac, p) <= tol)
            {
                Some(existing) => {
                    merge_occupant(&mut existing.species, &atom.element, atom.occupancy);
                }
                None => sites.push(ExpandedSite {
                    species: Species::new(vec![(atom.element.clone(), atom.occupancy)]),
                    frac: p,
                    label: atom.label.clone(),
                    orbit,
                }),
            }
        }
    }

    sites
}

fn merge_occupant(species: &mut Species, element: &str, occupancy: f64) {
    match species.occupants.iter_mut().find(|(e, _)| e == element) {
        Some((_, occ)) => *occ = (*occ + occupancy).min(1.0),
        None => species.occupants.push((element.to_string(), occupancy)),
    }
}
