//! # 对称性分析
//!
//! 使用 moyo 识别空间群、Wyckoff 位置和等价位点轨道。
//! 分子结构不做对称性搜索，视为 P1 且每个位点自成一组。
//!
//! ## 依赖关系
//! - 被 `xas/sites.rs` 使用
//! - 使用 `moyo`, `nalgebra`
//! - 使用 `symmetry/spacegroups.rs` 将编号转为符号

use super::spacegroups::international_symbol;
use crate::error::{Cif4xasError, Result};
use crate::models::{Structure, StructureKind};

use moyo::base::{AngleTolerance, Cell, Lattice};
use moyo::data::Setting;
use moyo::MoyoDataset;
use nalgebra::{Matrix3, Vector3};
use std::collections::HashMap;

/// 默认对称性容差 (Å)，可吸收 CIF 中三位小数的坐标舍入
pub const DEFAULT_SYMPREC: f64 = 0.01;

/// 对称性分析结果
#[derive(Debug, Clone)]
pub struct SymmetryDataset {
    /// 空间群编号（分子或回退时可能为 None）
    pub number: Option<i32>,
    /// 国际符号，如 `Fm-3m`
    pub international: String,
    /// 每个位点所属轨道的代表位点下标
    pub orbits: Vec<usize>,
    /// 每个位点的 Wyckoff 符号（多重度 + 字母），如 `4a`
    pub wyckoffs: Vec<String>,
}

impl SymmetryDataset {
    /// 等价位点分组，按代表位点首次出现排序
    pub fn equivalent_groups(&self) -> Vec<Vec<usize>> {
        let mut order: Vec<usize> = Vec::new();
        let mut groups: HashMap<usize, Vec<usize>> = HashMap::new();
        for (i, &rep) in self.orbits.iter().enumerate() {
            groups
                .entry(rep)
                .or_insert_with(|| {
                    order.push(rep);
                    Vec::new()
                })
                .push(i);
        }
        order
            .into_iter()
            .filter_map(|rep| groups.remove(&rep))
            .collect()
    }
}

/// 分析结构对称性
///
/// moyo 失败时回退到 CIF 非对称单元的轨道和声明的空间群
pub fn analyze(structure: &Structure, symprec: f64) -> Result<SymmetryDataset> {
    if structure.sites.is_empty() {
        return Err(Cif4xasError::SymmetryError(format!(
            "structure {} has no sites",
            structure.name
        )));
    }

    match structure.kind {
        StructureKind::Molecule => Ok(molecule_dataset(structure)),
        StructureKind::Crystal => match run_moyo(structure, symprec) {
            Ok(dataset) => Ok(dataset),
            Err(e) => {
                tracing::warn!(
                    "[{}] symmetry search failed ({}), using CIF asymmetric unit",
                    structure.label,
                    e
                );
                Ok(fallback_dataset(structure))
            }
        },
    }
}

fn molecule_dataset(structure: &Structure) -> SymmetryDataset {
    let n = structure.sites.len();
    SymmetryDataset {
        number: Some(1),
        international: "P1".to_string(),
        orbits: (0..n).collect(),
        wyckoffs: vec!["1a".to_string(); n],
    }
}

fn run_moyo(structure: &Structure, symprec: f64) -> Result<SymmetryDataset> {
    let m = structure.lattice.matrix;
    let lattice_mat = Matrix3::new(
        m[0][0], m[0][1], m[0][2],
        m[1][0], m[1][1], m[1][2],
        m[2][0], m[2][1], m[2][2],
    );

    // 组成不同的位点视为不同原子类型
    let mut type_ids: HashMap<String, i32> = HashMap::new();
    let mut positions = Vec::with_capacity(structure.sites.len());
    let mut numbers = Vec::with_capacity(structure.sites.len());
    for site in &structure.sites {
        positions.push(Vector3::new(site.frac[0], site.frac[1], site.frac[2]));
        let next_id = type_ids.len() as i32 + 1;
        let id = *type_ids.entry(site.species_string()).or_insert(next_id);
        numbers.push(id);
    }

    let cell = Cell::new(Lattice::new(lattice_mat), positions, numbers);
    let dataset = MoyoDataset::new(&cell, symprec, AngleTolerance::Default, Setting::Spglib, true)
        .map_err(|e| Cif4xasError::SymmetryError(format!("{:?}", e)))?;

    if dataset.orbits.len() != structure.sites.len() {
        return Err(Cif4xasError::SymmetryError(format!(
            "orbit count {} does not match site count {}",
            dataset.orbits.len(),
            structure.sites.len()
        )));
    }

    let multiplicity = orbit_sizes(&dataset.orbits);
    let wyckoffs = dataset
        .orbits
        .iter()
        .zip(dataset.wyckoffs.iter())
        .map(|(rep, letter)| format!("{}{}", multiplicity[rep], letter))
        .collect();

    let international = international_symbol(dataset.number)
        .map(|s| s.to_string())
        .unwrap_or_else(|| format!("#{}", dataset.number));

    tracing::debug!(
        "[{}] space group {} (#{})",
        structure.label,
        international,
        dataset.number
    );

    Ok(SymmetryDataset {
        number: Some(dataset.number),
        international,
        orbits: dataset.orbits.clone(),
        wyckoffs,
    })
}

fn fallback_dataset(structure: &Structure) -> SymmetryDataset {
    let n = structure.sites.len();
    let orbits: Vec<usize> = match &structure.asym_orbits {
        Some(asym) if asym.len() == n => {
            // 轨道编号 -> 首个位点下标
            let mut first: HashMap<usize, usize> = HashMap::new();
            asym.iter()
                .enumerate()
                .map(|(i, o)| *first.entry(*o).or_insert(i))
                .collect()
        }
        _ => (0..n).collect(),
    };
    let multiplicity = orbit_sizes(&orbits);
    let wyckoffs = orbits
        .iter()
        .map(|rep| format!("{}?", multiplicity[rep]))
        .collect();
    let international = structure
        .metadata
        .as_ref()
        .and_then(|m| m.space_group.clone())
        .unwrap_or_else(|| "P1".to_string());

    SymmetryDataset {
        number: None,
        international,
        orbits,
        wyckoffs,
    }
}

fn orbit_sizes(orbits: &[usize]) -> HashMap<usize, usize> {
    let mut sizes = HashMap::new();
    for rep in orbits {
        *sizes.entry(*rep).or_insert(0) += 1;
    }
    sizes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Lattice, Site, Species};

    fn rock_salt() -> Structure {
        let lattice = Lattice::from_parameters(5.64, 5.64, 5.64, 90.0, 90.0, 90.0);
        let mut sites = Vec::new();
        for p in [[0.0, 0.0, 0.0], [0.0, 0.5, 0.5], [0.5, 0.0, 0.5], [0.5, 0.5, 0.0]] {
            sites.push(Site::new(Species::element("Na"), p, &lattice));
        }
        for p in [[0.5, 0.5, 0.5], [0.5, 0.0, 0.0], [0.0, 0.5, 0.0], [0.0, 0.0, 0.5]] {
            sites.push(Site::new(Species::element("Cl"), p, &lattice));
        }
        Structure::new("NaCl.cif", StructureKind::Crystal, lattice, sites)
    }

    #[test]
    fn test_analyze_rock_salt() {
        let dataset = analyze(&rock_salt(), DEFAULT_SYMPREC).unwrap();
        assert_eq!(dataset.number, Some(225));
        assert_eq!(dataset.international, "Fm-3m");

        let groups = dataset.equivalent_groups();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0], vec![0, 1, 2, 3]);
        assert_eq!(groups[1], vec![4, 5, 6, 7]);
        assert_eq!(dataset.wyckoffs[0], "4a");
        assert_eq!(dataset.wyckoffs[4], "4b");
    }

    #[test]
    fn test_molecule_is_p1() {
        let lattice = Lattice::from_parameters(3.0, 3.0, 3.0, 90.0, 90.0, 90.0);
        let sites = vec![
            Site::new(Species::element("C"), [0.0, 0.0, 0.0], &lattice),
            Site::new(Species::element("O"), [0.4, 0.0, 0.0], &lattice),
        ];
        let s = Structure::new("co.xyz", StructureKind::Molecule, lattice, sites);
        let dataset = analyze(&s, DEFAULT_SYMPREC).unwrap();
        assert_eq!(dataset.international, "P1");
        assert_eq!(dataset.equivalent_groups().len(), 2);
        assert!(dataset.wyckoffs.iter().all(|w| w == "1a"));
    }

    #[test]
    fn test_fallback_uses_asym_orbits() {
        let mut s = rock_salt();
        s.asym_orbits = Some(vec![0, 0, 0, 0, 1, 1, 1, 1]);
        let dataset = fallback_dataset(&s);
        assert_eq!(dataset.equivalent_groups().len(), 2);
        assert_eq!(dataset.wyckoffs[0], "4?");
    }
}
