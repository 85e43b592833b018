//! # 带吸收原子的结构
//!
//! `XasStructure` 把结构、吸收元素与对称性分析结果放在一起，
//! 提供唯一位点 (等价类)、吸收位点和位点标签映射。
//! CIF 晶体和 XYZ 分子共用同一套接口，差异只体现在对称性分析。
//!
//! ## 依赖关系
//! - 被 `xas/cluster.rs`, `xas/feff.rs`, `xas/fdmnes.rs`, `commands/` 使用
//! - 使用 `symmetry/analysis.rs`, `elements.rs`

use crate::elements::{atomic_number, resolve_absorber};
use crate::error::{Cif4xasError, Result};
use crate::models::{Site, Structure};
use crate::symmetry::{analyze, DEFAULT_SYMPREC};

use serde::Serialize;
use std::collections::HashMap;
use tabled::{Table, Tabled};

/// 一个唯一 (非等价) 位点
#[derive(Debug, Clone)]
pub struct UniqueSite {
    /// 从 1 开始的唯一位点编号
    pub index: usize,
    /// 代表位点
    pub site: Site,
    /// 代表位点在结构中的下标
    pub struct_index: usize,
    /// 吸收元素在该位点的占据率
    pub occupancy: f64,
    pub multiplicity: usize,
    pub wyckoff: String,
    /// 所有等价位点在结构中的下标
    pub members: Vec<usize>,
}

/// 位点表格行
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct SiteRow {
    #[tabled(rename = "Idx")]
    pub idx: String,
    #[tabled(rename = "Label")]
    pub label: String,
    #[tabled(rename = "Frac Coords")]
    pub frac_coords: String,
    #[tabled(rename = "Idx in Struct")]
    pub idx_in_struct: usize,
    #[tabled(rename = "Occupancy")]
    pub occupancy: String,
    #[tabled(rename = "Cart Coords (Å)")]
    pub cart_coords: String,
    #[tabled(rename = "Wyckoff")]
    pub wyckoff: String,
    #[tabled(rename = "Mult")]
    pub multiplicity: usize,
}

#[derive(Debug, Clone)]
pub struct XasStructure {
    pub structure: Structure,
    pub absorber: String,
    pub absorber_z: u32,
    /// 当前吸收位点 (唯一位点编号，从 1 开始)
    pub absorber_site: usize,
    pub space_group: String,
    /// 空间群编号，分子或对称性回退且 CIF 未声明时为 None
    pub space_group_number: Option<i32>,
    pub unique_sites: Vec<UniqueSite>,
    /// 含吸收元素的唯一位点编号
    pub absorber_sites: Vec<usize>,
    /// 元素 -> 含该元素的唯一位点编号
    pub atom_sites: HashMap<String, Vec<usize>>,
    /// 每个结构位点的标签
    pub site_labels: Vec<String>,
    /// 位点标签 -> 唯一位点编号
    pub unique_map: HashMap<String, usize>,
}

impl XasStructure {
    /// 对结构做对称性分析并设置吸收原子（元素符号或原子序数）
    pub fn new(structure: Structure, absorber: &str) -> Result<Self> {
        let dataset = analyze(&structure, DEFAULT_SYMPREC)?;

        let mut unique_sites = Vec::new();
        let mut unique_map = HashMap::new();
        let mut atom_sites: HashMap<String, Vec<usize>> = HashMap::new();
        let site_labels: Vec<String> = structure.sites.iter().map(|s| s.site_label()).collect();

        for (i, members) in dataset.equivalent_groups().into_iter().enumerate() {
            let index = i + 1;
            let rep = members[0];
            let site = structure.sites[rep].clone();
            for &m in &members {
                unique_map.insert(site_labels[m].clone(), index);
            }
            for el in site.species.elements() {
                atom_sites.entry(el.to_string()).or_default().push(index);
            }
            unique_sites.push(UniqueSite {
                index,
                site,
                struct_index: rep,
                occupancy: 1.0,
                multiplicity: members.len(),
                wyckoff: dataset.wyckoffs[rep].clone(),
                members,
            });
        }

        let mut xs = XasStructure {
            structure,
            absorber: String::new(),
            absorber_z: 0,
            absorber_site: 1,
            space_group: dataset.international,
            space_group_number: dataset.number,
            unique_sites,
            absorber_sites: Vec::new(),
            atom_sites,
            site_labels,
            unique_map,
        };
        xs.set_absorber(absorber)?;
        Ok(xs)
    }

    /// 设置吸收元素，重新计算吸收位点；默认吸收位点为第一个含该元素的唯一位点
    pub fn set_absorber(&mut self, absorber: &str) -> Result<()> {
        let symbol = resolve_absorber(absorber)?;
        let absorber_sites = self.atom_sites.get(&symbol).cloned().unwrap_or_default();

        if absorber_sites.is_empty() {
            return Err(Cif4xasError::AbsorberNotFound {
                absorber: symbol,
                structure: self.structure.name.clone(),
            });
        }

        self.absorber_z = atomic_number(&symbol).unwrap_or(0);
        self.absorber = symbol;
        for u in &mut self.unique_sites {
            u.occupancy = get_occupancy(&self.absorber, &u.site.species_string());
            if absorber_sites.contains(&u.index) && u.occupancy < 1.0 {
                tracing::info!(
                    "[{}] absorber {} has occupancy of {} on site {}",
                    self.structure.label,
                    self.absorber,
                    u.occupancy,
                    u.struct_index
                );
            }
        }
        self.absorber_site = absorber_sites[0];
        self.absorber_sites = absorber_sites;
        Ok(())
    }

    /// 选择吸收位点（唯一位点编号，从 1 开始）
    pub fn select_absorber_site(&mut self, site: usize) -> Result<()> {
        if !self.absorber_sites.contains(&site) {
            return Err(Cif4xasError::InvalidAbsorberSite {
                absorber: self.absorber.clone(),
                valid: self.absorber_sites.clone(),
            });
        }
        self.absorber_site = site;
        Ok(())
    }

    pub fn formula(&self) -> String {
        self.structure.reduced_formula()
    }

    pub fn unique_site(&self, index: usize) -> Option<&UniqueSite> {
        index
            .checked_sub(1)
            .and_then(|i| self.unique_sites.get(i))
    }

    /// 结构位点下标 -> 唯一位点编号
    pub fn unique_index_of(&self, struct_index: usize) -> usize {
        self.site_labels
            .get(struct_index)
            .and_then(|label| self.unique_map.get(label))
            .copied()
            .unwrap_or(0)
    }

    /// 吸收位点在结构中的下标
    pub fn absorber_site_indices(&self) -> Vec<usize> {
        self.absorber_sites
            .iter()
            .filter_map(|i| self.unique_site(*i))
            .map(|u| u.struct_index)
            .collect()
    }

    /// 所有元素，按首次出现顺序
    pub fn elements(&self) -> Vec<String> {
        self.structure.elements()
    }

    pub fn site_rows(&self) -> Vec<SiteRow> {
        let fmt3 = |v: [f64; 3]| format!("[{:.5}, {:.5}, {:.5}]", v[0], v[1], v[2]);
        self.unique_sites
            .iter()
            .map(|u| {
                let idx = if u.index == self.absorber_site {
                    format!("{} (abs)", u.index)
                } else {
                    u.index.to_string()
                };
                SiteRow {
                    idx,
                    label: u
                        .site
                        .label
                        .clone()
                        .unwrap_or_else(|| u.site.species_string()),
                    frac_coords: fmt3(u.site.frac),
                    idx_in_struct: u.struct_index,
                    occupancy: format!("{:.3}", u.occupancy),
                    cart_coords: fmt3(u.site.cart),
                    wyckoff: u.wyckoff.clone(),
                    multiplicity: u.multiplicity,
                }
            })
            .collect()
    }

    /// 唯一位点表格
    pub fn show_sites(&self) -> String {
        Table::new(self.site_rows()).to_string()
    }
}

/// 从位点组成字符串中取吸收元素的占据率，无法解析时为 1.0
///
/// `get_occupancy("Fe", "Mg:0.500, Fe:0.500") == 0.5`
pub fn get_occupancy(absorber: &str, species_string: &str) -> f64 {
    species_string
        .split(',')
        .filter_map(|part| part.split_once(':'))
        .find(|(el, _)| el.trim() == absorber)
        .and_then(|(_, occ)| occ.trim().parse().ok())
        .unwrap_or(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xas::fixtures::{rock_salt, zno_wurtzite};

    #[test]
    fn test_get_occupancy() {
        assert_eq!(get_occupancy("Fe", "Mg:0.500, Fe:0.500"), 0.5);
        assert_eq!(get_occupancy("Mg", "Fe:0.250, Mg:0.750"), 0.75);
        assert_eq!(get_occupancy("Fe", "Fe"), 1.0);
        assert_eq!(get_occupancy("O", "Co:0.500"), 1.0);
    }

    #[test]
    fn test_unique_sites_rock_salt() {
        let xs = XasStructure::new(rock_salt(), "Cl").unwrap();
        assert_eq!(xs.space_group, "Fm-3m");
        assert_eq!(xs.space_group_number, Some(225));
        assert_eq!(xs.unique_sites.len(), 2);
        assert_eq!(xs.absorber_sites, vec![2]);
        assert_eq!(xs.absorber_site, 2);
        assert_eq!(xs.absorber_site_indices(), vec![4]);
        assert_eq!(xs.atom_sites["Na"], vec![1]);
        assert_eq!(xs.unique_sites[1].multiplicity, 4);
        assert_eq!(xs.unique_index_of(6), 2);
        assert_eq!(xs.unique_map["Cl[0.0,0.5,0.0]"], 2);
    }

    #[test]
    fn test_set_absorber_by_atomic_number() {
        let mut xs = XasStructure::new(rock_salt(), "Cl").unwrap();
        xs.set_absorber("11").unwrap();
        assert_eq!(xs.absorber, "Na");
        assert_eq!(xs.absorber_z, 11);
        assert_eq!(xs.absorber_sites, vec![1]);
    }

    #[test]
    fn test_absorber_not_in_structure() {
        let err = XasStructure::new(rock_salt(), "Fe").unwrap_err();
        assert!(matches!(err, Cif4xasError::AbsorberNotFound { .. }));
    }

    #[test]
    fn test_select_invalid_site() {
        let mut xs = XasStructure::new(rock_salt(), "Na").unwrap();
        let err = xs.select_absorber_site(2).unwrap_err();
        assert_eq!(err.to_string(), "invalid site for absorber Na: must be in [1]");
    }

    #[test]
    fn test_show_sites_marks_absorber() {
        let xs = XasStructure::new(rock_salt(), "Na").unwrap();
        let rows = xs.site_rows();
        assert_eq!(rows[0].idx, "1 (abs)");
        assert_eq!(rows[1].idx, "2");
        assert_eq!(rows[0].wyckoff, "4a");
        assert_eq!(rows[0].multiplicity, 4);
        let table = xs.show_sites();
        assert!(table.contains("(abs)"));
        assert!(table.contains("Cl1"));
    }

    #[test]
    fn test_wurtzite_rounded_coordinates() {
        let xs = XasStructure::new(zno_wurtzite(), "Zn").unwrap();
        assert_eq!(xs.structure.sites.len(), 4);
        assert_eq!(xs.space_group_number, Some(186));
        assert_eq!(xs.space_group, "P6_3mc");
        assert_eq!(xs.unique_sites.len(), 2);
        assert_eq!(xs.formula(), "ZnO");
        let wyckoffs: Vec<&str> = xs.unique_sites.iter().map(|u| u.wyckoff.as_str()).collect();
        assert_eq!(wyckoffs, vec!["2b", "2b"]);
        assert!(xs.unique_sites.iter().all(|u| u.multiplicity == 2));
        assert_eq!(xs.absorber_sites, vec![1]);
        assert_eq!(xs.atom_sites["O"], vec![2]);
    }
}
