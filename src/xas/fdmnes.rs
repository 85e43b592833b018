//! # FDMNES 输入文件生成
//!
//! 两种模式：
//! - `Cluster`: 以吸收原子为中心的团簇，写为 `Molecule` 块（笛卡尔坐标，单位盒）
//! - `Crystal`: 整个晶胞，写为 `Crystal` 块（晶胞参数 + 分数坐标），
//!   `Absorber` 列出与吸收位点等价的全部原子
//!
//! ## 依赖关系
//! - 被 `commands/fdmnes.rs` 使用
//! - 使用 `xas/sites.rs`, `xas/cluster.rs`

use super::cluster::build_cluster;
use super::sites::XasStructure;
use crate::elements::{atomic_number, Edge};
use crate::error::{Cif4xasError, Result};
use crate::models::StructureKind;
use crate::utils::format::{isotime, strict_ascii};

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// 默认团簇半径 (Å)
pub const DEFAULT_FDMNES_RADIUS: f64 = 7.0;

/// 结构写法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FdmnesMode {
    #[default]
    Cluster,
    Crystal,
}

#[derive(Debug, Clone)]
pub struct FdmnesOptions {
    pub radius: f64,
    pub edge: Option<Edge>,
    pub absorber_site: Option<usize>,
    pub mode: FdmnesMode,
    pub green: bool,
    pub quadrupole: bool,
    pub scf: bool,
    pub seed: Option<u64>,
}

impl Default for FdmnesOptions {
    fn default() -> Self {
        FdmnesOptions {
            radius: DEFAULT_FDMNES_RADIUS,
            edge: None,
            absorber_site: None,
            mode: FdmnesMode::Cluster,
            green: false,
            quadrupole: false,
            scf: false,
            seed: None,
        }
    }
}

/// FDMNES 输入
#[derive(Debug, Clone)]
pub struct FdmnesInput<'a> {
    pub xs: &'a XasStructure,
    pub opts: FdmnesOptions,
    pub edge: Edge,
    pub absorber_site: usize,
}

impl<'a> FdmnesInput<'a> {
    pub fn new(xs: &'a XasStructure, opts: FdmnesOptions) -> Result<Self> {
        let absorber_site = opts.absorber_site.unwrap_or(xs.absorber_sites[0]);
        if !xs.absorber_sites.contains(&absorber_site) {
            return Err(Cif4xasError::InvalidAbsorberSite {
                absorber: xs.absorber.clone(),
                valid: xs.absorber_sites.clone(),
            });
        }
        if opts.mode == FdmnesMode::Crystal && xs.structure.kind == StructureKind::Molecule {
            return Err(Cif4xasError::InvalidArgument(
                "crystal mode requires a periodic structure (CIF input)".to_string(),
            ));
        }
        let edge = opts.edge.unwrap_or_else(|| Edge::default_for(xs.absorber_z));
        Ok(FdmnesInput {
            xs,
            opts,
            edge,
            absorber_site,
        })
    }

    /// 输出文件名前缀，同时用于 `Filout`
    pub fn output_stem(&self) -> String {
        format!(
            "{}_{}_{}",
            self.xs.structure.label, self.xs.absorber, self.edge
        )
    }

    /// 生成输入文本
    pub fn render(&self) -> Result<String> {
        let xs = self.xs;
        let mut out = String::new();

        out.push_str(&format!(
            "! FDMNES input file generated by cif4xas, version {}\n",
            env!("CARGO_PKG_VERSION")
        ));
        out.push_str(&format!("! {}\n", isotime()));
        out.push_str(&format!(
            "! {} ({}), absorber {} site {}, {} edge\n",
            xs.formula(),
            xs.space_group,
            xs.absorber,
            self.absorber_site,
            self.edge
        ));
        out.push('\n');

        out.push_str(&format!("Filout\n  {}\n\n", self.output_stem()));
        out.push_str("Range\n  -10. 0.5 60.\n\n");
        out.push_str(&format!("Radius\n  {:.2}\n\n", self.opts.radius));
        out.push_str(&format!("Edge\n  {}\n\n", self.edge.fdmnes_name()));

        if self.opts.green {
            out.push_str("Green\n");
        }
        if self.opts.quadrupole {
            out.push_str("Quadrupole\n");
        }
        if self.opts.scf {
            out.push_str("SCF\n");
        }
        if self.opts.green || self.opts.quadrupole || self.opts.scf {
            out.push('\n');
        }

        match self.opts.mode {
            FdmnesMode::Cluster => self.write_molecule(&mut out)?,
            FdmnesMode::Crystal => self.write_crystal(&mut out),
        }

        out.push_str("Convolution\n\nEnd\n");
        Ok(strict_ascii(&out, '_'))
    }

    fn write_molecule(&self, out: &mut String) -> Result<()> {
        let mut rng = match self.opts.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let cluster = build_cluster(self.xs, self.absorber_site, self.opts.radius, &mut rng)?;

        out.push_str("Molecule\n");
        out.push_str("  1.0 1.0 1.0 90.0 90.0 90.0\n");
        for atom in &cluster.atoms {
            let z = atomic_number(&atom.symbol).unwrap_or(0);
            out.push_str(&format!(
                "  {:3} {:12.6} {:12.6} {:12.6}   ! {}\n",
                z, atom.position[0], atom.position[1], atom.position[2], atom.tag
            ));
        }
        out.push_str("\nAbsorber\n  1\n\n");
        Ok(())
    }

    fn write_crystal(&self, out: &mut String) {
        let structure = &self.xs.structure;
        let (a, b, c, alpha, beta, gamma) = structure.lattice.parameters();

        out.push_str("Crystal\n");
        out.push_str(&format!(
            "  {:.6} {:.6} {:.6} {:.4} {:.4} {:.4}\n",
            a, b, c, alpha, beta, gamma
        ));
        for (idx, site) in structure.sites.iter().enumerate() {
            let element = site.species.majority_element();
            let z = atomic_number(element).unwrap_or(0);
            out.push_str(&format!(
                "  {:3} {:10.6} {:10.6} {:10.6}   ! {}\n",
                z,
                site.frac[0],
                site.frac[1],
                site.frac[2],
                self.xs.site_labels[idx]
            ));
        }

        let members = self
            .xs
            .unique_site(self.absorber_site)
            .map(|u| u.members.clone())
            .unwrap_or_default();
        let indices: Vec<String> = members.iter().map(|i| (i + 1).to_string()).collect();
        out.push_str(&format!("\nAbsorber\n  {}\n\n", indices.join(" ")));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xas::fixtures::{rock_salt, zno_wurtzite};

    #[test]
    fn test_cluster_mode() {
        let xs = XasStructure::new(rock_salt(), "Cl").unwrap();
        let opts = FdmnesOptions {
            radius: 3.0,
            seed: Some(1),
            green: true,
            ..Default::default()
        };
        let input = FdmnesInput::new(&xs, opts).unwrap();
        assert_eq!(input.output_stem(), "NaCl_Cl_K");
        let text = input.render().unwrap();
        assert!(text.contains("Filout\n  NaCl_Cl_K\n"));
        assert!(text.contains("Radius\n  3.00\n"));
        assert!(text.contains("Edge\n  K\n"));
        assert!(text.contains("Green\n"));
        assert!(!text.contains("Quadrupole"));
        assert!(text.contains("Molecule\n  1.0 1.0 1.0 90.0 90.0 90.0\n"));
        assert!(text.contains("\nAbsorber\n  1\n"));
        let na_lines = text.lines().filter(|l| l.trim_start().starts_with("11 ")).count();
        assert_eq!(na_lines, 6);
        assert!(text.ends_with("End\n"));
    }

    #[test]
    fn test_crystal_mode() {
        let xs = XasStructure::new(rock_salt(), "Cl").unwrap();
        let opts = FdmnesOptions {
            mode: FdmnesMode::Crystal,
            edge: Some(Edge::L3),
            ..Default::default()
        };
        let text = FdmnesInput::new(&xs, opts).unwrap().render().unwrap();
        assert!(text.contains("Crystal\n  5.640000 5.640000 5.640000 90.0000 90.0000 90.0000\n"));
        assert!(text.contains("Edge\n  L23\n"));
        assert!(text.contains("\nAbsorber\n  5 6 7 8\n"));
        let atom_lines = text.lines().filter(|l| l.contains("! Na[") || l.contains("! Cl[")).count();
        assert_eq!(atom_lines, 8);
    }

    #[test]
    fn test_invalid_site() {
        let xs = XasStructure::new(rock_salt(), "Na").unwrap();
        let opts = FdmnesOptions {
            absorber_site: Some(2),
            ..Default::default()
        };
        assert!(FdmnesInput::new(&xs, opts).is_err());
    }

    #[test]
    fn test_section_layout() {
        let xs = XasStructure::new(rock_salt(), "Cl").unwrap();
        let opts = FdmnesOptions {
            radius: 3.0,
            seed: Some(1),
            ..Default::default()
        };
        let text = FdmnesInput::new(&xs, opts).unwrap().render().unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("! FDMNES input file generated by cif4xas, version "));
        assert_eq!(lines[2], "! NaCl (Fm-3m), absorber Cl site 2, K edge");
        assert_eq!(lines[3], "");
        assert!(text.contains("Filout\n  NaCl_Cl_K\n\nRange\n  -10. 0.5 60.\n\nRadius\n  3.00\n\n"));
        assert!(text.contains("Edge\n  K\n\nMolecule\n"));
        assert!(text.ends_with("\nAbsorber\n  1\n\nConvolution\n\nEnd\n"));
    }

    #[test]
    fn test_hexagonal_crystal_cell() {
        let xs = XasStructure::new(zno_wurtzite(), "Zn").unwrap();
        let opts = FdmnesOptions {
            mode: FdmnesMode::Crystal,
            ..Default::default()
        };
        let text = FdmnesInput::new(&xs, opts).unwrap().render().unwrap();
        assert!(text.contains("Crystal\n  3.250000 3.250000 5.207000 90.0000 90.0000 120.0000\n"));
        assert!(text.contains("\nAbsorber\n  1 2\n"));
        assert_eq!(text.lines().filter(|l| l.contains("   ! ")).count(), 4);
    }
}
