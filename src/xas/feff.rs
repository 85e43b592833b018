//! # FEFF 输入文件生成
//!
//! 将结构转换为 FEFF6 / FEFF8 输入 (`feff.inp`)：
//! 标题、晶体学位点注释、POTENTIALS 和按距离排序的 ATOMS 列表。
//!
//! ## 依赖关系
//! - 被 `commands/feff.rs` 使用
//! - 使用 `xas/sites.rs`, `xas/cluster.rs`, `xas/titles.rs`, `xas/template.rs`
//! - 使用 `utils/format.rs` 保证纯 ASCII 输出

use super::cluster::build_cluster;
use super::sites::XasStructure;
use super::template::{render, FEFF6_TEMPLATE, FEFF8_TEMPLATE};
use super::titles::cif_extra_titles;
use crate::elements::{atomic_number, edge_energy, resolve_absorber, Edge};
use crate::error::{Cif4xasError, Result};
use crate::models::Structure;
use crate::utils::format::{isotime, strict_ascii};

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// 默认团簇半径 (Å)
pub const DEFAULT_CLUSTER_SIZE: f64 = 8.0;

/// FEFF 8l 的唯一势数量上限（不含吸收原子）
const MAX_FEFF8_POTENTIALS: usize = 10;

/// FEFF 版本
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FeffVersion {
    #[serde(rename = "6")]
    Feff6,
    #[default]
    #[serde(rename = "8")]
    Feff8,
}

impl fmt::Display for FeffVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeffVersion::Feff6 => write!(f, "feff6"),
            FeffVersion::Feff8 => write!(f, "feff8"),
        }
    }
}

/// FEFF 输入参数
#[derive(Debug, Clone)]
pub struct FeffOptions {
    /// 吸收边，None 时按原子序数选择
    pub edge: Option<Edge>,
    pub cluster_size: f64,
    /// 吸收位点（唯一位点编号），None 时取第一个吸收位点
    pub absorber_site: Option<usize>,
    pub extra_titles: Vec<String>,
    pub with_h: bool,
    pub version: FeffVersion,
    pub seed: Option<u64>,
    /// 自定义模板内容
    pub template: Option<String>,
    /// 是否附加 CIF 元数据标题
    pub cif_titles: bool,
}

impl Default for FeffOptions {
    fn default() -> Self {
        FeffOptions {
            edge: None,
            cluster_size: DEFAULT_CLUSTER_SIZE,
            absorber_site: None,
            extra_titles: Vec::new(),
            with_h: false,
            version: FeffVersion::Feff8,
            seed: None,
            template: None,
            cif_titles: true,
        }
    }
}

/// 生成的 FEFF 输入
#[derive(Debug, Clone)]
pub struct FeffInput {
    pub absorber: String,
    pub edge: Edge,
    pub absorber_site: usize,
    pub text: String,
}

/// 结构 -> FEFF 输入文本
///
/// 吸收原子可以是元素符号或原子序数，必须出现在结构中
pub fn cif2feffinp(structure: Structure, absorber: &str, opts: &FeffOptions) -> Result<FeffInput> {
    let symbol = resolve_absorber(absorber)?;
    let elements = structure.elements();
    if !elements.contains(&symbol) {
        return Err(Cif4xasError::AbsorberNotListed {
            absorber: symbol,
            elements: elements.join(", "),
        });
    }

    let xs = XasStructure::new(structure, &symbol)?;
    feff_input(&xs, opts)
}

/// 由已分析的结构生成 FEFF 输入
pub fn feff_input(xs: &XasStructure, opts: &FeffOptions) -> Result<FeffInput> {
    let absorber = xs.absorber.as_str();
    let absorber_z = xs.absorber_z;
    let absorber_site = opts.absorber_site.unwrap_or(xs.absorber_sites[0]);

    let edge = opts.edge.unwrap_or_else(|| Edge::default_for(absorber_z));
    if opts.version == FeffVersion::Feff6 && !edge.supported_by_feff6() {
        return Err(Cif4xasError::InvalidEdge {
            edge: edge.to_string(),
            code: "Feff6".to_string(),
        });
    }
    let edge_comment = match edge_energy(absorber_z, edge) {
        Some(e) => format!("{} {} edge, around {:.0} eV", absorber, edge, e),
        None => format!("{} {} edge", absorber, edge),
    };

    let mut rng = match opts.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let cluster = build_cluster(xs, absorber_site, opts.cluster_size, &mut rng)?;
    if cluster.is_empty() {
        return Err(Cif4xasError::InvalidArgument(format!(
            "empty cluster around {} site {}",
            absorber, absorber_site
        )));
    }

    // 标题
    let mut titles = vec![
        format!("Formula: {}", xs.formula()),
        format!("SpaceGroup: {}", xs.space_group),
    ];
    titles.extend(opts.extra_titles.iter().cloned());
    if opts.cif_titles {
        titles.extend(cif_extra_titles(&xs.structure));
    }

    // 晶体学位点注释
    let mut comments = vec![
        "*".to_string(),
        "* crystallographic sites:".to_string(),
        "*    To change the absorber site, re-run with `--site`".to_string(),
        "*    with the corresponding site index (counting from 1)".to_string(),
        "* site    X       Y       Z     Wyckoff  species".to_string(),
    ];
    for u in &xs.unique_sites {
        let fc = u.site.frac;
        let marker = if u.index == absorber_site { "  <- absorber" } else { "" };
        comments.push(format!(
            "* {:3}   {:.5} {:.5} {:.5}  {:>5}   {} {}",
            u.index,
            fc[0],
            fc[1],
            fc[2],
            u.wyckoff,
            u.site.species_string().trim(),
            marker
        ));
    }
    comments.push("*".to_string());

    // 团簇中实际出现的势，按首次出现编号
    let mut ipot_map: Vec<(String, usize)> = Vec::new();
    let mut at_lines: Vec<(f64, [f64; 3], usize, String, String)> =
        vec![(0.0, [0.0; 3], 0, absorber.to_string(), cluster.atoms[0].tag.clone())];
    for atom in cluster.neighbors() {
        if atom.symbol == "H" && !opts.with_h {
            continue;
        }
        let ipot = match ipot_map.iter().find(|(s, _)| *s == atom.symbol) {
            Some((_, ipot)) => *ipot,
            None => {
                let next = ipot_map.len() + 1;
                ipot_map.push((atom.symbol.clone(), next));
                next
            }
        };
        at_lines.push((
            atom.distance,
            atom.position,
            ipot,
            atom.symbol.clone(),
            atom.tag.clone(),
        ));
    }

    if ipot_map.len() > MAX_FEFF8_POTENTIALS {
        comments.push("*** WARNING: Feff 8l is limited to 11 unique potentials***".to_string());
        comments.push("*** WARNING: This input file may need editing".to_string());
        tracing::warn!(
            "[{}] {} unique potentials, Feff 8l supports at most 11",
            xs.structure.label,
            ipot_map.len() + 1
        );
    }

    let mut potentials = vec![format!("  {:4}  {:>4}   {:>3}", 0, absorber_z, absorber)];
    for (sym, ipot) in &ipot_map {
        let z = atomic_number(sym).unwrap_or(0);
        potentials.push(format!("  {:4}  {:>4}   {:>3}", ipot, z, sym));
    }

    at_lines.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
    let atoms: Vec<String> = at_lines
        .iter()
        .map(|(dist, pos, ipot, sym, tag)| {
            let sym2: String = format!("{} ", sym).chars().take(2).collect();
            let xyzi = format!(
                "  {:+.5}  {:+.5}  {:+.5} {:2}",
                clean_zero(pos[0]),
                clean_zero(pos[1]),
                clean_zero(pos[2]),
                ipot
            )
            .replace(" +", "  ");
            format!("{}  {:>3}  {:.5}  * {}", xyzi, sym2, dist, tag)
        })
        .collect();

    let mut values: HashMap<&str, String> = HashMap::new();
    values.insert("version", env!("CARGO_PKG_VERSION").to_string());
    values.insert("timestamp", isotime());
    values.insert("edge", edge.to_string());
    values.insert("hole", edge.hole_code().to_string());
    values.insert("edge_comment", edge_comment);
    values.insert("radius", format!("{:.2}", opts.cluster_size));
    values.insert(
        "titles",
        titles
            .iter()
            .map(|t| format!("TITLE {}", t))
            .collect::<Vec<_>>()
            .join("\n"),
    );
    values.insert("comments", comments.join("\n"));
    values.insert("potentials", potentials.join("\n"));
    values.insert("atoms", atoms.join("\n"));

    let template = match (&opts.template, opts.version) {
        (Some(t), _) => t.as_str(),
        (None, FeffVersion::Feff8) => FEFF8_TEMPLATE,
        (None, FeffVersion::Feff6) => FEFF6_TEMPLATE,
    };
    let text = strict_ascii(&render(template, &values)?, '_');

    Ok(FeffInput {
        absorber: absorber.to_string(),
        edge,
        absorber_site,
        text,
    })
}

/// 避免输出 `-0.00000`
fn clean_zero(v: f64) -> f64 {
    if v.abs() < 5e-6 {
        0.0
    } else {
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Lattice, Site, Species, StructureKind};
    use crate::xas::fixtures::{disordered_rock_salt, rock_salt, zno_wurtzite};

    fn opts(cluster_size: f64) -> FeffOptions {
        FeffOptions {
            cluster_size,
            seed: Some(7),
            ..Default::default()
        }
    }

    #[test]
    fn test_rock_salt_feff8() {
        let inp = cif2feffinp(rock_salt(), "Na", &opts(3.0)).unwrap();
        assert_eq!(inp.edge, Edge::K);
        let text = inp.text;
        assert!(text.contains(" EDGE      K"));
        assert!(text.contains(" RPATH     3.00"));
        assert!(text.contains("TITLE Formula: NaCl"));
        assert!(text.contains("TITLE SpaceGroup: Fm-3m"));
        assert!(text.contains("Na K edge, around 1071 eV"));
        assert!(text.contains("     0    11    Na"));
        assert!(text.contains("     1    17    Cl"));
        assert!(text.contains("   0.00000   0.00000   0.00000  0   Na  0.00000  * Na_1"));
        assert!(text.contains("   2.82000   0.00000   0.00000  1   Cl  2.82000  * Cl_2"));
        assert!(text.contains("  1   0.00000 0.00000 0.00000     4a   Na   <- absorber"));
        assert!(!text.contains("WARNING"));
        assert!(text.is_ascii());

        let atoms_block = text.split(" ATOMS").nth(1).unwrap();
        let atom_lines = atoms_block.lines().filter(|l| l.contains("* Cl_2")).count();
        assert_eq!(atom_lines, 6);
    }

    #[test]
    fn test_absorber_by_atomic_number_and_site() {
        let inp = cif2feffinp(rock_salt(), "17", &opts(3.0)).unwrap();
        assert_eq!(inp.absorber, "Cl");
        assert_eq!(inp.absorber_site, 2);
        assert!(inp.text.contains("* Cl_2"));
    }

    #[test]
    fn test_absorber_not_listed() {
        let err = cif2feffinp(rock_salt(), "Fe", &opts(3.0)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "atomic symbol Fe not listed in CIF data: (Na, Cl)"
        );
    }

    #[test]
    fn test_feff6_edge_check() {
        let mut o = opts(3.0);
        o.version = FeffVersion::Feff6;
        o.edge = Some(Edge::M5);
        assert!(cif2feffinp(rock_salt(), "Na", &o).is_err());

        o.edge = Some(Edge::L3);
        let inp = cif2feffinp(rock_salt(), "Na", &o).unwrap();
        assert!(inp.text.contains(" HOLE      4   1.0"));
        assert!(inp.text.contains(" RMAX      3.00"));
    }

    #[test]
    fn test_disordered_seed_is_reproducible() {
        let a = cif2feffinp(disordered_rock_salt(), "Fe", &opts(6.0)).unwrap();
        let b = cif2feffinp(disordered_rock_salt(), "Fe", &opts(6.0)).unwrap();
        let strip = |t: &str| t.lines().skip(2).collect::<Vec<_>>().join("\n");
        assert_eq!(strip(&a.text), strip(&b.text));
        assert!(a.text.contains("* (Mg:0.500, Fe:0.500)_1"));
    }

    fn hydrate() -> Structure {
        let lattice = Lattice::from_parameters(6.0, 6.0, 6.0, 90.0, 90.0, 90.0);
        let sites = vec![
            Site::new(Species::element("Cu"), [0.0, 0.0, 0.0], &lattice),
            Site::new(Species::element("O"), [0.3, 0.0, 0.0], &lattice),
            Site::new(Species::element("H"), [0.45, 0.0, 0.0], &lattice),
        ];
        Structure::new("hydrate.cif", StructureKind::Crystal, lattice, sites)
    }

    #[test]
    fn test_hydrogen_filtering() {
        let without = cif2feffinp(hydrate(), "Cu", &opts(4.0)).unwrap();
        assert!(!without.text.contains("   H  "));
        assert!(!without.text.contains("     1     1     H"));

        let mut o = opts(4.0);
        o.with_h = true;
        let with = cif2feffinp(hydrate(), "Cu", &o).unwrap();
        assert!(with.text.contains("     1     1     H") || with.text.contains("     2     1     H"));
    }

    #[test]
    fn test_many_potentials_warning() {
        let lattice = Lattice::from_parameters(10.0, 10.0, 10.0, 90.0, 90.0, 90.0);
        let symbols = ["Fe", "O", "Mg", "Si", "Al", "Ca", "Na", "K", "Ti", "Mn", "Cr", "Ni"];
        let sites = symbols
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let f = 0.07 * i as f64;
                Site::new(Species::element(*s), [f, 0.5 * f, 0.25 * f], &lattice)
            })
            .collect();
        let s = Structure::new("many.cif", StructureKind::Crystal, lattice, sites);
        let inp = cif2feffinp(s, "Fe", &opts(6.0)).unwrap();
        assert!(inp.text.contains("*** WARNING: Feff 8l is limited to 11 unique potentials***"));
        assert!(inp.text.contains("*** WARNING: This input file may need editing"));
    }

    #[test]
    fn test_custom_template() {
        let mut o = opts(3.0);
        o.template = Some("{edge}|{radius}|{unknown}".to_string());
        assert!(matches!(
            cif2feffinp(rock_salt(), "Na", &o),
            Err(Cif4xasError::TemplateError(_))
        ));
        o.template = Some("{edge}|{radius}".to_string());
        assert_eq!(cif2feffinp(rock_salt(), "Na", &o).unwrap().text, "K|3.00");
    }

    fn atom_lines(text: &str) -> Vec<&str> {
        text.split(" ATOMS")
            .nth(1)
            .unwrap()
            .lines()
            .filter(|l| l.contains("  * "))
            .collect()
    }

    #[test]
    fn test_wurtzite_first_shell() {
        let inp = cif2feffinp(zno_wurtzite(), "Zn", &opts(2.5)).unwrap();
        let text = inp.text;
        assert!(text.contains("TITLE Formula: ZnO"));
        assert!(text.contains("TITLE SpaceGroup: P6_3mc"));
        assert!(text.contains("     0    30    Zn"));
        assert!(text.contains("     1     8     O"));
        assert!(!text.contains("     2    30    Zn"));

        let lines = atom_lines(&text);
        assert_eq!(lines.len(), 5);
        assert_eq!(lines.iter().filter(|l| l.contains("* O_2")).count(), 4);
        assert!(lines[1].contains("1.97442"));
        assert!(lines[4].contains("1.98907"));
    }

    #[test]
    fn test_wurtzite_second_shell_potentials() {
        let inp = cif2feffinp(zno_wurtzite(), "Zn", &opts(3.3)).unwrap();
        let text = inp.text;
        // O 最近，先编号；Zn 邻居随后
        assert!(text.contains("     1     8     O"));
        assert!(text.contains("     2    30    Zn"));

        let lines = atom_lines(&text);
        assert_eq!(lines.len(), 18);
        assert_eq!(lines.iter().filter(|l| l.contains("* Zn_1")).count(), 13);
        assert_eq!(lines.iter().filter(|l| l.contains("* O_2")).count(), 5);
        assert!(lines[11].contains("3.21793"));
        assert!(lines[5].contains("3.20921"));
        assert!(lines[17].contains("3.25000"));
        assert!(text.contains("  1   0.33333 0.66667 0.00000     2b   Zn   <- absorber"));
    }
}
