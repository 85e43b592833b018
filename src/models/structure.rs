//! # 晶体结构数据模型
//!
//! 定义统一的结构表示：晶格、位点占据 (Species)、位点 (Site)、结构 (Structure)。
//! CIF 与 XYZ 解析器都产出 `Structure`，之后交给 `xas/` 做团簇构建。
//!
//! ## 依赖关系
//! - 被 `parsers/`, `symmetry/`, `xas/` 使用
//! - 使用 `utils/format.rs` 生成位点标签

use crate::elements::electronegativity_order;
use crate::utils::format::fcompact;
use serde::{Deserialize, Serialize};

/// 晶格参数表示
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lattice {
    /// 晶格向量矩阵 (3x3)，行向量表示 a, b, c
    /// [[a1, a2, a3], [b1, b2, b3], [c1, c2, c3]]
    pub matrix: [[f64; 3]; 3],
}

impl Lattice {
    /// 从晶格参数 (a, b, c, alpha, beta, gamma) 创建晶格
    /// 角度单位：度
    pub fn from_parameters(a: f64, b: f64, c: f64, alpha: f64, beta: f64, gamma: f64) -> Self {
        let cos_alpha = alpha.to_radians().cos();
        let cos_beta = beta.to_radians().cos();
        let gamma_rad = gamma.to_radians();
        let cos_gamma = gamma_rad.cos();
        let sin_gamma = gamma_rad.sin();

        let a_vec = [a, 0.0, 0.0];
        let b_vec = [b * cos_gamma, b * sin_gamma, 0.0];

        let c1 = c * cos_beta;
        let c2 = c * (cos_alpha - cos_beta * cos_gamma) / sin_gamma;
        let c3 = (c * c - c1 * c1 - c2 * c2).max(0.0).sqrt();

        Lattice {
            matrix: [a_vec, b_vec, [c1, c2, c3]],
        }
    }

    /// 从晶格向量矩阵创建
    pub fn from_vectors(matrix: [[f64; 3]; 3]) -> Self {
        Lattice { matrix }
    }

    /// 获取晶格参数 (a, b, c, alpha, beta, gamma)
    pub fn parameters(&self) -> (f64, f64, f64, f64, f64, f64) {
        let [a_vec, b_vec, c_vec] = self.matrix;

        let a = norm(&a_vec);
        let b = norm(&b_vec);
        let c = norm(&c_vec);

        let alpha = (dot(&b_vec, &c_vec) / (b * c)).acos().to_degrees();
        let beta = (dot(&a_vec, &c_vec) / (a * c)).acos().to_degrees();
        let gamma = (dot(&a_vec, &b_vec) / (a * b)).acos().to_degrees();

        (a, b, c, alpha, beta, gamma)
    }

    /// 晶格体积（行列式，可能为负）
    pub fn volume(&self) -> f64 {
        let [a, b, c] = self.matrix;
        a[0] * (b[1] * c[2] - b[2] * c[1]) - a[1] * (b[0] * c[2] - b[2] * c[0])
            + a[2] * (b[0] * c[1] - b[1] * c[0])
    }

    /// 分数坐标转笛卡尔坐标
    pub fn frac_to_cart(&self, frac: [f64; 3]) -> [f64; 3] {
        let m = self.matrix;
        [
            frac[0] * m[0][0] + frac[1] * m[1][0] + frac[2] * m[2][0],
            frac[0] * m[0][1] + frac[1] * m[1][1] + frac[2] * m[2][1],
            frac[0] * m[0][2] + frac[1] * m[1][2] + frac[2] * m[2][2],
        ]
    }

    /// 笛卡尔坐标转分数坐标（奇异晶格时原样返回）
    pub fn cart_to_frac(&self, cart: [f64; 3]) -> [f64; 3] {
        let m = self.matrix;
        let det = self.volume();
        if det.abs() < 1e-10 {
            return cart;
        }

        let inv = [
            [
                (m[1][1] * m[2][2] - m[1][2] * m[2][1]) / det,
                (m[0][2] * m[2][1] - m[0][1] * m[2][2]) / det,
                (m[0][1] * m[1][2] - m[0][2] * m[1][1]) / det,
            ],
            [
                (m[1][2] * m[2][0] - m[1][0] * m[2][2]) / det,
                (m[0][0] * m[2][2] - m[0][2] * m[2][0]) / det,
                (m[0][2] * m[1][0] - m[0][0] * m[1][2]) / det,
            ],
            [
                (m[1][0] * m[2][1] - m[1][1] * m[2][0]) / det,
                (m[0][1] * m[2][0] - m[0][0] * m[2][1]) / det,
                (m[0][0] * m[1][1] - m[0][1] * m[1][0]) / det,
            ],
        ];

        // frac = cart · M^-1 (行向量约定)
        [
            cart[0] * inv[0][0] + cart[1] * inv[1][0] + cart[2] * inv[2][0],
            cart[0] * inv[0][1] + cart[1] * inv[1][1] + cart[2] * inv[2][1],
            cart[0] * inv[0][2] + cart[1] * inv[1][2] + cart[2] * inv[2][2],
        ]
    }

    /// 晶面间距 d(100), d(010), d(001)，用于确定周期镜像搜索范围
    pub fn plane_spacings(&self) -> [f64; 3] {
        let [a, b, c] = self.matrix;
        let vol = self.volume().abs();
        [
            vol / norm(&cross(&b, &c)),
            vol / norm(&cross(&c, &a)),
            vol / norm(&cross(&a, &b)),
        ]
    }
}

pub(crate) fn dot(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

pub(crate) fn norm(a: &[f64; 3]) -> f64 {
    dot(a, a).sqrt()
}

fn cross(a: &[f64; 3], b: &[f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

/// 位点占据：有序的 (元素, 占据率) 列表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Species {
    pub occupants: Vec<(String, f64)>,
}

impl Species {
    /// 单一元素、满占据
    pub fn element(symbol: impl Into<String>) -> Self {
        Species {
            occupants: vec![(symbol.into(), 1.0)],
        }
    }

    pub fn new(occupants: Vec<(String, f64)>) -> Self {
        Species { occupants }
    }

    /// 是否为有序位点（单一元素且满占据）
    pub fn is_ordered(&self) -> bool {
        self.occupants.len() == 1 && (self.occupants[0].1 - 1.0).abs() < 1e-6
    }

    pub fn elements(&self) -> impl Iterator<Item = &str> {
        self.occupants.iter().map(|(e, _)| e.as_str())
    }

    pub fn contains(&self, element: &str) -> bool {
        self.occupants.iter().any(|(e, _)| e == element)
    }

    /// 指定元素在本位点的占据率
    pub fn occupancy_of(&self, element: &str) -> Option<f64> {
        self.occupants
            .iter()
            .find(|(e, _)| e == element)
            .map(|(_, occ)| *occ)
    }

    /// 占据率最大的元素
    pub fn majority_element(&self) -> &str {
        self.occupants
            .iter()
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(e, _)| e.as_str())
            .unwrap_or("X")
    }

    /// 位点组成字符串：有序为 "Fe"，无序为 "Mg:0.500, Fe:0.500"（按电负性排序）
    pub fn species_string(&self) -> String {
        if self.is_ordered() {
            return self.occupants[0].0.clone();
        }
        let mut occupants: Vec<&(String, f64)> = self.occupants.iter().collect();
        occupants.sort_by(|a, b| electronegativity_order(&a.0, &b.0));
        occupants
            .iter()
            .map(|(e, occ)| format!("{}:{:.3}", e, occ))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// 结构中的一个位点
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Site {
    pub species: Species,
    /// 分数坐标
    pub frac: [f64; 3],
    /// 笛卡尔坐标 (Å)
    pub cart: [f64; 3],
    /// CIF 原子标签 (如 "Fe1")
    pub label: Option<String>,
}

impl Site {
    pub fn new(species: Species, frac: [f64; 3], lattice: &Lattice) -> Self {
        Site {
            species,
            frac,
            cart: lattice.frac_to_cart(frac),
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn species_string(&self) -> String {
        self.species.species_string()
    }

    /// 位点标签，如 `Fe[0.125,0.125,0.125]`
    pub fn site_label(&self) -> String {
        let coords = self
            .frac
            .iter()
            .map(|x| fcompact(*x))
            .collect::<Vec<_>>()
            .join(",");
        format!("{}[{}]", self.species_string(), coords)
    }
}

/// 结构类型：周期性晶体或孤立分子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StructureKind {
    Crystal,
    Molecule,
}

/// CIF 中与标题相关的元数据
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CifMetadata {
    pub mineral: Option<String>,
    pub database_code: Option<String>,
    pub journal: Option<String>,
    pub volume: Option<String>,
    pub page_first: Option<String>,
    pub page_last: Option<String>,
    pub year: Option<String>,
    pub authors: Vec<String>,
    pub compound: Option<String>,
    pub cell_volume: Option<f64>,
    pub density: Option<f64>,
    pub space_group: Option<String>,
}

/// 结构
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Structure {
    /// 唯一名称，通常为输入文件名
    pub name: String,

    /// 简短标签，通常为去掉扩展名的文件名
    pub label: String,

    pub kind: StructureKind,

    pub lattice: Lattice,

    pub sites: Vec<Site>,

    /// CIF 非对称单元展开得到的轨道编号（与 `sites` 一一对应）
    pub asym_orbits: Option<Vec<usize>>,

    /// CIF 元数据
    pub metadata: Option<CifMetadata>,
}

impl Structure {
    pub fn new(
        name: impl Into<String>,
        kind: StructureKind,
        lattice: Lattice,
        sites: Vec<Site>,
    ) -> Self {
        let name = name.into();
        let label = std::path::Path::new(&name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&name)
            .to_string();
        Structure {
            name,
            label,
            kind,
            lattice,
            sites,
            asym_orbits: None,
            metadata: None,
        }
    }

    /// 结构中所有元素，按首次出现顺序
    pub fn elements(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for site in &self.sites {
            for el in site.species.elements() {
                if !out.iter().any(|e| e == el) {
                    out.push(el.to_string());
                }
            }
        }
        out
    }

    /// 是否所有位点都有序
    pub fn is_ordered(&self) -> bool {
        self.sites.iter().all(|s| s.species.is_ordered())
    }

    /// 约化化学式，元素按电负性排序（`H2O`, `SiO2`）
    pub fn reduced_formula(&self) -> String {
        let mut elements = self.elements();
        elements.sort_by(|a, b| electronegativity_order(a, b));
        let amounts: Vec<f64> = elements
            .iter()
            .map(|el| {
                self.sites
                    .iter()
                    .filter_map(|s| s.species.occupancy_of(el))
                    .sum()
            })
            .collect();

        let all_integer = amounts.iter().all(|a| (a - a.round()).abs() < 1e-4);
        let divisor = if all_integer {
            amounts
                .iter()
                .map(|a| a.round() as u64)
                .fold(0, gcd)
                .max(1) as f64
        } else {
            1.0
        };

        elements
            .iter()
            .zip(amounts.iter())
            .map(|(el, amt)| {
                let n = amt / divisor;
                if (n - 1.0).abs() < 1e-4 {
                    el.clone()
                } else if (n - n.round()).abs() < 1e-4 {
                    format!("{}{}", el, n.round() as u64)
                } else {
                    format!("{}{}", el, fcompact(n))
                }
            })
            .collect::<Vec<_>>()
            .join("")
    }
}

fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lattice_from_parameters_cubic() {
        let lattice = Lattice::from_parameters(5.0, 5.0, 5.0, 90.0, 90.0, 90.0);
        let (a, b, c, alpha, beta, gamma) = lattice.parameters();

        assert!((a - 5.0).abs() < 1e-6);
        assert!((b - 5.0).abs() < 1e-6);
        assert!((c - 5.0).abs() < 1e-6);
        assert!((alpha - 90.0).abs() < 1e-6);
        assert!((beta - 90.0).abs() < 1e-6);
        assert!((gamma - 90.0).abs() < 1e-6);
        assert!((lattice.volume().abs() - 125.0).abs() < 1e-6);
    }

    #[test]
    fn test_lattice_hexagonal() {
        let lattice = Lattice::from_parameters(3.0, 3.0, 5.0, 90.0, 90.0, 120.0);
        let (a, _, c, _, _, gamma) = lattice.parameters();

        assert!((a - 3.0).abs() < 0.01);
        assert!((c - 5.0).abs() < 0.01);
        assert!((gamma - 120.0).abs() < 0.01);
    }

    #[test]
    fn test_frac_cart_conversion() {
        let lattice = Lattice::from_parameters(4.0, 5.0, 6.0, 80.0, 95.0, 110.0);
        let frac = [0.25, 0.5, 0.75];
        let cart = lattice.frac_to_cart(frac);
        let back = lattice.cart_to_frac(cart);
        for i in 0..3 {
            assert!((frac[i] - back[i]).abs() < 1e-10);
        }
    }

    #[test]
    fn test_plane_spacings_cubic() {
        let lattice = Lattice::from_parameters(4.0, 4.0, 4.0, 90.0, 90.0, 90.0);
        for d in lattice.plane_spacings() {
            assert!((d - 4.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_species_string() {
        assert_eq!(Species::element("Fe").species_string(), "Fe");
        let mixed = Species::new(vec![("Fe".to_string(), 0.5), ("Mg".to_string(), 0.5)]);
        assert_eq!(mixed.species_string(), "Mg:0.500, Fe:0.500");
        assert!(!mixed.is_ordered());
        let partial = Species::new(vec![("Fe".to_string(), 0.5)]);
        assert_eq!(partial.species_string(), "Fe:0.500");
    }

    #[test]
    fn test_site_label() {
        let lattice = Lattice::from_parameters(8.0, 8.0, 8.0, 90.0, 90.0, 90.0);
        let site = Site::new(Species::element("Fe"), [0.125, 0.125, 0.125], &lattice);
        assert_eq!(site.site_label(), "Fe[0.125,0.125,0.125]");
        let origin = Site::new(Species::element("O"), [0.0, 0.5, 0.0], &lattice);
        assert_eq!(origin.site_label(), "O[0.0,0.5,0.0]");
    }

    #[test]
    fn test_reduced_formula() {
        let lattice = Lattice::from_parameters(5.0, 5.0, 5.0, 90.0, 90.0, 90.0);
        let mut sites = Vec::new();
        for p in [[0.0, 0.0, 0.0], [0.5, 0.5, 0.0], [0.5, 0.0, 0.5], [0.0, 0.5, 0.5]] {
            sites.push(Site::new(Species::element("Na"), p, &lattice));
        }
        for p in [[0.5, 0.0, 0.0], [0.0, 0.5, 0.0], [0.0, 0.0, 0.5], [0.5, 0.5, 0.5]] {
            sites.push(Site::new(Species::element("Cl"), p, &lattice));
        }
        let s = Structure::new("NaCl.cif", StructureKind::Crystal, lattice, sites);
        assert_eq!(s.reduced_formula(), "NaCl");
        assert_eq!(s.label, "NaCl");
        assert_eq!(s.elements(), vec!["Na".to_string(), "Cl".to_string()]);
    }

    #[test]
    fn test_reduced_formula_electronegativity_order() {
        let lattice = Lattice::from_parameters(5.0, 5.0, 5.0, 90.0, 90.0, 90.0);
        let sites = vec![
            Site::new(Species::element("O"), [0.0, 0.0, 0.0], &lattice),
            Site::new(Species::element("O"), [0.5, 0.5, 0.5], &lattice),
            Site::new(Species::element("Si"), [0.25, 0.25, 0.25], &lattice),
        ];
        let s = Structure::new("quartz.cif", StructureKind::Crystal, lattice, sites);
        assert_eq!(s.reduced_formula(), "SiO2");
        assert_eq!(s.elements(), vec!["O".to_string(), "Si".to_string()]);
    }
}
