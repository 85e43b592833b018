//! # 元素周期表与 X 射线吸收边数据
//!
//! 提供元素符号 / 原子序数互查、Pauling 电负性，以及 K、L1、L2、L3 吸收边能量表。
//! M 边没有能量表。
//!
//! ## 数据来源
//! - K 边：X-ray Data Booklet (Z = 3..98)
//! - L1 边：X-ray Data Booklet (Z = 21..58)
//! - L2、L3 边：X-ray Data Booklet (Z = 11..98)
//! - 电负性：Pauling 标度
//!
//! ## 依赖关系
//! - 被 `parsers/`, `xas/` 使用
//! - 纯静态数据，无外部依赖

use crate::error::{Cif4xasError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// 元素符号 (Z = 1..118)
pub const ATOM_SYMS: [&str; 118] = [
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg", "Al", "Si", "P", "S", "Cl",
    "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge", "As",
    "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In",
    "Sn", "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd", "Tb",
    "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg", "Tl",
    "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk",
    "Cf", "Es", "Fm", "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds", "Rg", "Cn", "Nh",
    "Fl", "Mc", "Lv", "Ts", "Og",
];

/// 元素名称 (Z = 1..118)
pub const ATOM_NAMES: [&str; 118] = [
    "hydrogen", "helium", "lithium", "beryllium", "boron", "carbon", "nitrogen", "oxygen",
    "fluorine", "neon", "sodium", "magnesium", "aluminum", "silicon", "phosphorus", "sulfur",
    "chlorine", "argon", "potassium", "calcium", "scandium", "titanium", "vanadium", "chromium",
    "manganese", "iron", "cobalt", "nickel", "copper", "zinc", "gallium", "germanium", "arsenic",
    "selenium", "bromine", "krypton", "rubidium", "strontium", "yttrium", "zirconium", "niobium",
    "molybdenum", "technetium", "ruthenium", "rhodium", "palladium", "silver", "cadmium", "indium",
    "tin", "antimony", "tellurium", "iodine", "xenon", "cesium", "barium", "lanthanum", "cerium",
    "praseodymium", "neodymium", "promethium", "samarium", "europium", "gadolinium", "terbium",
    "dysprosium", "holmium", "erbium", "thulium", "ytterbium", "lutetium", "hafnium", "tantalum",
    "tungsten", "rhenium", "osmium", "iridium", "platinum", "gold", "mercury", "thallium", "lead",
    "bismuth", "polonium", "astatine", "radon", "francium", "radium", "actinium", "thorium",
    "protactinium", "uranium", "neptunium", "plutonium", "americium", "curium", "berkelium",
    "californium", "einsteinium", "fermium", "mendelevium", "nobelium", "lawrencium",
    "rutherfordium", "dubnium", "seaborgium", "bohrium", "hassium", "meitnerium", "darmstadtium",
    "roentgenium", "copernicium", "nihonium", "flerovium", "moscovium", "livermorium", "tennessine",
    "oganesson",
];

/// Pauling 电负性 (Z = 1..118)，未定义为 NaN
const ELECTRONEGATIVITY: [f64; 118] = [
    2.20, f64::NAN, 0.98, 1.57, 2.04, 2.55, 3.04, 3.44, 3.98, f64::NAN, // H..Ne
    0.93, 1.31, 1.61, 1.90, 2.19, 2.58, 3.16, f64::NAN, // Na..Ar
    0.82, 1.00, 1.36, 1.54, 1.63, 1.66, 1.55, 1.83, 1.88, 1.91, 1.90, 1.65, 1.81, 2.01, 2.18,
    2.55, 2.96, 3.00, // K..Kr
    0.82, 0.95, 1.22, 1.33, 1.60, 2.16, 1.90, 2.20, 2.28, 2.20, 1.93, 1.69, 1.78, 1.96, 2.05,
    2.10, 2.66, 2.60, // Rb..Xe
    0.79, 0.89, 1.10, 1.12, 1.13, 1.14, 1.13, 1.17, 1.20, 1.20, 1.10, 1.22, 1.23, 1.24, 1.25,
    1.10, 1.27, 1.30, 1.50, 2.36, 1.90, 2.20, 2.20, 2.28, 2.54, 2.00, 1.62, 2.33, 2.02, 2.00,
    2.20, 2.20, // Cs..Rn
    0.70, 0.90, 1.10, 1.30, 1.50, 1.38, 1.36, 1.28, 1.30, 1.30, 1.30, 1.30, 1.30, 1.30, 1.30,
    1.30, 1.30, // Fr..Lr
    f64::NAN, f64::NAN, f64::NAN, f64::NAN, f64::NAN, f64::NAN, f64::NAN, f64::NAN, f64::NAN,
    f64::NAN, f64::NAN, f64::NAN, f64::NAN, f64::NAN, f64::NAN, // Rf..Og
];

/// K 边能量 (eV)，Z = 3..98
const K_EDGES: [f64; 96] = [
    54.7, 111.5, 188.0, 284.2, 409.9, 543.1, 696.7, 870.2, 1070.8, 1303.0, 1559.6, 1839.0, 2145.5,
    2472.0, 2822.4, 3205.9, 3608.4, 4038.5, 4492.0, 4966.0, 5465.0, 5989.0, 6539.0, 7112.0,
    7709.0, 8333.0, 8979.0, 9659.0, 10367.0, 11103.0, 11867.0, 12658.0, 13474.0, 14326.0,
    15200.0, 16105.0, 17038.0, 17998.0, 18986.0, 20000.0, 21044.0, 22117.0, 23220.0, 24350.0,
    25514.0, 26711.0, 27940.0, 29200.0, 30491.0, 31814.0, 33169.0, 34561.0, 35985.0, 37441.0,
    38925.0, 40443.0, 41991.0, 43569.0, 45184.0, 46834.0, 48519.0, 50239.0, 51996.0, 53789.0,
    55618.0, 57486.0, 59390.0, 61332.0, 63314.0, 65351.0, 67416.0, 69525.0, 71676.0, 73871.0,
    76111.0, 78395.0, 80725.0, 83102.0, 85530.0, 88005.0, 90526.0, 93105.0, 95730.0, 98404.0,
    101137.0, 103922.0, 106755.0, 109651.0, 112601.0, 115606.0, 118669.0, 121791.0, 124982.0,
    128241.0, 131575.0, 134987.0,
];

/// L1 边能量 (eV)，Z = 21..58
const L1_EDGES: [f64; 38] = [
    498.0, 563.0, 628.0, 695.0, 769.0, 846.0, 926.0, 1008.0, 1096.0, 1193.0, 1297.0, 1414.0,
    1527.0, 1652.0, 1782.0, 1921.0, 2065.0, 2216.0, 2373.0, 2532.0, 2698.0, 2866.0, 3043.0,
    3224.0, 3412.0, 3604.0, 3806.0, 4018.0, 4238.0, 4465.0, 4698.0, 4939.0, 5188.0, 5453.0,
    5714.0, 5989.0, 6266.0, 6548.0,
];

/// L2 边能量 (eV)，下标 0 对应 Z = 11
const L2_EDGES: [f64; 88] = [
    30.7, 49.8, 72.95, 99.82, 136.0, 163.6, 202.0, 250.6, 297.3, 349.7, 403.6, 460.2, 519.8,
    583.8, 649.9, 719.9, 793.2, 870.0, 952.3, 1044.9, 1143.2, 1248.1, 1359.1, 1474.3, 1596.0,
    1730.9, 1864.0, 2007.0, 2156.0, 2307.0, 2465.0, 2625.0, 2793.0, 2967.0, 3146.0, 3330.0,
    3524.0, 3727.0, 3938.0, 4156.0, 4380.0, 4612.0, 4852.0, 5107.0, 5359.0, 5624.0, 5891.0,
    6164.0, 6440.0, 6722.0, 7013.0, 7312.0, 7617.0, 7930.0, 8252.0, 8581.0, 8918.0, 9264.0,
    9617.0, 9978.0, 10349.0, 10739.0, 11136.0, 11544.0, 11959.0, 12385.0, 12824.0, 13273.0,
    13734.0, 14209.0, 14698.0, 15200.0, 15711.0, 16244.0, 16785.0, 17337.0, 17907.0, 18484.0,
    19083.0, 19693.0, 20314.0, 20948.0, 21600.0, 22266.0, 22952.0, 23651.0, 24371.0, 25108.0,
];

/// L3 边能量 (eV)，Z = 11..98
const L3_EDGES: [f64; 88] = [
    30.7, 49.5, 72.7, 99.4, 135.0, 162.5, 200.0, 248.4, 294.6, 346.2, 398.7, 453.8, 512.1, 574.1,
    638.7, 706.8, 778.1, 852.7, 932.7, 1021.8, 1116.4, 1217.0, 1323.6, 1433.9, 1550.0, 1678.4,
    1804.0, 1940.0, 2080.0, 2223.0, 2371.0, 2520.0, 2677.0, 2838.0, 3004.0, 3173.0, 3351.0,
    3538.0, 3730.0, 3929.0, 4132.0, 4341.0, 4557.0, 4786.0, 5012.0, 5247.0, 5483.0, 5723.0,
    5964.0, 6208.0, 6459.0, 6716.0, 6977.0, 7243.0, 7514.0, 7790.0, 8071.0, 8358.0, 8648.0,
    8944.0, 9244.0, 9561.0, 9881.0, 10207.0, 10535.0, 10871.0, 11215.0, 11564.0, 11919.0,
    12284.0, 12658.0, 13035.0, 13419.0, 13814.0, 14214.0, 14619.0, 15031.0, 15444.0, 15871.0,
    16300.0, 16733.0, 17166.0, 17610.0, 18057.0, 18510.0, 18970.0, 19435.0, 19907.0,
];

/// 将任意大小写的元素符号规范化为首字母大写形式 ("FE" -> "Fe")
pub fn normalize_symbol(symbol: &str) -> String {
    let mut chars = symbol.trim().chars();
    match chars.next() {
        Some(first) => {
            let mut s = first.to_ascii_uppercase().to_string();
            s.push_str(&chars.as_str().to_ascii_lowercase());
            s
        }
        None => String::new(),
    }
}

/// 元素符号 -> 原子序数（大小写不敏感）
pub fn atomic_number(symbol: &str) -> Option<u32> {
    let symbol = normalize_symbol(symbol);
    ATOM_SYMS
        .iter()
        .position(|s| *s == symbol)
        .map(|i| i as u32 + 1)
}

/// 原子序数 -> 元素符号
pub fn atomic_symbol(z: u32) -> Option<&'static str> {
    if z == 0 {
        return None;
    }
    ATOM_SYMS.get(z as usize - 1).copied()
}

/// 原子序数 -> 元素名称
pub fn element_name(z: u32) -> Option<&'static str> {
    if z == 0 {
        return None;
    }
    ATOM_NAMES.get(z as usize - 1).copied()
}

/// 解析吸收原子：接受元素符号 ("Fe") 或原子序数 ("26")
pub fn resolve_absorber(input: &str) -> Result<String> {
    let input = input.trim();
    if let Ok(z) = input.parse::<u32>() {
        return atomic_symbol(z)
            .map(|s| s.to_string())
            .ok_or_else(|| Cif4xasError::UnknownElement(input.to_string()));
    }
    let symbol = normalize_symbol(input);
    if atomic_number(&symbol).is_some() {
        Ok(symbol)
    } else {
        Err(Cif4xasError::UnknownElement(input.to_string()))
    }
}

/// 从原子类型符号或标签推断元素
///
/// `Fe3+` -> Fe, `O1` -> O, `OH` -> O, `D` -> H, `Wat` -> O
pub fn element_from_label(token: &str) -> Option<String> {
    let letters: String = token
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();
    if letters.is_empty() {
        return None;
    }
    if letters.to_lowercase().starts_with("wat") {
        return Some("O".to_string());
    }
    if letters.len() >= 2 {
        let two = normalize_symbol(&letters[..2]);
        if atomic_number(&two).is_some() {
            return Some(two);
        }
    }
    let one = normalize_symbol(&letters[..1]);
    if one == "D" {
        return Some("H".to_string());
    }
    atomic_number(&one).map(|_| one)
}

/// X 射线吸收边
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Edge {
    K,
    L1,
    L2,
    L3,
    M1,
    M2,
    M3,
    M4,
    M5,
}

impl Edge {
    /// 默认吸收边：Z < 58 (Ce) 取 K 边，否则取 L3 边
    pub fn default_for(z: u32) -> Self {
        if z < 58 {
            Edge::K
        } else {
            Edge::L3
        }
    }

    /// Feff6 仅支持 K, L1, L2, L3
    pub fn supported_by_feff6(&self) -> bool {
        matches!(self, Edge::K | Edge::L1 | Edge::L2 | Edge::L3)
    }

    /// FEFF 的 HOLE 编号 (K=1, L1=2, ...)
    pub fn hole_code(&self) -> u32 {
        match self {
            Edge::K => 1,
            Edge::L1 => 2,
            Edge::L2 => 3,
            Edge::L3 => 4,
            Edge::M1 => 5,
            Edge::M2 => 6,
            Edge::M3 => 7,
            Edge::M4 => 8,
            Edge::M5 => 9,
        }
    }

    /// FDMNES 的吸收边写法 (L2/L3 合并为 L23，依此类推)
    pub fn fdmnes_name(&self) -> &'static str {
        match self {
            Edge::K => "K",
            Edge::L1 => "L1",
            Edge::L2 | Edge::L3 => "L23",
            Edge::M1 => "M1",
            Edge::M2 | Edge::M3 => "M23",
            Edge::M4 | Edge::M5 => "M45",
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Edge::K => "K",
            Edge::L1 => "L1",
            Edge::L2 => "L2",
            Edge::L3 => "L3",
            Edge::M1 => "M1",
            Edge::M2 => "M2",
            Edge::M3 => "M3",
            Edge::M4 => "M4",
            Edge::M5 => "M5",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Edge {
    type Err = Cif4xasError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "K" => Ok(Edge::K),
            "L1" => Ok(Edge::L1),
            "L2" => Ok(Edge::L2),
            "L3" | "L" => Ok(Edge::L3),
            "M1" => Ok(Edge::M1),
            "M2" => Ok(Edge::M2),
            "M3" => Ok(Edge::M3),
            "M4" => Ok(Edge::M4),
            "M5" | "M" => Ok(Edge::M5),
            _ => Err(Cif4xasError::InvalidEdge {
                edge: s.to_string(),
                code: "XAS".to_string(),
            }),
        }
    }
}

/// Pauling 电负性，未知元素或未定义时为 None
pub fn electronegativity(symbol: &str) -> Option<f64> {
    let z = atomic_number(symbol)? as usize;
    let x = ELECTRONEGATIVITY[z - 1];
    (!x.is_nan()).then_some(x)
}

/// 按电负性从小到大排序元素符号，无电负性的排在最后，相同时按符号
pub fn electronegativity_order(a: &str, b: &str) -> Ordering {
    let key = |s: &str| electronegativity(s).unwrap_or(f64::INFINITY);
    key(a).total_cmp(&key(b)).then_with(|| a.cmp(b))
}

/// 吸收边能量 (eV)，未收录时返回 None
pub fn edge_energy(z: u32, edge: Edge) -> Option<f64> {
    let z = z as usize;
    match edge {
        Edge::K if (3..=98).contains(&z) => Some(K_EDGES[z - 3]),
        Edge::L1 if (21..=58).contains(&z) => Some(L1_EDGES[z - 21]),
        Edge::L2 if (11..=98).contains(&z) => Some(L2_EDGES[z - 11]),
        Edge::L3 if (11..=98).contains(&z) => Some(L3_EDGES[z - 11]),
        _ => None,
    }
}
