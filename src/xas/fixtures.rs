//! 测试用结构

use crate::models::{Lattice, Site, Species, Structure, StructureKind};

const FCC_A: [[f64; 3]; 4] = [[0.0, 0.0, 0.0], [0.0, 0.5, 0.5], [0.5, 0.0, 0.5], [0.5, 0.5, 0.0]];
const FCC_B: [[f64; 3]; 4] = [[0.5, 0.5, 0.5], [0.5, 0.0, 0.0], [0.0, 0.5, 0.0], [0.0, 0.0, 0.5]];

fn rock_salt_with(cation: Species, anion: &str, a: f64, name: &str) -> Structure {
    let lattice = Lattice::from_parameters(a, a, a, 90.0, 90.0, 90.0);
    let mut sites = Vec::new();
    for p in FCC_A {
        sites.push(Site::new(cation.clone(), p, &lattice).with_label("M1"));
    }
    for p in FCC_B {
        sites.push(Site::new(Species::element(anion), p, &lattice).with_label(format!("{}1", anion)));
    }
    Structure::new(name, StructureKind::Crystal, lattice, sites)
}

/// NaCl, a = 5.64 Å
pub fn rock_salt() -> Structure {
    rock_salt_with(Species::element("Na"), "Cl", 5.64, "NaCl.cif")
}

/// (Fe,Mg)O，阳离子位点 50/50 无序
pub fn disordered_rock_salt() -> Structure {
    let cation = Species::new(vec![("Fe".to_string(), 0.5), ("Mg".to_string(), 0.5)]);
    rock_salt_with(cation, "O", 4.25, "FeMgO.cif")
}

/// 纤锌矿 ZnO (P6_3mc)，坐标按常见数据库写法舍入到三位小数
pub const ZNO_WURTZITE_CIF: &str = "\
data_ZnO
_chemical_formula_sum 'Zn O'
_cell_length_a 3.25
_cell_length_b 3.25
_cell_length_c 5.207
_cell_angle_alpha 90
_cell_angle_beta 90
_cell_angle_gamma 120
_symmetry_space_group_name_H-M 'P 63 m c'
loop_
_symmetry_equiv_pos_as_xyz
  'x,y,z'
  '-y,x-y,z'
  '-x+y,-x,z'
  '-x,-y,z+1/2'
  'y,-x+y,z+1/2'
  'x-y,x,z+1/2'
  '-y,-x,z'
  '-x+y,y,z'
  'x,x-y,z'
  'y,x,z+1/2'
  'x-y,-y,z+1/2'
  '-x,-x+y,z+1/2'
loop_
_atom_site_label
_atom_site_fract_x
_atom_site_fract_y
_atom_site_fract_z
Zn1 0.333 0.667 0.000
O1 0.333 0.667 0.382
";

pub fn zno_wurtzite() -> Structure {
    crate::parsers::cif::parse_cif_content(ZNO_WURTZITE_CIF, "ZnO.cif", 0)
        .expect("wurtzite fixture parses")
}
