//! # 原子团簇数据模型
//!
//! 以吸收原子为原点的有限原子团簇，是 FEFF / FDMNES 输入的直接来源。
//!
//! ## 依赖关系
//! - 被 `xas/cluster.rs` 创建
//! - 被 `xas/feff.rs`, `xas/fdmnes.rs`, `commands/cluster.rs` 使用

use serde::{Deserialize, Serialize};

/// 团簇中的一个原子
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterAtom {
    /// 元素符号
    pub symbol: String,
    /// 相对吸收原子的笛卡尔坐标 (Å)
    pub position: [f64; 3],
    /// 到吸收原子的距离 (Å)
    pub distance: f64,
    /// 位点标记，如 `Fe_1` 或 `(Mg:0.500, Fe:0.500)_2`
    pub tag: String,
}

/// 以吸收原子为中心的团簇，第一个原子总是吸收原子
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cluster {
    pub absorber: String,
    /// 吸收原子所在的唯一位点编号（从 1 开始）
    pub absorber_site: usize,
    pub radius: f64,
    pub atoms: Vec<ClusterAtom>,
}

impl Cluster {
    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// 吸收原子以外的原子
    pub fn neighbors(&self) -> &[ClusterAtom] {
        self.atoms.get(1..).unwrap_or(&[])
    }

    /// 转换为 XYZ 文本
    pub fn to_xyz_string(&self, comment: &str) -> String {
        let mut result = String::new();
        result.push_str(&format!("{}\n", self.atoms.len()));
        result.push_str(&format!("{}\n", comment));
        for atom in &self.atoms {
            result.push_str(&format!(
                "{:<3} {:14.8} {:14.8} {:14.8}\n",
                atom.symbol, atom.position[0], atom.position[1], atom.position[2]
            ));
        }
        result
    }
}
