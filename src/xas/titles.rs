//! # CIF 元数据标题
//!
//! 从 CIF 元数据生成 FEFF 输入文件的附加 TITLE 行。
//!
//! ## 依赖关系
//! - 被 `xas/feff.rs` 使用
//! - 使用 `utils/format.rs`

use crate::models::Structure;
use crate::utils::format::fcompact;

/// 附加标题：矿物名、数据库来源、文献、作者、晶胞参数、体积、密度、化合物
///
/// 非 CIF 结构返回空列表
pub fn cif_extra_titles(structure: &Structure) -> Vec<String> {
    let meta = match &structure.metadata {
        Some(m) => m,
        None => return Vec::new(),
    };

    let mut out = Vec::new();
    if let Some(mineral) = &meta.mineral {
        out.push(format!("Mineral Name: {}", mineral.to_lowercase()));
    }
    if let Some(code) = &meta.database_code {
        let id = code
            .parse::<u64>()
            .map(|n| n.to_string())
            .unwrap_or_else(|_| code.clone());
        out.push(format!("CIF Source: AmMin Crystal Structure DB, id={}", id));
    }

    if let Some(journal) = &meta.journal {
        let field = |v: &Option<String>| v.clone().unwrap_or_default();
        out.push(format!(
            "Publication: {} {} [{}:{}] ({})",
            journal,
            field(&meta.volume),
            field(&meta.page_first),
            field(&meta.page_last),
            field(&meta.year)
        ));
        if !meta.authors.is_empty() {
            out.push(format!("Authors: {}", meta.authors.join(", ")));
        }
    }

    let (a, b, c, alpha, beta, gamma) = structure.lattice.parameters();
    out.push(format!(
        "Cell Parameter lengths (Ang): a={}, b={}, c={}",
        fcompact(a),
        fcompact(b),
        fcompact(c)
    ));
    out.push(format!(
        "Cell Parameter angles  (deg): alpha={}, beta={}, gamma={}",
        fcompact(alpha),
        fcompact(beta),
        fcompact(gamma)
    ));
    let volume = meta
        .cell_volume
        .unwrap_or_else(|| structure.lattice.volume().abs());
    out.push(format!("Cell Volume (Ang^3): {}", fcompact(volume)));
    if let Some(density) = meta.density {
        out.push(format!("Crystal Density (gr/cm^3): {}", fcompact(density)));
    }
    if let Some(compound) = &meta.compound {
        out.push(format!("Compound: {}", compound));
    }
    out
}
