//! # CIF 格式解析器
//!
//! 解析晶体学信息文件 (Crystallographic Information File)，
//! 按对称操作展开非对称单元，得到完整晶胞。
//!
//! ## CIF 格式说明
//! ```text
//! data_global
//! _chemical_name_mineral 'Hematite'
//! _cell_length_a 5.038(2)
//! ...
//! loop_
//! _space_group_symop_operation_xyz
//!   x,y,z
//!   -y,x-y,z
//! loop_
//! _atom_site_label
//! _atom_site_fract_x
//! _atom_site_fract_y
//! _atom_site_fract_z
//! Fe   0.00000   0.00000   0.35530
//! O    0.30590   0.00000   0.25000
//! ```
//!
//! 多个 `data_` 块中含原子位点的块按出现顺序编号为帧 (frame)。
//!
//! ## 依赖关系
//! - 被 `parsers/mod.rs` 使用
//! - 使用 `symmetry/` 展开非对称单元
//! - 使用 `models/structure.rs`, `elements.rs`

use crate::elements::element_from_label;
use crate::error::{Cif4xasError, Result};
use crate::models::{CifMetadata, Lattice, Site, Structure, StructureKind};
use crate::symmetry::{expand_asymmetric_unit, AsymAtom, SymOp, SITE_TOLERANCE};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// 词法单元
#[derive(Debug, Clone, PartialEq)]
enum Token {
    Data(String),
    Loop,
    Tag(String),
    Value(String),
}

/// `loop_` 表格
#[derive(Debug, Clone, Default)]
pub struct CifLoop {
    /// 小写的标签名
    pub tags: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CifLoop {
    pub fn column(&self, tag: &str) -> Option<usize> {
        let tag = tag.to_lowercase();
        self.tags.iter().position(|t| *t == tag)
    }

    /// 某行某列的值，缺失值 (`?`, `.`) 返回 None
    pub fn get(&self, row: usize, tag: &str) -> Option<&str> {
        let col = self.column(tag)?;
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(|s| s.as_str())
            .filter(|s| !is_missing(s))
    }

    /// 整列的值
    pub fn values(&self, tag: &str) -> Vec<&str> {
        match self.column(tag) {
            Some(col) => self
                .rows
                .iter()
                .filter_map(|r| r.get(col))
                .map(|s| s.as_str())
                .filter(|s| !is_missing(s))
                .collect(),
            None => Vec::new(),
        }
    }
}

/// 一个 `data_` 块
#[derive(Debug, Clone, Default)]
pub struct CifBlock {
    pub name: String,
    items: HashMap<String, String>,
    loops: Vec<CifLoop>,
}

impl CifBlock {
    fn new(name: impl Into<String>) -> Self {
        CifBlock {
            name: name.into(),
            ..Default::default()
        }
    }

    /// 单值条目；若只出现在 loop 中，取第一行
    pub fn get(&self, tag: &str) -> Option<&str> {
        let tag = tag.to_lowercase();
        if let Some(v) = self.items.get(&tag) {
            return Some(v.as_str()).filter(|s| !is_missing(s));
        }
        self.find_loop(&tag).and_then(|l| l.get(0, &tag))
    }

    /// 依次尝试多个等价标签
    pub fn get_any(&self, tags: &[&str]) -> Option<&str> {
        tags.iter().find_map(|t| self.get(t))
    }

    pub fn get_number(&self, tag: &str) -> Option<f64> {
        self.get(tag).and_then(parse_cif_number)
    }

    pub fn find_loop(&self, tag: &str) -> Option<&CifLoop> {
        let tag = tag.to_lowercase();
        self.loops.iter().find(|l| l.tags.contains(&tag))
    }

    /// 单值或 loop 形式的多值条目
    pub fn get_list(&self, tag: &str) -> Vec<&str> {
        match self.find_loop(tag) {
            Some(l) => l.values(tag),
            None => self.get(tag).into_iter().collect(),
        }
    }

    /// 是否包含原子位点
    pub fn has_atom_sites(&self) -> bool {
        self.find_loop("_atom_site_fract_x").is_some()
    }
}

fn is_missing(s: &str) -> bool {
    s == "?" || s == "."
}

/// 解析 CIF 数值，去掉标准不确定度 (`5.4307(2)` -> 5.4307)
pub fn parse_cif_number(s: &str) -> Option<f64> {
    let s = s.trim();
    if is_missing(s) {
        return None;
    }
    let s = match s.find('(') {
        Some(pos) => &s[..pos],
        None => s,
    };
    s.parse().ok()
}

fn tokenize(content: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut lines = content.lines();

    while let Some(line) = lines.next() {
        // 分号文本域：行首 ';' 开始，至下一个行首 ';' 结束
        if let Some(rest) = line.strip_prefix(';') {
            let mut text = rest.to_string();
            for next in lines.by_ref() {
                if next.starts_with(';') {
                    break;
                }
                text.push('\n');
                text.push_str(next);
            }
            tokens.push(Token::Value(text.trim().to_string()));
            continue;
        }
        tokenize_line(line, &mut tokens);
    }

    tokens
}

fn tokenize_line(line: &str, tokens: &mut Vec<Token>) {
    let chars: Vec<char> = line.chars().collect();
    let n = chars.len();
    let mut i = 0;

    while i < n {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }
        if c == '#' {
            break;
        }

        if c == '\'' || c == '"' {
            // 引号只在其后为空白或行尾时才闭合
            let mut j = i + 1;
            while j < n && !(chars[j] == c && (j + 1 == n || chars[j + 1].is_whitespace())) {
                j += 1;
            }
            let value: String = chars[i + 1..j.min(n)].iter().collect();
            tokens.push(Token::Value(value));
            i = j + 1;
            continue;
        }

        let mut j = i;
        while j < n && !chars[j].is_whitespace() {
            j += 1;
        }
        let word: String = chars[i..j].iter().collect();
        i = j;

        let lower = word.to_lowercase();
        if lower.starts_with("data_") {
            tokens.push(Token::Data(word[5..].to_string()));
        } else if lower == "loop_" {
            tokens.push(Token::Loop);
        } else if word.starts_with('_') {
            tokens.push(Token::Tag(lower));
        } else if lower.starts_with("save_") || lower == "global_" || lower == "stop_" {
            continue;
        } else {
            tokens.push(Token::Value(word));
        }
    }
}

fn current_block(blocks: &mut Vec<CifBlock>) -> &mut CifBlock {
    if blocks.is_empty() {
        blocks.push(CifBlock::new(""));
    }
    let last = blocks.len() - 1;
    &mut blocks[last]
}

/// 将 CIF 文本切分为 `data_` 块
pub fn parse_blocks(content: &str) -> Vec<CifBlock> {
    let mut blocks: Vec<CifBlock> = Vec::new();
    let mut iter = tokenize(content).into_iter().peekable();

    while let Some(token) = iter.next() {
        match token {
            Token::Data(name) => blocks.push(CifBlock::new(name)),
            Token::Loop => {
                let mut tags = Vec::new();
                while let Some(Token::Tag(_)) = iter.peek() {
                    if let Some(Token::Tag(t)) = iter.next() {
                        tags.push(t);
                    }
                }
                let mut values = Vec::new();
                while let Some(Token::Value(_)) = iter.peek() {
                    if let Some(Token::Value(v)) = iter.next() {
                        values.push(v);
                    }
                }
                if tags.is_empty() {
                    continue;
                }
                if values.len() % tags.len() != 0 {
                    tracing::warn!(
                        "loop with {} tags has {} values, dropping incomplete row",
                        tags.len(),
                        values.len()
                    );
                }
                let rows = values
                    .chunks(tags.len())
                    .filter(|c| c.len() == tags.len())
                    .map(|c| c.to_vec())
                    .collect();
                current_block(&mut blocks).loops.push(CifLoop { tags, rows });
            }
            Token::Tag(tag) => {
                let value = match iter.peek() {
                    Some(Token::Value(_)) => match iter.next() {
                        Some(Token::Value(v)) => v,
                        _ => "?".to_string(),
                    },
                    _ => "?".to_string(),
                };
                current_block(&mut blocks).items.insert(tag, value);
            }
            Token::Value(v) => {
                tracing::trace!("stray CIF value ignored: {}", v);
            }
        }
    }

    blocks
}

/// 解析 CIF 文件的第 `frame` 个结构
pub fn parse_cif_file(path: &Path, frame: usize) -> Result<Structure> {
    let content = fs::read_to_string(path).map_err(|e| Cif4xasError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown.cif");
    parse_cif_content(&content, name, frame)
}

/// 从字符串内容解析 CIF
pub fn parse_cif_content(content: &str, name: &str, frame: usize) -> Result<Structure> {
    let parse_err = |reason: String| Cif4xasError::ParseError {
        format: "CIF".to_string(),
        path: name.to_string(),
        reason,
    };

    let blocks: Vec<CifBlock> = parse_blocks(content)
        .into_iter()
        .filter(|b| b.has_atom_sites())
        .collect();
    if blocks.is_empty() {
        return Err(parse_err("no atom sites found".to_string()));
    }
    let block = blocks.get(frame).ok_or_else(|| {
        parse_err(format!(
            "frame {} out of range ({} structures in file)",
            frame,
            blocks.len()
        ))
    })?;

    let lattice = parse_lattice(block).map_err(parse_err)?;
    let ops = parse_symops(block)?;
    let atoms = parse_atom_sites(block)?;

    let expanded = expand_asymmetric_unit(&atoms, &ops, SITE_TOLERANCE);
    tracing::debug!(
        "[{}] {} asymmetric atoms, {} operations -> {} sites",
        name,
        atoms.len(),
        ops.len(),
        expanded.len()
    );

    let mut orbits = Vec::with_capacity(expanded.len());
    let sites: Vec<Site> = expanded
        .into_iter()
        .map(|s| {
            orbits.push(s.orbit);
            Site::new(s.species, s.frac, &lattice).with_label(s.label)
        })
        .collect();

    let mut structure = Structure::new(name, StructureKind::Crystal, lattice, sites);
    structure.asym_orbits = Some(orbits);
    structure.metadata = Some(parse_metadata(block));

    if !structure.is_ordered() {
        tracing::warn!(
            "[{}] contains partially occupied sites that are not fully supported yet",
            name
        );
    }

    Ok(structure)
}

fn parse_lattice(block: &CifBlock) -> std::result::Result<Lattice, String> {
    let length = |axis: &str| {
        let tag = format!("_cell_length_{}", axis);
        block
            .get_number(&tag)
            .ok_or_else(|| format!("missing cell parameter {}", tag))
    };
    let angle = |name: &str| block.get_number(&format!("_cell_angle_{}", name)).unwrap_or(90.0);

    let (a, b, c) = (length("a")?, length("b")?, length("c")?);
    if a <= 0.0 || b <= 0.0 || c <= 0.0 {
        return Err(format!("invalid cell lengths {} {} {}", a, b, c));
    }
    Ok(Lattice::from_parameters(
        a,
        b,
        c,
        angle("alpha"),
        angle("beta"),
        angle("gamma"),
    ))
}

fn parse_symops(block: &CifBlock) -> Result<Vec<SymOp>> {
    let mut raw = block.get_list("_symmetry_equiv_pos_as_xyz");
    if raw.is_empty() {
        raw = block.get_list("_space_group_symop_operation_xyz");
    }
    if raw.is_empty() {
        tracing::warn!(
            "[{}] no symmetry operations found, assuming P1",
            block.name
        );
        return Ok(vec![SymOp::identity()]);
    }
    let mut ops: Vec<SymOp> = raw.iter().map(|s| s.parse()).collect::<Result<_>>()?;
    if !ops.iter().any(SymOp::is_identity) {
        tracing::warn!(
            "[{}] symmetry operations lack the identity, adding x,y,z",
            block.name
        );
        ops.insert(0, SymOp::identity());
    }
    Ok(ops)
}

fn parse_atom_sites(block: &CifBlock) -> Result<Vec<AsymAtom>> {
    let table = block
        .find_loop("_atom_site_fract_x")
        .ok_or_else(|| Cif4xasError::ParseError {
            format: "CIF".to_string(),
            path: block.name.clone(),
            reason: "no atom sites found".to_string(),
        })?;

    let mut atoms = Vec::with_capacity(table.rows.len());
    for row in 0..table.rows.len() {
        let label = table
            .get(row, "_atom_site_label")
            .unwrap_or("")
            .to_string();
        let symbol_source = table
            .get(row, "_atom_site_type_symbol")
            .unwrap_or(label.as_str());
        let element = element_from_label(symbol_source)
            .or_else(|| element_from_label(&label))
            .ok_or_else(|| Cif4xasError::UnknownElement(symbol_source.to_string()))?;

        let coord = |axis: &str| -> Result<f64> {
            let tag = format!("_atom_site_fract_{}", axis);
            table
                .get(row, &tag)
                .and_then(parse_cif_number)
                .ok_or_else(|| Cif4xasError::ParseError {
                    format: "CIF".to_string(),
                    path: block.name.clone(),
                    reason: format!("invalid {} for atom site '{}'", tag, label),
                })
        };
        let frac = [coord("x")?, coord("y")?, coord("z")?];
        let occupancy = table
            .get(row, "_atom_site_occupancy")
            .and_then(parse_cif_number)
            .unwrap_or(1.0);

        let label = if label.is_empty() {
            format!("{}{}", element, row + 1)
        } else {
            label
        };
        atoms.push(AsymAtom {
            label,
            element,
            occupancy,
            frac,
        });
    }

    if atoms.is_empty() {
        return Err(Cif4xasError::ParseError {
            format: "CIF".to_string(),
            path: block.name.clone(),
            reason: "atom site loop is empty".to_string(),
        });
    }
    Ok(atoms)
}

fn text_of(block: &CifBlock, tags: &[&str]) -> Option<String> {
    block.get_any(tags).map(|s| s.trim().to_string())
}

fn parse_metadata(block: &CifBlock) -> CifMetadata {
    let text = |tags: &[&str]| text_of(block, tags);
    CifMetadata {
        mineral: text(&["_chemical_name_mineral"]),
        database_code: text(&["_database_code_amcsd"]),
        journal: text(&["_journal_name_full", "_journal_name_abbrev"]),
        volume: text(&["_journal_volume"]),
        page_first: text(&["_journal_page_first"]),
        page_last: text(&["_journal_page_last"]),
        year: text(&["_journal_year"]),
        authors: block
            .get_list("_publ_author_name")
            .iter()
            .map(|s| s.trim().to_string())
            .collect(),
        compound: text(&[
            "_chemical_compound_source",
            "_chemical_name_common",
            "_chemical_name_systematic",
        ]),
        cell_volume: block.get_number("_cell_volume"),
        density: block.get_number("_exptl_crystal_density_diffrn"),
        space_group: text(&[
            "_symmetry_space_group_name_h-m",
            "_space_group_name_h-m_alt",
        ]),
    }
}
