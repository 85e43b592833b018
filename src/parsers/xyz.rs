//! # XYZ 格式解析器
//!
//! 解析 (多帧) XYZ 坐标文件，每一帧生成一个分子结构。
//!
//! ## XYZ 格式说明
//! ```text
//! 3
//! water
//! O   0.000   0.000   0.117
//! H   0.000   0.757  -0.467
//! H   0.000  -0.757  -0.467
//! ```
//!
//! 分子放在包围盒晶格中（每轴至少 1 Å），坐标平移到非负分数坐标；
//! 近邻搜索对分子不做周期展开。
//!
//! ## 依赖关系
//! - 被 `parsers/mod.rs` 使用
//! - 使用 `models/structure.rs`, `elements.rs`

use crate::elements::{atomic_symbol, element_from_label};
use crate::error::{Cif4xasError, Result};
use crate::models::{Lattice, Site, Species, Structure, StructureKind};
use std::fs;
use std::path::Path;

/// 包围盒每轴最小长度 (Å)
const MIN_BOX_LENGTH: f64 = 1.0;

/// 一帧原始数据
#[derive(Debug, Clone)]
pub struct XyzFrame {
    pub comment: String,
    pub atoms: Vec<(String, [f64; 3])>,
}

/// 解析 XYZ 文件的第 `frame` 帧
pub fn parse_xyz_file(path: &Path, frame: usize) -> Result<Structure> {
    let content = fs::read_to_string(path).map_err(|e| Cif4xasError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown.xyz");
    parse_xyz_content(&content, name, frame)
}

/// 从字符串内容解析 XYZ
pub fn parse_xyz_content(content: &str, name: &str, frame: usize) -> Result<Structure> {
    let frames = parse_frames(content, name)?;
    let n_frames = frames.len();
    let selected = frames
        .into_iter()
        .nth(frame)
        .ok_or_else(|| Cif4xasError::ParseError {
            format: "XYZ".to_string(),
            path: name.to_string(),
            reason: format!("frame {} out of range ({} frames in file)", frame, n_frames),
        })?;

    Ok(frame_to_structure(&selected, name))
}

/// 读取全部帧
pub fn parse_frames(content: &str, name: &str) -> Result<Vec<XyzFrame>> {
    let parse_err = |line: usize, reason: String| Cif4xasError::ParseError {
        format: "XYZ".to_string(),
        path: name.to_string(),
        reason: format!("line {}: {}", line + 1, reason),
    };

    let lines: Vec<&str> = content.lines().collect();
    let mut frames = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let count_line = lines[i].trim();
        if count_line.is_empty() {
            i += 1;
            continue;
        }

        let count: usize = count_line
            .parse()
            .map_err(|_| parse_err(i, format!("expected atom count, found '{}'", count_line)))?;
        if i + 2 + count > lines.len() {
            return Err(parse_err(i, format!("expected {} atoms, file too short", count)));
        }

        let comment = lines.get(i + 1).map(|s| s.trim()).unwrap_or("").to_string();
        let mut atoms = Vec::with_capacity(count);
        for (offset, line) in lines[i + 2..i + 2 + count].iter().enumerate() {
            let lineno = i + 2 + offset;
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 4 {
                return Err(parse_err(lineno, "expected 'symbol x y z'".to_string()));
            }
            let symbol = symbol_from_token(parts[0])
                .ok_or_else(|| Cif4xasError::UnknownElement(parts[0].to_string()))?;
            let mut pos = [0.0; 3];
            for k in 0..3 {
                pos[k] = parts[k + 1]
                    .parse()
                    .map_err(|_| parse_err(lineno, format!("invalid coordinate '{}'", parts[k + 1])))?;
            }
            atoms.push((symbol, pos));
        }

        frames.push(XyzFrame { comment, atoms });
        i += 2 + count;
    }

    if frames.is_empty() {
        return Err(Cif4xasError::ParseError {
            format: "XYZ".to_string(),
            path: name.to_string(),
            reason: "no frames found".to_string(),
        });
    }

    Ok(frames)
}

/// 元素符号或原子序数
fn symbol_from_token(token: &str) -> Option<String> {
    match token.parse::<u32>() {
        Ok(z) => atomic_symbol(z).map(|s| s.to_string()),
        Err(_) => element_from_label(token),
    }
}

fn frame_to_structure(frame: &XyzFrame, name: &str) -> Structure {
    let mut min = [f64::INFINITY; 3];
    let mut max = [f64::NEG_INFINITY; 3];
    for (_, pos) in &frame.atoms {
        for k in 0..3 {
            min[k] = min[k].min(pos[k]);
            max[k] = max[k].max(pos[k]);
        }
    }

    let mut lengths = [MIN_BOX_LENGTH; 3];
    for k in 0..3 {
        if min[k].is_finite() {
            lengths[k] = (max[k] - min[k]).max(MIN_BOX_LENGTH);
        } else {
            min[k] = 0.0;
        }
    }

    let lattice = Lattice::from_vectors([
        [lengths[0], 0.0, 0.0],
        [0.0, lengths[1], 0.0],
        [0.0, 0.0, lengths[2]],
    ]);

    let sites = frame
        .atoms
        .iter()
        .map(|(symbol, pos)| {
            let frac = lattice.cart_to_frac([pos[0] - min[0], pos[1] - min[1], pos[2] - min[2]]);
            Site::new(Species::element(symbol.clone()), frac, &lattice)
        })
        .collect();

    if frame.comment.is_empty() {
        tracing::debug!("[{}] molecule with {} atoms", name, frame.atoms.len());
    } else {
        tracing::debug!(
            "[{}] molecule with {} atoms ({})",
            name,
            frame.atoms.len(),
            frame.comment
        );
    }
    Structure::new(name, StructureKind::Molecule, lattice, sites)
}
