//! # 对称操作解析
//!
//! 解析 CIF 中 `x,y,z` 形式的对称操作（如 `-x+1/2, y-x, z+0.25`），
//! 表示为整数旋转矩阵 + 分数平移。
//!
//! ## 依赖关系
//! - 被 `symmetry/expand.rs`, `parsers/cif.rs` 使用
//! - 使用 `regex` 切分代数项

use crate::error::{Cif4xasError, Result};

use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// 代数项：可选符号 + 非符号字符串
static TERM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([+-]?)([^+-]+)").expect("valid term regex"));

/// 对称操作 `W·r + w`
#[derive(Debug, Clone, PartialEq)]
pub struct SymOp {
    pub rotation: [[i32; 3]; 3],
    pub translation: [f64; 3],
}

impl SymOp {
    pub fn identity() -> Self {
        SymOp {
            rotation: [[1, 0, 0], [0, 1, 0], [0, 0, 1]],
            translation: [0.0; 3],
        }
    }

    /// 作用于分数坐标
    pub fn apply(&self, frac: [f64; 3]) -> [f64; 3] {
        let mut out = [0.0; 3];
        for (i, row) in self.rotation.iter().enumerate() {
            out[i] = row[0] as f64 * frac[0]
                + row[1] as f64 * frac[1]
                + row[2] as f64 * frac[2]
                + self.translation[i];
        }
        out
    }

    pub fn is_identity(&self) -> bool {
        let id = SymOp::identity();
        self.rotation == id.rotation
            && self
                .translation
                .iter()
                .all(|t| (t - t.round()).abs() < 1e-8)
    }
}

impl FromStr for SymOp {
    type Err = Cif4xasError;

    fn from_str(s: &str) -> Result<Self> {
        let cleaned: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '\'' && *c != '"')
            .collect::<String>()
            .to_lowercase();

        let parts: Vec<&str> = cleaned.split(',').collect();
        if parts.len() != 3 {
            return Err(Cif4xasError::InvalidSymmetryOperation(s.to_string()));
        }

        let mut op = SymOp {
            rotation: [[0; 3]; 3],
            translation: [0.0; 3],
        };

        for (row, expr) in parts.iter().enumerate() {
            if expr.is_empty() {
                return Err(Cif4xasError::InvalidSymmetryOperation(s.to_string()));
            }
            // 所有项拼接后必须完整覆盖原表达式
            let mut consumed = 0;
            for cap in TERM_RE.captures_iter(expr) {
                let whole = cap.get(0).map(|m| m.as_str()).unwrap_or("");
                consumed += whole.len();
                let sign = if &cap[1] == "-" { -1.0 } else { 1.0 };
                let body = &cap[2];
                parse_term(body, sign, row, &mut op)
                    .ok_or_else(|| Cif4xasError::InvalidSymmetryOperation(s.to_string()))?;
            }
            if consumed != expr.len() {
                return Err(Cif4xasError::InvalidSymmetryOperation(s.to_string()));
            }
        }

        Ok(op)
    }
}

/// 解析单个项：`x`, `2y`, `1/2`, `0.25`, `x*1`
fn parse_term(body: &str, sign: f64, row: usize, op: &mut SymOp) -> Option<()> {
    let axis = body.find(['x', 'y', 'z']);
    match axis {
        Some(pos) => {
            let var = body.as_bytes()[pos];
            let col = match var {
                b'x' => 0,
                b'y' => 1,
                _ => 2,
            };
            let coeff_str: String = body
                .chars()
                .filter(|c| !matches!(c, 'x' | 'y' | 'z' | '*'))
                .collect();
            let coeff = if coeff_str.is_empty() {
                1.0
            } else {
                parse_number(&coeff_str)?
            };
            op.rotation[row][col] += (sign * coeff).round() as i32;
        }
        None => {
            op.translation[row] += sign * parse_number(body)?;
        }
    }
    Some(())
}

/// 解析分数或小数
fn parse_number(s: &str) -> Option<f64> {
    match s.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.parse().ok()?;
            let den: f64 = den.parse().ok()?;
            if den == 0.0 {
                None
            } else {
                Some(num / den)
            }
        }
        None => s.parse().ok(),
    }
}

impl fmt::Display for SymOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let axes = ['x', 'y', 'z'];
        let mut comps = Vec::with_capacity(3);
        for (row, t) in self.rotation.iter().zip(self.translation.iter()) {
            let mut s = String::new();
            for (c, axis) in row.iter().zip(axes.iter()) {
                match *c {
                    0 => {}
                    1 => {
                        if !s.is_empty() {
                            s.push('+');
                        }
                        s.push(*axis);
                    }
                    -1 => {
                        s.push('-');
                        s.push(*axis);
                    }
                    n => s.push_str(&format!("{:+}{}", n, axis)),
                }
            }
            if t.abs() > 1e-8 {
                s.push_str(&format!("{:+}", t));
            }
            if s.is_empty() {
                s.push('0');
            }
            comps.push(s);
        }
        write!(f, "{}", comps.join(","))
    }
}
