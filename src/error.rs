//! # 统一错误处理模块
//!
//! 定义 cif4xas 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// cif4xas 统一错误类型
#[derive(Error, Debug)]
pub enum Cif4xasError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 解析错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to parse {format} file: {path}\nReason: {reason}")]
    ParseError {
        format: String,
        path: String,
        reason: String,
    },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Unknown element symbol: '{0}'")]
    UnknownElement(String),

    #[error("Invalid symmetry operation: '{0}'")]
    InvalidSymmetryOperation(String),

    // ─────────────────────────────────────────────────────────────
    // 吸收原子 / 团簇错误
    // ─────────────────────────────────────────────────────────────
    #[error("Absorber {absorber} not found in structure {structure}")]
    AbsorberNotFound { absorber: String, structure: String },

    #[error("atomic symbol {absorber} not listed in CIF data: ({elements})")]
    AbsorberNotListed { absorber: String, elements: String },

    #[error("invalid site for absorber {absorber}: must be in {valid:?}")]
    InvalidAbsorberSite { absorber: String, valid: Vec<usize> },

    #[error("Invalid edge '{edge}' for {code}")]
    InvalidEdge { edge: String, code: String },

    #[error("Symmetry analysis failed: {0}")]
    SymmetryError(String),

    // ─────────────────────────────────────────────────────────────
    // 模板 / 配置错误
    // ─────────────────────────────────────────────────────────────
    #[error("Template placeholder '{{{0}}}' has no value")]
    TemplateError(String),

    #[error("Invalid config file {path}: {reason}")]
    ConfigError { path: String, reason: String },

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ─────────────────────────────────────────────────────────────
    // CSV 错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, Cif4xasError>;
