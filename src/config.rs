//! # 配置文件
//!
//! 可选的 TOML 配置，为命令行参数提供默认值。命令行显式给出的参数优先。
//!
//! ```toml
//! seed = 42
//! with-h = false
//!
//! [feff]
//! cluster-size = 8.0
//! version = "8"
//! edge = "K"
//! template = "my_feff.tmpl"
//!
//! [fdmnes]
//! radius = 7.0
//! mode = "cluster"
//! ```
//!
//! ## 依赖关系
//! - 被 `main.rs` 和 `commands/` 使用
//! - 使用 `serde` + `toml`

use crate::elements::Edge;
use crate::error::{Cif4xasError, Result};
use crate::xas::fdmnes::DEFAULT_FDMNES_RADIUS;
use crate::xas::feff::DEFAULT_CLUSTER_SIZE;
use crate::xas::{FdmnesMode, FeffVersion};

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialFeffConfig {
    cluster_size: Option<f64>,
    version: Option<FeffVersion>,
    edge: Option<String>,
    template: Option<PathBuf>,
    cif_titles: Option<bool>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialFdmnesConfig {
    radius: Option<f64>,
    edge: Option<String>,
    mode: Option<FdmnesMode>,
    green: Option<bool>,
    quadrupole: Option<bool>,
    scf: Option<bool>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialConfig {
    seed: Option<u64>,
    with_h: Option<bool>,
    jobs: Option<usize>,
    feff: Option<PartialFeffConfig>,
    fdmnes: Option<PartialFdmnesConfig>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeffDefaults {
    pub cluster_size: f64,
    pub version: FeffVersion,
    pub edge: Option<Edge>,
    pub template: Option<PathBuf>,
    pub cif_titles: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FdmnesDefaults {
    pub radius: f64,
    pub edge: Option<Edge>,
    pub mode: FdmnesMode,
    pub green: bool,
    pub quadrupole: bool,
    pub scf: bool,
}

/// 合并后的配置
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub seed: Option<u64>,
    pub with_h: bool,
    pub jobs: usize,
    pub feff: FeffDefaults,
    pub fdmnes: FdmnesDefaults,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            seed: None,
            with_h: false,
            jobs: 0,
            feff: FeffDefaults {
                cluster_size: DEFAULT_CLUSTER_SIZE,
                version: FeffVersion::Feff8,
                edge: None,
                template: None,
                cif_titles: true,
            },
            fdmnes: FdmnesDefaults {
                radius: DEFAULT_FDMNES_RADIUS,
                edge: None,
                mode: FdmnesMode::Cluster,
                green: false,
                quadrupole: false,
                scf: false,
            },
        }
    }
}

impl Config {
    /// 读取配置文件；`path` 为 None 时返回默认配置
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Config::default());
        };
        if !path.exists() {
            return Err(Cif4xasError::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let content = fs::read_to_string(path).map_err(|e| Cif4xasError::FileReadError {
            path: path.display().to_string(),
            source: e,
        })?;
        debug!("Loading config from {}", path.display());
        Self::from_toml(&content, &path.display().to_string())
    }

    pub fn from_toml(content: &str, origin: &str) -> Result<Self> {
        let config_error = |reason: String| Cif4xasError::ConfigError {
            path: origin.to_string(),
            reason,
        };
        let partial: PartialConfig =
            toml::from_str(content).map_err(|e| config_error(e.message().to_string()))?;
        let parse_edge = |edge: Option<String>| -> Result<Option<Edge>> {
            edge.map(|e| e.parse::<Edge>())
                .transpose()
                .map_err(|e| config_error(e.to_string()))
        };

        let mut config = Config::default();
        if let Some(seed) = partial.seed {
            config.seed = Some(seed);
        }
        if let Some(with_h) = partial.with_h {
            config.with_h = with_h;
        }
        if let Some(jobs) = partial.jobs {
            config.jobs = jobs;
        }

        if let Some(feff) = partial.feff {
            if let Some(size) = feff.cluster_size {
                if size <= 0.0 {
                    return Err(config_error(format!(
                        "feff.cluster-size must be positive, got {}",
                        size
                    )));
                }
                config.feff.cluster_size = size;
            }
            if let Some(version) = feff.version {
                config.feff.version = version;
            }
            config.feff.edge = parse_edge(feff.edge)?;
            config.feff.template = feff.template;
            if let Some(cif_titles) = feff.cif_titles {
                config.feff.cif_titles = cif_titles;
            }
        }

        if let Some(fdmnes) = partial.fdmnes {
            if let Some(radius) = fdmnes.radius {
                if radius <= 0.0 {
                    return Err(config_error(format!(
                        "fdmnes.radius must be positive, got {}",
                        radius
                    )));
                }
                config.fdmnes.radius = radius;
            }
            config.fdmnes.edge = parse_edge(fdmnes.edge)?;
            if let Some(mode) = fdmnes.mode {
                config.fdmnes.mode = mode;
            }
            config.fdmnes.green = fdmnes.green.unwrap_or(false);
            config.fdmnes.quadrupole = fdmnes.quadrupole.unwrap_or(false);
            config.fdmnes.scf = fdmnes.scf.unwrap_or(false);
        }

        Ok(config)
    }
}
