use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::validate::Backend;

/// Parameters of one search run. Every field may be omitted from the TOML file.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RunConfig {
    #[serde(default = "default_vertices")]
    pub vertices: usize,
    #[serde(default = "default_edge_probability")]
    pub edge_probability: f64,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_colors")]
    pub colors: u32,
    #[serde(default = "default_prefix_depth")]
    pub prefix_depth: usize,
    #[serde(default = "default_max_candidates")]
    pub max_candidates: usize,
    /// Row width of the candidate table; `0` means one slot per vertex.
    #[serde(default)]
    pub stride: usize,
    #[serde(default)]
    pub backend: Backend,
    /// Worker threads of the parallel backend; `0` uses rayon's global pool.
    #[serde(default)]
    pub threads: usize,
    #[serde(default = "default_fallback")]
    pub fallback: bool,
    /// Stop at any valid candidate instead of reporting the lowest index.
    #[serde(default)]
    pub any_valid: bool,
    /// Load the graph from this file instead of generating one.
    #[serde(default)]
    pub graph: Option<PathBuf>,
    /// Write the JSON report here.
    #[serde(default)]
    pub output: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            vertices: default_vertices(),
            edge_probability: default_edge_probability(),
            seed: default_seed(),
            colors: default_colors(),
            prefix_depth: default_prefix_depth(),
            max_candidates: default_max_candidates(),
            stride: 0,
            backend: Backend::default(),
            threads: 0,
            fallback: default_fallback(),
            any_valid: false,
            graph: None,
            output: None,
        }
    }
}

impl RunConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: RunConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        Ok(config)
    }

    /// The stride actually used for a graph of `vertices` vertices.
    pub fn effective_stride(&self, vertices: usize) -> usize {
        if self.stride == 0 { vertices } else { self.stride }
    }
}

// Defaults reproduce the reference demo run.
fn default_vertices() -> usize {
    35
}

fn default_edge_probability() -> f64 {
    0.25
}

fn default_seed() -> u64 {
    42
}

fn default_colors() -> u32 {
    4
}

fn default_prefix_depth() -> usize {
    8
}

fn default_max_candidates() -> usize {
    1 << 15
}

fn default_fallback() -> bool {
    true
}
