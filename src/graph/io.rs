//! Graph files: JSON and RON encodings of `{ vertices, edges }`.
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use ron::ser::PrettyConfig;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;

use crate::error::ColoringError;
use crate::graph::adjacency::Graph;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("ron error: {0}")]
    Ron(#[from] ron::Error),
    #[error("ron error: {0}")]
    RonSpanned(#[from] ron::error::SpannedError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// On-disk shape of a graph. Deserializing a [`Graph`] goes through this and
/// re-runs construction checks, so a file cannot smuggle in a self-loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphFile {
    pub vertices: usize,
    pub edges: Vec<(usize, usize)>,
}

impl TryFrom<GraphFile> for Graph {
    type Error = ColoringError;

    fn try_from(file: GraphFile) -> Result<Self, Self::Error> {
        Graph::from_edges(file.vertices, file.edges)
    }
}

impl From<Graph> for GraphFile {
    fn from(graph: Graph) -> Self {
        GraphFile {
            vertices: graph.vertex_count(),
            edges: graph.edges().collect(),
        }
    }
}

pub fn to_json_string<T>(value: &T) -> Result<String, IoError>
where
    T: Serialize,
{
    Ok(serde_json::to_string_pretty(value)?)
}

pub fn from_json_str<T>(s: &str) -> Result<T, IoError>
where
    T: DeserializeOwned,
{
    Ok(serde_json::from_str(s)?)
}

pub fn write_json<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> Result<(), IoError> {
    let mut file = File::create(path)?;
    let content = to_json_string(value)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

pub fn to_ron_string<T>(value: &T) -> Result<String, IoError>
where
    T: Serialize,
{
    let mut pretty = PrettyConfig::default();
    pretty.new_line = "\n".into();
    Ok(ron::ser::to_string_pretty(value, pretty)?)
}

pub fn from_ron_str<T>(s: &str) -> Result<T, IoError>
where
    T: DeserializeOwned,
{
    Ok(ron::from_str(s)?)
}

/// Loads a graph, choosing the encoding from the file extension (`.ron`, else JSON).
pub fn read_graph<P: AsRef<Path>>(path: P) -> Result<Graph, IoError> {
    let path = path.as_ref();
    let mut content = String::new();
    File::open(path)?.read_to_string(&mut content)?;
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("ron") => from_ron_str(&content),
        _ => from_json_str(&content),
    }
}

pub fn write_graph<P: AsRef<Path>>(path: P, graph: &Graph) -> Result<(), IoError> {
    let path = path.as_ref();
    let content = match path.extension().and_then(|ext| ext.to_str()) {
        Some("ron") => to_ron_string(graph)?,
        _ => to_json_string(graph)?,
    };
    File::create(path)?.write_all(content.as_bytes())?;
    Ok(())
}
