//! Graph files
//!
//! Versioned JSON envelope holding every node with its id, links and
//! constraints. Loading re-validates the graph.

use crate::errors::{BddError, BddResult};
use crate::features::bdd::domain::{Bdd, Node, NodeArena, NodeId};
use crate::shared::utils::NodeIdGenerator;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::info;

pub const GRAPH_FILE_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct BddFileV1 {
    version: u32,
    /// Next id of the counter
    id: NodeId,
    n_call_paths: usize,
    init: NodeId,
    process: NodeId,
    nodes: Vec<Node>,
}

#[derive(Deserialize)]
struct VersionProbe {
    version: u32,
}

impl Bdd {
    pub fn to_json(&self) -> BddResult<String> {
        Ok(serde_json::to_string_pretty(&self.to_file())?)
    }

    pub fn from_json(content: &str) -> BddResult<Self> {
        let probe: VersionProbe = serde_json::from_str(content)?;
        check_version(probe.version)?;
        Self::from_file(serde_json::from_str(content)?)
    }

    /// Write the graph to `path`
    pub fn serialize(&self, path: impl AsRef<Path>) -> BddResult<()> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, &self.to_file())?;
        writer.flush()?;
        info!("Wrote {} nodes to {}", self.len(), path.display());
        Ok(())
    }

    /// Load a graph written by [`Bdd::serialize`]
    pub fn deserialize(path: impl AsRef<Path>) -> BddResult<Self> {
        let value: serde_json::Value =
            serde_json::from_reader(BufReader::new(File::open(path.as_ref())?))?;
        let version = value
            .get("version")
            .and_then(|v| v.as_u64())
            .ok_or_else(|| BddError::invariant("graph file has no version"))?;
        check_version(u32::try_from(version).unwrap_or(u32::MAX))?;
        Self::from_file(serde_json::from_value(value)?)
    }

    fn to_file(&self) -> BddFileV1 {
        BddFileV1 {
            version: GRAPH_FILE_VERSION,
            id: self.get_id(),
            n_call_paths: self.n_call_paths(),
            init: self.get_init(),
            process: self.get_process(),
            nodes: self.arena().iter().cloned().collect(),
        }
    }

    fn from_file(file: BddFileV1) -> BddResult<Self> {
        let mut arena = NodeArena::new();
        for node in file.nodes {
            arena.insert(node)?;
        }
        Bdd::from_parts(
            arena,
            file.init,
            file.process,
            NodeIdGenerator::starting_at(file.id),
            file.n_call_paths,
        )
    }
}

fn check_version(found: u32) -> BddResult<()> {
    if found != GRAPH_FILE_VERSION {
        return Err(BddError::UnsupportedVersion {
            found,
            expected: GRAPH_FILE_VERSION,
        });
    }
    Ok(())
}
