//! Graph loader (C0): deserializes the `<prefix>.graph` binary file into a
//! `Condensation`. Parsing follows the same manual big-endian,
//! length-prefixed style as the delta wire format, just applied to a
//! different record layout:
//!
//! magic "2DR\x01", numNodes: u32, numComponents: u32,
//! then numNodes node records (cid: u32, isSpatial: u8, x: f32, y: f32),
//! then numComponents component records (indegree: u32, isSpatial: u8,
//! numChildren: u32, childIds: [u32; numChildren]).

use memmap2::Mmap;
use std::fs::File;

use crate::condensation::Condensation;
use crate::types::{Component, ComponentId, Node, Point, ReachError};

const MAGIC: &[u8; 4] = b"2DR\x01";

pub fn load_condensation(prefix: &str) -> Result<Condensation, ReachError> {
    let path = format!("{}.graph", prefix);
    let file = File::open(&path).map_err(|e| ReachError::Io {
        path: path.clone(),
        source: e,
    })?;
    // SAFETY: the file is opened read-only for the duration of this call
    // and not concurrently modified by this single-threaded process.
    let mmap = unsafe { Mmap::map(&file) }.map_err(|e| ReachError::Io {
        path: path.clone(),
        source: e,
    })?;

    parse_condensation(&mmap).map_err(ReachError::CorruptInput)
}

fn read_u32(data: &[u8], pos: &mut usize) -> Result<u32, String> {
    if *pos + 4 > data.len() {
        return Err("unexpected end of graph file".to_string());
    }
    let v = u32::from_be_bytes([data[*pos], data[*pos + 1], data[*pos + 2], data[*pos + 3]]);
    *pos += 4;
    Ok(v)
}

fn read_u8(data: &[u8], pos: &mut usize) -> Result<u8, String> {
    if *pos >= data.len() {
        return Err("unexpected end of graph file".to_string());
    }
    let v = data[*pos];
    *pos += 1;
    Ok(v)
}

fn read_f32(data: &[u8], pos: &mut usize) -> Result<f32, String> {
    if *pos + 4 > data.len() {
        return Err("unexpected end of graph file".to_string());
    }
    let v = f32::from_be_bytes([data[*pos], data[*pos + 1], data[*pos + 2], data[*pos + 3]]);
    *pos += 4;
    Ok(v)
}

fn parse_condensation(data: &[u8]) -> Result<Condensation, String> {
    if data.len() < MAGIC.len() || &data[..MAGIC.len()] != MAGIC {
        return Err("not a 2DReach graph file".to_string());
    }
    let mut pos = MAGIC.len();

    let num_nodes = read_u32(data, &mut pos)? as usize;
    let num_components = read_u32(data, &mut pos)? as usize;

    let mut nodes = Vec::with_capacity(num_nodes);
    for _ in 0..num_nodes {
        let cid = read_u32(data, &mut pos)?;
        let is_spatial = read_u8(data, &mut pos)? != 0;
        let x = read_f32(data, &mut pos)?;
        let y = read_f32(data, &mut pos)?;
        let point = if is_spatial { Some(Point { x, y }) } else { None };
        nodes.push(Node {
            cid: ComponentId(cid),
            point,
        });
    }

    let mut components = Vec::with_capacity(num_components);
    let mut children: Vec<Vec<ComponentId>> = Vec::with_capacity(num_components);
    for cid in 0..num_components {
        let indegree = read_u32(data, &mut pos)?;
        let is_spatial = read_u8(data, &mut pos)? != 0;
        let num_children = read_u32(data, &mut pos)? as usize;
        let mut kids = Vec::with_capacity(num_children);
        for _ in 0..num_children {
            kids.push(ComponentId(read_u32(data, &mut pos)?));
        }
        components.push(Component {
            id: ComponentId(cid as u32),
            indegree,
            is_spatial,
            members: Vec::new(),
        });
        children.push(kids);
    }

    for node in &nodes {
        if node.cid.index() >= num_components {
            return Err(format!(
                "node references out-of-range component {}",
                node.cid.index()
            ));
        }
    }
    Ok(Condensation::from_parts(nodes, components, children))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NodeId;

    fn encode_sample() -> Vec<u8> {
        // One component, one spatial node at (5.0, 5.0), no edges.
        let mut buf = Vec::new();
        buf.extend_from_slice(MAGIC);
        buf.extend_from_slice(&1u32.to_be_bytes()); // numNodes
        buf.extend_from_slice(&1u32.to_be_bytes()); // numComponents
        // node 0
        buf.extend_from_slice(&0u32.to_be_bytes()); // cid
        buf.push(1); // isSpatial
        buf.extend_from_slice(&5.0f32.to_be_bytes());
        buf.extend_from_slice(&5.0f32.to_be_bytes());
        // component 0
        buf.extend_from_slice(&0u32.to_be_bytes()); // indegree
        buf.push(1); // isSpatial
        buf.extend_from_slice(&0u32.to_be_bytes()); // numChildren
        buf
    }

    #[test]
    fn parses_minimal_graph() {
        let bytes = encode_sample();
        let cond = parse_condensation(&bytes).unwrap();
        assert_eq!(cond.num_nodes(), 1);
        assert_eq!(cond.num_components(), 1);
        assert_eq!(cond.node(NodeId(0)).point, Some(Point { x: 5.0, y: 5.0 }));
    }

    #[test]
    fn rejects_bad_magic() {
        let mut bytes = encode_sample();
        bytes[0] = b'X';
        assert!(parse_condensation(&bytes).is_err());
    }

    #[test]
    fn rejects_truncated_file() {
        let bytes = encode_sample();
        let truncated = &bytes[..bytes.len() - 2];
        assert!(parse_condensation(truncated).is_err());
    }
}
