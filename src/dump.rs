//! Binary serialization of edge sets and their transitive cones.
//!
//! Little-endian, fixed-width records. Layout:
//!
//! ```text
//! magic      8 bytes  "DDPKDUMP"
//! kind       1 byte   b'B' or b'Z'
//! version    4 bytes
//! root count 8 bytes
//! var count  4 bytes, then (id: u32, level: u32) per variable
//! node count 8 bytes, then (level: u32, low_ref: u64, high_ref: u64,
//!                           low_inv: u8, high_inv: u8) per node,
//!                           children always before parents
//! roots      (ref: u64, inv: u8) per root
//! ```
//!
//! Refs `0..=3` are reserved for `ZERO`/`ONE`/`ERROR`/`OVERFLOW`; node
//! `i` of the record stream is ref `i + 4`. The restorer rebuilds every
//! node through the manager's interning constructor, so restored edges
//! are canonical in the target manager even when its variable levels
//! differ from the dumped ones.

use std::io::{Read, Write};

use thiserror::Error;

use crate::bdd::BddManager;
use crate::common::{HashMap, Level, NodeId, VarId};
use crate::edge::Edge;
use crate::zdd::ZddManager;

const MAGIC: [u8; 8] = *b"DDPKDUMP";
const VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum RestoreError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("bad magic")]
    BadMagic,
    #[error("diagram kind mismatch")]
    KindMismatch,
    #[error("unsupported version {0}")]
    BadVersion(u32),
    #[error("corrupt dump: {0}")]
    Corrupt(&'static str),
}

/// Internal view of a manager that the dumper and restorer share.
trait DumpForest {
    const KIND: u8;
    /// Edges may carry the complement attribute.
    const COMPLEMENT: bool;

    fn var_list(&self) -> Vec<VarId>;
    fn register_var(&mut self, varid: VarId) -> Level;
    fn node_parts(&self, id: NodeId) -> (Level, Edge, Edge);
    fn nmark(&self, id: NodeId) -> bool;
    fn set_nmark(&mut self, id: NodeId, on: bool);
    fn intern(&mut self, level: Level, low: Edge, high: Edge) -> Edge;
}

impl DumpForest for BddManager {
    const KIND: u8 = b'B';
    const COMPLEMENT: bool = true;

    fn var_list(&self) -> Vec<VarId> {
        self.var_list()
    }

    fn register_var(&mut self, varid: VarId) -> Level {
        self.new_var(varid)
    }

    fn node_parts(&self, id: NodeId) -> (Level, Edge, Edge) {
        let node = self.pool.node(id);
        (node.level(), node.low(), node.high())
    }

    fn nmark(&self, id: NodeId) -> bool {
        self.pool.node(id).nmark()
    }

    fn set_nmark(&mut self, id: NodeId, on: bool) {
        self.pool.node_mut(id).set_nmark(on);
    }

    fn intern(&mut self, level: Level, low: Edge, high: Edge) -> Edge {
        self.new_node(level, low, high)
    }
}

impl DumpForest for ZddManager {
    const KIND: u8 = b'Z';
    const COMPLEMENT: bool = false;

    fn var_list(&self) -> Vec<VarId> {
        self.var_list()
    }

    fn register_var(&mut self, varid: VarId) -> Level {
        self.new_var(varid)
    }

    fn node_parts(&self, id: NodeId) -> (Level, Edge, Edge) {
        let node = self.pool.node(id);
        (node.level(), node.low(), node.high())
    }

    fn nmark(&self, id: NodeId) -> bool {
        self.pool.node(id).nmark()
    }

    fn set_nmark(&mut self, id: NodeId, on: bool) {
        self.pool.node_mut(id).set_nmark(on);
    }

    fn intern(&mut self, level: Level, low: Edge, high: Edge) -> Edge {
        self.new_node(level, low, high)
    }
}

fn read_exact<R: Read, const N: usize>(r: &mut R) -> Result<[u8; N], RestoreError> {
    let mut buf = [0u8; N];
    r.read_exact(&mut buf)?;
    Ok(buf)
}

fn read_u8<R: Read>(r: &mut R) -> Result<u8, RestoreError> {
    Ok(read_exact::<R, 1>(r)?[0])
}

fn read_u32<R: Read>(r: &mut R) -> Result<u32, RestoreError> {
    Ok(u32::from_le_bytes(read_exact(r)?))
}

fn read_u64<R: Read>(r: &mut R) -> Result<u64, RestoreError> {
    Ok(u64::from_le_bytes(read_exact(r)?))
}

/// Child-first collection of the cone under an edge.
fn collect<F: DumpForest>(mgr: &mut F, e: Edge, order: &mut Vec<NodeId>) {
    if let Some(id) = e.node_id() {
        if mgr.nmark(id) {
            return;
        }
        mgr.set_nmark(id, true);
        let (_, low, high) = mgr.node_parts(id);
        collect(mgr, low, order);
        collect(mgr, high, order);
        order.push(id);
    }
}

fn clear_nmark<F: DumpForest>(mgr: &mut F, e: Edge) {
    if let Some(id) = e.node_id() {
        if !mgr.nmark(id) {
            return;
        }
        mgr.set_nmark(id, false);
        let (_, low, high) = mgr.node_parts(id);
        clear_nmark(mgr, low);
        clear_nmark(mgr, high);
    }
}

fn edge_ref(e: Edge, index: &HashMap<NodeId, u64>) -> (u64, u8) {
    match e.node_id() {
        None => (e.raw(), 0),
        Some(id) => (index[&id] + 4, e.inv() as u8),
    }
}

fn dump_edges<F: DumpForest, W: Write>(
    mgr: &mut F,
    w: &mut W,
    roots: &[Edge],
) -> std::io::Result<()> {
    w.write_all(&MAGIC)?;
    w.write_all(&[F::KIND])?;
    w.write_all(&VERSION.to_le_bytes())?;
    w.write_all(&(roots.len() as u64).to_le_bytes())?;

    let vars = mgr.var_list();
    w.write_all(&(vars.len() as u32).to_le_bytes())?;
    for (level, varid) in vars.iter().enumerate() {
        w.write_all(&varid.to_le_bytes())?;
        w.write_all(&(level as u32).to_le_bytes())?;
    }

    let mut order: Vec<NodeId> = Vec::new();
    for &e in roots {
        collect(mgr, e, &mut order);
    }
    for &e in roots {
        clear_nmark(mgr, e);
    }
    let mut index: HashMap<NodeId, u64> = HashMap::default();
    for (i, &id) in order.iter().enumerate() {
        index.insert(id, i as u64);
    }

    w.write_all(&(order.len() as u64).to_le_bytes())?;
    for &id in &order {
        let (level, low, high) = mgr.node_parts(id);
        let (low_ref, low_inv) = edge_ref(low, &index);
        let (high_ref, high_inv) = edge_ref(high, &index);
        w.write_all(&level.to_le_bytes())?;
        w.write_all(&low_ref.to_le_bytes())?;
        w.write_all(&high_ref.to_le_bytes())?;
        w.write_all(&[low_inv, high_inv])?;
    }

    for &e in roots {
        let (root_ref, inv) = edge_ref(e, &index);
        w.write_all(&root_ref.to_le_bytes())?;
        w.write_all(&[inv])?;
    }
    Ok(())
}

fn resolve<F: DumpForest>(
    edges: &[Edge],
    raw: u64,
    inv: u8,
) -> Result<Edge, RestoreError> {
    if inv > 1 || (inv == 1 && !F::COMPLEMENT) {
        return Err(RestoreError::Corrupt("unexpected complement attribute"));
    }
    let e = match raw {
        0 => Edge::ZERO,
        1 => Edge::ONE,
        2 => Edge::ERROR,
        3 => Edge::OVERFLOW,
        n => match edges.get(n as usize - 4) {
            Some(&e) => e,
            None => return Err(RestoreError::Corrupt("forward edge reference")),
        },
    };
    if inv == 1 {
        Ok(e.complement())
    } else {
        Ok(e)
    }
}

fn restore_edges<F: DumpForest, R: Read>(
    mgr: &mut F,
    r: &mut R,
) -> Result<Vec<Edge>, RestoreError> {
    if read_exact::<R, 8>(r)? != MAGIC {
        return Err(RestoreError::BadMagic);
    }
    if read_u8(r)? != F::KIND {
        return Err(RestoreError::KindMismatch);
    }
    let version = read_u32(r)?;
    if version != VERSION {
        return Err(RestoreError::BadVersion(version));
    }
    let nroots = read_u64(r)?;

    let nvars = read_u32(r)?;
    let mut level_map: Vec<Level> = Vec::with_capacity(nvars as usize);
    for dumped_level in 0..nvars {
        let varid = read_u32(r)?;
        let level = read_u32(r)?;
        if level != dumped_level {
            return Err(RestoreError::Corrupt("variable table out of order"));
        }
        level_map.push(mgr.register_var(varid));
    }

    let nnodes = read_u64(r)?;
    let mut edges: Vec<Edge> = Vec::with_capacity(nnodes as usize);
    for _ in 0..nnodes {
        let dumped_level = read_u32(r)?;
        let low_ref = read_u64(r)?;
        let high_ref = read_u64(r)?;
        let low_inv = read_u8(r)?;
        let high_inv = read_u8(r)?;
        let level = *level_map
            .get(dumped_level as usize)
            .ok_or(RestoreError::Corrupt("node level out of range"))?;
        let low = resolve::<F>(&edges, low_ref, low_inv)?;
        let high = resolve::<F>(&edges, high_ref, high_inv)?;
        edges.push(mgr.intern(level, low, high));
    }

    let mut roots = Vec::with_capacity(nroots as usize);
    for _ in 0..nroots {
        let root_ref = read_u64(r)?;
        let inv = read_u8(r)?;
        roots.push(resolve::<F>(&edges, root_ref, inv)?);
    }
    Ok(roots)
}

pub(crate) fn dump_bdd<W: Write>(
    mgr: &mut BddManager,
    w: &mut W,
    roots: &[Edge],
) -> std::io::Result<()> {
    dump_edges(mgr, w, roots)
}

pub(crate) fn restore_bdd<R: Read>(
    mgr: &mut BddManager,
    r: &mut R,
) -> Result<Vec<Edge>, RestoreError> {
    restore_edges(mgr, r)
}

pub(crate) fn dump_zdd<W: Write>(
    mgr: &mut ZddManager,
    w: &mut W,
    roots: &[Edge],
) -> std::io::Result<()> {
    dump_edges(mgr, w, roots)
}

pub(crate) fn restore_zdd<R: Read>(
    mgr: &mut ZddManager,
    r: &mut R,
) -> Result<Vec<Edge>, RestoreError> {
    restore_edges(mgr, r)
}
