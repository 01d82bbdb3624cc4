use std::hash::BuildHasherDefault;

use wyhash::WyHash;

/// External variable identifier, an opaque integer chosen by the caller.
pub type VarId = u32;

/// Internal position of a variable in the global ordering.
/// Smaller levels are closer to the root.
pub type Level = u32;

/// Index of a node in the slab pool.
pub type NodeId = u32;

/// Virtual level of the terminal nodes; every real level is smaller.
pub const LEVEL_MAX: Level = Level::MAX;

pub type HashMap<K, V> = hashbrown::HashMap<K, V, BuildHasherDefault<WyHash>>;
pub type HashSet<T> = hashbrown::HashSet<T, BuildHasherDefault<WyHash>>;

/// Tunable manager parameters.
///
/// `mem_limit == 0` means unlimited. Raising `mem_limit` on a manager whose
/// allocator already latched an overflow clears the latch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MgrParam {
    /// GC runs when `garbage_num / node_num` exceeds this ratio.
    pub gc_threshold: f64,
    /// GC never runs below this node count.
    pub gc_node_limit: usize,
    /// Unique table doubles when `node_num` exceeds `size * nt_load_limit`.
    pub nt_load_limit: f64,
    /// Operation caches grow when occupancy exceeds `size * rt_load_limit`.
    pub rt_load_limit: f64,
    /// Soft cap on pool memory in bytes.
    pub mem_limit: usize,
}

impl Default for MgrParam {
    fn default() -> Self {
        Self {
            gc_threshold: 0.10,
            gc_node_limit: 64 * 1024,
            nt_load_limit: 2.0,
            rt_load_limit: 0.8,
            mem_limit: 400 * 1024 * 1024,
        }
    }
}

/// Observer notified right before the operation caches are swept by GC.
///
/// External subsystems that remember raw edges register one of these and
/// drop their references when notified.
pub trait SweepBinder {
    fn on_sweep_begin(&mut self);
}
