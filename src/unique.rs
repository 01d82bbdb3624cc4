use log::debug;

use crate::common::{Level, NodeId};
use crate::edge::Edge;
use crate::nodes::{NodePool, NIL};

/// Initial bucket count; always a power of two.
pub const INIT_SIZE: usize = 1024;

/// Shift-mix bit-pattern hash over a node's key triple.
#[inline]
fn hash3(level: Level, low: Edge, high: Edge) -> u64 {
    let lv = level as u64;
    low.raw()
        .wrapping_add(high.raw() >> 2)
        .wrapping_add(lv << 3)
        .wrapping_sub(lv)
}

/// Interning table enforcing canonical representation.
///
/// Power-of-two array of bucket heads chained through [`Node::link`].
/// The caller normalizes (complement pull for BDDs, skip reduction for
/// ZDDs) before probing; this table only interns `(level, low, high)`
/// triples.
///
/// [`Node::link`]: crate::nodes::Node
pub struct UniqueTable {
    buckets: Vec<NodeId>,
    next_limit: usize,
    load_limit: f64,
}

impl UniqueTable {
    pub fn new(load_limit: f64) -> Self {
        let mut t = Self {
            buckets: vec![NIL; INIT_SIZE],
            next_limit: 0,
            load_limit,
        };
        t.set_next_limit();
        t
    }

    #[inline]
    fn mask(&self) -> u64 {
        self.buckets.len() as u64 - 1
    }

    fn set_next_limit(&mut self) {
        self.next_limit = (self.buckets.len() as f64 * self.load_limit) as usize;
    }

    pub(crate) fn set_load_limit(&mut self, load_limit: f64) {
        self.load_limit = load_limit;
        self.set_next_limit();
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.buckets.len()
    }

    /// True once the node count crosses the load limit.
    #[inline]
    pub(crate) fn need_grow(&self, node_num: usize) -> bool {
        node_num > self.next_limit
    }

    pub(crate) fn lookup(
        &self,
        pool: &NodePool,
        level: Level,
        low: Edge,
        high: Edge,
    ) -> Option<NodeId> {
        let pos = (hash3(level, low, high) & self.mask()) as usize;
        let mut cur = self.buckets[pos];
        while cur != NIL {
            let node = pool.node(cur);
            if node.level() == level && node.low() == low && node.high() == high {
                return Some(cur);
            }
            cur = node.link();
        }
        None
    }

    pub(crate) fn insert(&mut self, pool: &mut NodePool, id: NodeId) {
        let node = pool.node(id);
        let pos = (hash3(node.level(), node.low(), node.high()) & self.mask()) as usize;
        let head = self.buckets[pos];
        pool.node_mut(id).set_link(head);
        self.buckets[pos] = id;
    }

    /// Rebuilds the table at `new_size` buckets, relinking every chain.
    pub(crate) fn resize(&mut self, pool: &mut NodePool, new_size: usize) {
        debug!("unique table resize: {} -> {}", self.buckets.len(), new_size);
        let old = std::mem::replace(&mut self.buckets, vec![NIL; new_size]);
        self.set_next_limit();
        for head in old {
            let mut cur = head;
            while cur != NIL {
                let next = pool.node(cur).link();
                self.insert(pool, cur);
                cur = next;
            }
        }
    }

    /// Unlinks every dead node from its bucket. The freed nodes keep their
    /// link fields until the pool rebuilds the freelist.
    pub(crate) fn sweep(&mut self, pool: &mut NodePool) {
        for pos in 0..self.buckets.len() {
            let mut head = self.buckets[pos];
            while head != NIL && pool.node(head).noref() {
                head = pool.node(head).link();
            }
            self.buckets[pos] = head;
            let mut cur = head;
            while cur != NIL {
                let next = pool.node(cur).link();
                if next != NIL && pool.node(next).noref() {
                    let skip = pool.node(next).link();
                    pool.node_mut(cur).set_link(skip);
                } else {
                    cur = next;
                }
            }
        }
    }

    /// Bucket count a shrinking GC should drop to, if any.
    pub(crate) fn shrink_size(&self, node_num: usize) -> Option<usize> {
        let want = (node_num as f64 * 2.0 / self.load_limit) as usize;
        let mut new_size = self.buckets.len();
        while new_size > INIT_SIZE && want < new_size {
            new_size >>= 1;
        }
        if new_size != self.buckets.len() {
            Some(new_size)
        } else {
            None
        }
    }
}
