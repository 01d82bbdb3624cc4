//! ZDD manager core.
//!
//! Same pool/unique-table/cache machinery as the BDD side, but with the
//! zero-suppressed reduction: a node whose high branch is the empty
//! family collapses to its low branch, and edges carry no complement
//! attribute. `zero()` is the empty family, `one()` the family holding
//! the empty set.

use log::debug;

use crate::cache::{CompTbl2, CompTblLv};
use crate::common::{Level, MgrParam, SweepBinder, VarId, LEVEL_MAX};
use crate::edge::Edge;
use crate::nodes::NodePool;
use crate::unique::UniqueTable;
use crate::vartable::VarTable;

pub struct ZddManager {
    name: String,
    pub(crate) pool: NodePool,
    pub(crate) vars: VarTable,
    utable: UniqueTable,

    pub(crate) union_tbl: CompTbl2,
    pub(crate) int_tbl: CompTbl2,
    pub(crate) diff_tbl: CompTbl2,
    pub(crate) onset_tbl: CompTblLv,
    pub(crate) offset_tbl: CompTblLv,
    pub(crate) change_tbl: CompTblLv,

    gc_threshold: f64,
    gc_node_limit: usize,
    nt_load_limit: f64,
    rt_load_limit: f64,
    gc_disable: u32,

    garbage_num: usize,
    gc_count: usize,

    binders: Vec<Box<dyn SweepBinder>>,
}

impl ZddManager {
    pub fn new(name: &str, _option: &str) -> Self {
        let param = MgrParam::default();
        Self {
            name: name.to_string(),
            pool: NodePool::new(param.mem_limit),
            vars: VarTable::new(),
            utable: UniqueTable::new(param.nt_load_limit),
            union_tbl: CompTbl2::new(param.rt_load_limit),
            int_tbl: CompTbl2::new(param.rt_load_limit),
            diff_tbl: CompTbl2::new(param.rt_load_limit),
            onset_tbl: CompTblLv::new(param.rt_load_limit),
            offset_tbl: CompTblLv::new(param.rt_load_limit),
            change_tbl: CompTblLv::new(param.rt_load_limit),
            gc_threshold: param.gc_threshold,
            gc_node_limit: param.gc_node_limit,
            nt_load_limit: param.nt_load_limit,
            rt_load_limit: param.rt_load_limit,
            gc_disable: 0,
            garbage_num: 0,
            gc_count: 0,
            binders: Vec::new(),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub(crate) fn edge_level(&self, e: Edge) -> Level {
        match e.node_id() {
            Some(id) => self.pool.node(id).level(),
            None => LEVEL_MAX,
        }
    }

    #[inline]
    pub(crate) fn children(&self, e: Edge) -> (Edge, Edge) {
        match e.node_id() {
            Some(id) => {
                let node = self.pool.node(id);
                (node.low(), node.high())
            }
            None => (e, e),
        }
    }

    /// Interns a node under the zero-suppressed reduction.
    pub(crate) fn new_node(&mut self, level: Level, low: Edge, high: Edge) -> Edge {
        if high.is_zero() {
            return low;
        }
        if low.is_error() || high.is_error() {
            return Edge::ERROR;
        }
        if low.is_overflow() || high.is_overflow() {
            return Edge::OVERFLOW;
        }
        debug_assert!(self.edge_level(low) > level && self.edge_level(high) > level);
        let id = match self.utable.lookup(&self.pool, level, low, high) {
            Some(id) => id,
            None => {
                let Some(id) = self.pool.alloc() else {
                    return Edge::OVERFLOW;
                };
                self.pool.node_mut(id).init(level, low, high);
                self.garbage_num += 1;
                if self.utable.need_grow(self.pool.node_num()) {
                    let new_size = self.utable.size() * 2;
                    self.utable.resize(&mut self.pool, new_size);
                }
                self.utable.insert(&mut self.pool, id);
                id
            }
        };
        Edge::new(id, false)
    }

    pub fn new_var(&mut self, varid: VarId) -> Level {
        self.vars.new_var(varid)
    }

    #[inline]
    pub fn level(&self, varid: VarId) -> Option<Level> {
        self.vars.level(varid)
    }

    #[inline]
    pub fn varid(&self, level: Level) -> Option<VarId> {
        self.vars.varid(level)
    }

    pub fn var_list(&self) -> Vec<VarId> {
        self.vars.var_list()
    }

    /// The family containing exactly the singleton `{varid}`.
    pub(crate) fn make_singleton(&mut self, varid: VarId) -> Edge {
        let level = self.vars.new_var(varid);
        self.new_node(level, Edge::ZERO, Edge::ONE)
    }

    /// The family containing exactly one set of the given variables.
    pub(crate) fn make_set(&mut self, vars: &[VarId]) -> Edge {
        let mut levels: Vec<_> = vars.iter().map(|&v| self.vars.new_var(v)).collect();
        levels.sort_unstable();
        levels.dedup();
        let mut acc = Edge::ONE;
        for level in levels.into_iter().rev() {
            acc = self.new_node(level, Edge::ZERO, acc);
            if acc.is_overflow() {
                return Edge::OVERFLOW;
            }
        }
        acc
    }

    pub(crate) fn inc_rootref(&mut self, e: Edge) {
        self.activate(e);
    }

    pub(crate) fn dec_rootref(&mut self, e: Edge) {
        self.deactivate(e);
        if self.gc_disable == 0
            && self.pool.node_num() > self.gc_node_limit
            && (self.garbage_num as f64) > (self.pool.node_num() as f64) * self.gc_threshold
        {
            self.gc(false);
        }
    }

    fn activate(&mut self, e: Edge) {
        if let Some(id) = e.node_id() {
            let node = self.pool.node_mut(id);
            if node.inc_ref() == 1 {
                let (low, high) = (node.low(), node.high());
                self.garbage_num -= 1;
                self.activate(low);
                self.activate(high);
            }
        }
    }

    fn deactivate(&mut self, e: Edge) {
        if let Some(id) = e.node_id() {
            let node = self.pool.node_mut(id);
            let was = node.ref_count();
            if node.dec_ref() == 0 && was == 1 {
                let (low, high) = (node.low(), node.high());
                self.garbage_num += 1;
                self.deactivate(low);
                self.deactivate(high);
            }
        }
    }

    pub fn enable_gc(&mut self) {
        if self.gc_disable > 0 {
            self.gc_disable -= 1;
        }
    }

    pub fn disable_gc(&mut self) {
        self.gc_disable += 1;
    }

    pub fn reg_sweep_binder(&mut self, binder: Box<dyn SweepBinder>) {
        self.binders.push(binder);
    }

    pub fn gc(&mut self, shrink: bool) {
        debug!("{}: gc begin ({} garbage)", self.name, self.garbage_num);
        let mut binders = std::mem::take(&mut self.binders);
        for b in binders.iter_mut() {
            b.on_sweep_begin();
        }
        self.binders = binders;

        self.union_tbl.sweep(&self.pool);
        self.int_tbl.sweep(&self.pool);
        self.diff_tbl.sweep(&self.pool);
        self.onset_tbl.sweep(&self.pool);
        self.offset_tbl.sweep(&self.pool);
        self.change_tbl.sweep(&self.pool);

        self.utable.sweep(&mut self.pool);
        let (freed, released) = self.pool.sweep(self.garbage_num);
        self.garbage_num = 0;
        self.gc_count += 1;

        if shrink {
            if let Some(new_size) = self.utable.shrink_size(self.pool.node_num()) {
                self.utable.resize(&mut self.pool, new_size);
            }
        }
        debug!(
            "{}: gc end ({} nodes freed, {} slabs released)",
            self.name, freed, released
        );
    }

    pub fn params(&self) -> MgrParam {
        MgrParam {
            gc_threshold: self.gc_threshold,
            gc_node_limit: self.gc_node_limit,
            nt_load_limit: self.nt_load_limit,
            rt_load_limit: self.rt_load_limit,
            mem_limit: self.pool.mem_limit(),
        }
    }

    pub fn set_params(&mut self, param: &MgrParam) {
        self.gc_threshold = param.gc_threshold;
        self.gc_node_limit = param.gc_node_limit;
        self.nt_load_limit = param.nt_load_limit;
        self.rt_load_limit = param.rt_load_limit;
        self.utable.set_load_limit(param.nt_load_limit);
        self.pool.set_mem_limit(param.mem_limit);
    }

    #[inline]
    pub fn node_num(&self) -> usize {
        self.pool.node_num()
    }

    #[inline]
    pub fn garbage_num(&self) -> usize {
        self.garbage_num
    }

    #[inline]
    pub fn avail_num(&self) -> usize {
        self.pool.free_num()
    }

    #[inline]
    pub fn used_mem(&self) -> usize {
        self.pool.used_mem()
    }

    #[inline]
    pub fn gc_count(&self) -> usize {
        self.gc_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skip_reduction() {
        let mut mgr = ZddManager::new("test", "");
        let level = mgr.new_var(0);
        assert_eq!(mgr.new_node(level, Edge::ONE, Edge::ZERO), Edge::ONE);
        assert_eq!(mgr.node_num(), 0);
        let s = mgr.make_singleton(0);
        assert!(!s.is_leaf());
        assert_eq!(mgr.node_num(), 1);
        assert_eq!(mgr.make_singleton(0), s);
        assert_eq!(mgr.node_num(), 1);
    }

    #[test]
    fn make_set_orders_levels() {
        let mut mgr = ZddManager::new("test", "");
        let s1 = mgr.make_set(&[2, 0, 1]);
        let s2 = mgr.make_set(&[0, 1, 2]);
        assert_eq!(s1, s2);
    }
}
