//! BDD manager core.
//!
//! Owns the node pool, the variable table, the unique table and the
//! operation caches. All functions at this layer work on raw [`Edge`]
//! values; the reference-counted handle layer lives in [`bdd_api`].
//!
//! Canonical form: levels strictly increase toward the leaves, `low !=
//! high`, and the high branch never carries the complement attribute (it
//! is pushed onto the parent edge). Equality of edges therefore implies
//! equivalence of the represented functions.
//!
//! [`bdd_api`]: crate::bdd_api

use log::debug;

use crate::cache::{CompTbl1, CompTbl2, CompTbl3, IsopTbl};
use crate::common::{HashMap, Level, MgrParam, SweepBinder, VarId, LEVEL_MAX};
use crate::edge::Edge;
use crate::nodes::NodePool;
use crate::unique::UniqueTable;
use crate::vartable::VarTable;

/// Variable annotation used by the cube-restrict operators.
pub(crate) const MARK_POSI: u8 = 1;
pub(crate) const MARK_NEGA: u8 = 2;

pub struct BddManager {
    name: String,
    pub(crate) pool: NodePool,
    pub(crate) vars: VarTable,
    utable: UniqueTable,

    pub(crate) and_tbl: CompTbl2,
    pub(crate) xor_tbl: CompTbl2,
    pub(crate) cofac_tbl: CompTbl2,
    pub(crate) sm_tbl: CompTbl2,
    pub(crate) ite_tbl: CompTbl3,
    pub(crate) cmp_tbl: CompTbl1,
    pub(crate) cubediv_tbl: CompTbl1,
    pub(crate) isop_tbl: IsopTbl,

    gc_threshold: f64,
    gc_node_limit: usize,
    nt_load_limit: f64,
    rt_load_limit: f64,
    gc_disable: u32,
    dvo_enable: bool,
    reorder: bool,

    garbage_num: usize,
    gc_count: usize,

    binders: Vec<Box<dyn SweepBinder>>,

    // per-operation state for the cube-restrict and compose traversals
    pub(crate) var_marks: HashMap<Level, u8>,
    pub(crate) compose_map: HashMap<Level, Edge>,
    pub(crate) last_level: Level,
}

impl BddManager {
    pub fn new(name: &str, option: &str) -> Self {
        let param = MgrParam::default();
        Self {
            name: name.to_string(),
            pool: NodePool::new(param.mem_limit),
            vars: VarTable::new(),
            utable: UniqueTable::new(param.nt_load_limit),
            and_tbl: CompTbl2::new(param.rt_load_limit),
            xor_tbl: CompTbl2::new(param.rt_load_limit),
            cofac_tbl: CompTbl2::new(param.rt_load_limit),
            sm_tbl: CompTbl2::new(param.rt_load_limit),
            ite_tbl: CompTbl3::new(param.rt_load_limit),
            cmp_tbl: CompTbl1::new(param.rt_load_limit),
            cubediv_tbl: CompTbl1::new(param.rt_load_limit),
            isop_tbl: IsopTbl::new(param.rt_load_limit),
            gc_threshold: param.gc_threshold,
            gc_node_limit: param.gc_node_limit,
            nt_load_limit: param.nt_load_limit,
            rt_load_limit: param.rt_load_limit,
            gc_disable: 0,
            dvo_enable: false,
            reorder: option == "reorder",
            garbage_num: 0,
            gc_count: 0,
            binders: Vec::new(),
            var_marks: HashMap::default(),
            compose_map: HashMap::default(),
            last_level: 0,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Level of the node an edge points at; terminals live at the
    /// virtual bottom level.
    #[inline]
    pub(crate) fn edge_level(&self, e: Edge) -> Level {
        match e.node_id() {
            Some(id) => self.pool.node(id).level(),
            None => LEVEL_MAX,
        }
    }

    /// Shannon cofactors of an edge, with the complement attribute
    /// distributed over the children.
    #[inline]
    pub(crate) fn decomp(&self, e: Edge) -> (Edge, Edge) {
        match e.node_id() {
            Some(id) => {
                let node = self.pool.node(id);
                if e.inv() {
                    (node.low().complement(), node.high().complement())
                } else {
                    (node.low(), node.high())
                }
            }
            None => (e, e),
        }
    }

    /// Interns a node, normalizing the complement attribute off the high
    /// branch. Returns `low` when both children coincide, propagates
    /// `ERROR`/`OVERFLOW` children and yields `OVERFLOW` when the pool is
    /// out of budget.
    pub(crate) fn new_node(&mut self, level: Level, low: Edge, high: Edge) -> Edge {
        if low == high {
            return low;
        }
        if low.is_error() || high.is_error() {
            return Edge::ERROR;
        }
        if low.is_overflow() || high.is_overflow() {
            return Edge::OVERFLOW;
        }
        let pol = high.inv();
        let (low, high) = if pol {
            (low.complement(), high.complement())
        } else {
            (low, high)
        };
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
        Edge::new(id, pol)
    }

    /// Registers a variable (idempotent) and returns its level.
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

    /// Positive literal; auto-creates unknown variables.
    pub(crate) fn posiliteral(&mut self, varid: VarId) -> Edge {
        let level = self.vars.new_var(varid);
        self.new_node(level, Edge::ZERO, Edge::ONE)
    }

    pub(crate) fn negaliteral(&mut self, varid: VarId) -> Edge {
        self.posiliteral(varid).complement()
    }

    /// Raw node constructor over an external variable id.
    pub(crate) fn make_bdd(&mut self, varid: VarId, low: Edge, high: Edge) -> Edge {
        let level = self.vars.new_var(varid);
        self.new_node(level, low, high)
    }

    /// Increments the root reference of the node under `e`, locking its
    /// cone on the zero-to-one transition.
    pub(crate) fn inc_rootref(&mut self, e: Edge) {
        self.activate(e);
    }

    /// Decrements the root reference and collects garbage when the
    /// configured thresholds are crossed.
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

    /// The dynamic-ordering switches only record state; no reordering is
    /// implemented.
    pub fn enable_dvo(&mut self) {
        self.dvo_enable = true;
    }

    pub fn disable_dvo(&mut self) {
        self.dvo_enable = false;
    }

    #[inline]
    pub fn dvo_enabled(&self) -> bool {
        self.dvo_enable
    }

    #[inline]
    pub fn reorder_mode(&self) -> bool {
        self.reorder
    }

    pub fn reg_sweep_binder(&mut self, binder: Box<dyn SweepBinder>) {
        self.binders.push(binder);
    }

    /// Collects every node whose reference count is zero.
    ///
    /// Caches are swept before any node is unlinked so no phase ever
    /// follows a stale link. With `shrink` the unique table may contract.
    pub fn gc(&mut self, shrink: bool) {
        debug!("{}: gc begin ({} garbage)", self.name, self.garbage_num);
        let mut binders = std::mem::take(&mut self.binders);
        for b in binders.iter_mut() {
            b.on_sweep_begin();
        }
        self.binders = binders;

        self.and_tbl.sweep(&self.pool);
        self.xor_tbl.sweep(&self.pool);
        self.cofac_tbl.sweep(&self.pool);
        self.sm_tbl.sweep(&self.pool);
        self.ite_tbl.sweep(&self.pool);
        self.cmp_tbl.clear();
        self.cubediv_tbl.clear();
        self.isop_tbl.sweep(&self.pool);

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

    #[inline]
    pub fn var_num(&self) -> usize {
        self.vars.var_num()
    }

    pub fn var_list(&self) -> Vec<VarId> {
        self.vars.var_list()
    }

    /// Clears the per-operation variable annotations.
    pub(crate) fn clear_varmark(&mut self) {
        self.var_marks.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_is_canonical() {
        let mut mgr = BddManager::new("test", "");
        let x1 = mgr.posiliteral(0);
        let x2 = mgr.posiliteral(0);
        assert_eq!(x1, x2);
        assert_eq!(mgr.node_num(), 1);
        assert_eq!(mgr.negaliteral(0), x1.complement());
    }

    #[test]
    fn high_complement_is_normalized() {
        let mut mgr = BddManager::new("test", "");
        let level = mgr.new_var(0);
        // both polarities of the literal intern the same node
        let nx = mgr.new_node(level, Edge::ONE, Edge::ZERO);
        let x = mgr.posiliteral(0);
        assert!(!nx.inv());
        assert!(x.inv());
        assert_eq!(nx, x.complement());
        assert_eq!(mgr.node_num(), 1);
    }

    #[test]
    fn rootref_locks_cone() {
        let mut mgr = BddManager::new("test", "");
        let x = mgr.posiliteral(0);
        let y = mgr.posiliteral(1);
        let level = mgr.edge_level(x);
        let f = mgr.new_node(level, Edge::ZERO, y);
        assert_eq!(mgr.garbage_num(), 3);
        mgr.inc_rootref(f);
        // f and y are locked, x stays garbage
        assert_eq!(mgr.garbage_num(), 1);
        mgr.dec_rootref(f);
        assert_eq!(mgr.garbage_num(), 3);
    }

    #[test]
    fn gc_reclaims_everything_without_roots() {
        let mut mgr = BddManager::new("test", "");
        let x = mgr.posiliteral(0);
        let y = mgr.posiliteral(1);
        let level = mgr.edge_level(x);
        let _f = mgr.new_node(level, Edge::ZERO, y);
        assert_eq!(mgr.node_num(), 3);
        mgr.gc(true);
        assert_eq!(mgr.node_num(), 0);
        assert_eq!(mgr.garbage_num(), 0);
    }
}
