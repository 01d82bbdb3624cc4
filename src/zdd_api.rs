//! Reference-counted ZDD handles, mirroring the BDD handle layer.

use std::cell::RefCell;
use std::io::{Read, Write};
use std::rc::Rc;

use num_bigint::BigUint;

use crate::common::{MgrParam, SweepBinder, VarId};
use crate::dump::{dump_zdd, restore_zdd, RestoreError};
use crate::edge::Edge;
use crate::zdd::ZddManager;

pub struct ZddMgr {
    core: Rc<RefCell<ZddManager>>,
}

impl ZddMgr {
    pub fn new(name: &str, option: &str) -> Self {
        Self {
            core: Rc::new(RefCell::new(ZddManager::new(name, option))),
        }
    }

    fn wrap(&self, e: Edge) -> Zdd {
        Zdd::new(self.core.clone(), e)
    }

    /// The empty family.
    pub fn zero(&self) -> Zdd {
        self.wrap(Edge::ZERO)
    }

    /// The family containing only the empty set.
    pub fn one(&self) -> Zdd {
        self.wrap(Edge::ONE)
    }

    pub fn error(&self) -> Zdd {
        self.wrap(Edge::ERROR)
    }

    pub fn overflow(&self) -> Zdd {
        self.wrap(Edge::OVERFLOW)
    }

    /// The family `{{varid}}`.
    pub fn singleton(&self, varid: VarId) -> Zdd {
        let e = self.core.borrow_mut().make_singleton(varid);
        self.wrap(e)
    }

    /// The family containing exactly one set of the given variables.
    pub fn make_set(&self, vars: &[VarId]) -> Zdd {
        let e = self.core.borrow_mut().make_set(vars);
        self.wrap(e)
    }

    pub fn new_var(&self, varid: VarId) {
        self.core.borrow_mut().new_var(varid);
    }

    pub fn level(&self, varid: VarId) -> Option<u32> {
        self.core.borrow().level(varid)
    }

    pub fn varid(&self, level: u32) -> Option<VarId> {
        self.core.borrow().varid(level)
    }

    pub fn var_list(&self) -> Vec<VarId> {
        self.core.borrow().var_list()
    }

    pub fn enable_gc(&self) {
        self.core.borrow_mut().enable_gc();
    }

    pub fn disable_gc(&self) {
        self.core.borrow_mut().disable_gc();
    }

    pub fn gc(&self, shrink: bool) {
        self.core.borrow_mut().gc(shrink);
    }

    pub fn params(&self) -> MgrParam {
        self.core.borrow().params()
    }

    pub fn set_params(&self, param: &MgrParam) {
        self.core.borrow_mut().set_params(param);
    }

    pub fn reg_sweep_binder(&self, binder: Box<dyn SweepBinder>) {
        self.core.borrow_mut().reg_sweep_binder(binder);
    }

    pub fn name(&self) -> String {
        self.core.borrow().name().to_string()
    }

    pub fn node_num(&self) -> usize {
        self.core.borrow().node_num()
    }

    pub fn garbage_num(&self) -> usize {
        self.core.borrow().garbage_num()
    }

    pub fn avail_num(&self) -> usize {
        self.core.borrow().avail_num()
    }

    pub fn used_mem(&self) -> usize {
        self.core.borrow().used_mem()
    }

    pub fn gc_count(&self) -> usize {
        self.core.borrow().gc_count()
    }

    pub fn dump<W: Write>(&self, w: &mut W, zdds: &[Zdd]) -> std::io::Result<()> {
        let roots: Vec<Edge> = zdds.iter().map(|z| z.root).collect();
        dump_zdd(&mut *self.core.borrow_mut(), w, &roots)
    }

    pub fn restore<R: Read>(&self, r: &mut R) -> Result<Vec<Zdd>, RestoreError> {
        let roots = restore_zdd(&mut *self.core.borrow_mut(), r)?;
        Ok(roots.into_iter().map(|e| self.wrap(e)).collect())
    }
}

impl Clone for ZddMgr {
    fn clone(&self) -> Self {
        Self {
            core: self.core.clone(),
        }
    }
}

/// A family of sets rooted in a [`ZddMgr`].
pub struct Zdd {
    core: Rc<RefCell<ZddManager>>,
    root: Edge,
}

impl Zdd {
    fn new(core: Rc<RefCell<ZddManager>>, root: Edge) -> Self {
        core.borrow_mut().inc_rootref(root);
        Self { core, root }
    }

    fn wrap(&self, e: Edge) -> Zdd {
        Zdd::new(self.core.clone(), e)
    }

    fn same_mgr(&self, other: &Zdd) -> bool {
        Rc::ptr_eq(&self.core, &other.core)
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.root.is_zero()
    }

    #[inline]
    pub fn is_one(&self) -> bool {
        self.root.is_one()
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        self.root.is_error()
    }

    #[inline]
    pub fn is_overflow(&self) -> bool {
        self.root.is_overflow()
    }

    #[inline]
    pub fn is_invalid(&self) -> bool {
        self.root.is_invalid()
    }

    pub fn union(&self, other: &Zdd) -> Zdd {
        if !self.same_mgr(other) {
            return self.wrap(Edge::ERROR);
        }
        let e = self.core.borrow_mut().union_op(self.root, other.root);
        self.wrap(e)
    }

    pub fn intersect(&self, other: &Zdd) -> Zdd {
        if !self.same_mgr(other) {
            return self.wrap(Edge::ERROR);
        }
        let e = self.core.borrow_mut().intersect_op(self.root, other.root);
        self.wrap(e)
    }

    pub fn diff(&self, other: &Zdd) -> Zdd {
        if !self.same_mgr(other) {
            return self.wrap(Edge::ERROR);
        }
        let e = self.core.borrow_mut().diff_op(self.root, other.root);
        self.wrap(e)
    }

    /// Member sets not containing the variable.
    pub fn cofactor0(&self, varid: VarId) -> Zdd {
        let e = self.core.borrow_mut().offset_op(self.root, varid);
        self.wrap(e)
    }

    /// Member sets containing the variable, with it removed.
    pub fn cofactor1(&self, varid: VarId) -> Zdd {
        let e = self.core.borrow_mut().onset_op(self.root, varid);
        self.wrap(e)
    }

    /// Toggles membership of the variable in every member set.
    pub fn change(&self, varid: VarId) -> Zdd {
        let e = self.core.borrow_mut().change_op(self.root, varid);
        self.wrap(e)
    }

    /// Renames one variable to another in every member set.
    pub fn remap_var(&self, from: VarId, to: VarId) -> Zdd {
        let e = self.core.borrow_mut().remap_var(self.root, from, to);
        self.wrap(e)
    }

    /// Number of member sets.
    pub fn count(&self) -> BigUint {
        self.core.borrow().count_op(self.root)
    }

    /// Variables occurring in some member set, in level order.
    pub fn support(&self) -> Vec<VarId> {
        self.core.borrow_mut().support_op(self.root)
    }

    /// Number of distinct nodes below the root.
    pub fn size(&self) -> usize {
        self.core.borrow_mut().size_op(self.root)
    }

    pub(crate) fn root(&self) -> Edge {
        self.root
    }

    pub(crate) fn core(&self) -> &Rc<RefCell<ZddManager>> {
        &self.core
    }
}

impl Clone for Zdd {
    fn clone(&self) -> Self {
        Zdd::new(self.core.clone(), self.root)
    }
}

impl Drop for Zdd {
    fn drop(&mut self) {
        self.core.borrow_mut().dec_rootref(self.root);
    }
}

impl PartialEq for Zdd {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.core, &other.core) && self.root == other.root
    }
}

impl Eq for Zdd {}

impl std::fmt::Debug for Zdd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Zdd({:?})", self.root)
    }
}

impl std::ops::BitOr for &Zdd {
    type Output = Zdd;

    fn bitor(self, rhs: &Zdd) -> Zdd {
        self.union(rhs)
    }
}

impl std::ops::BitAnd for &Zdd {
    type Output = Zdd;

    fn bitand(self, rhs: &Zdd) -> Zdd {
        self.intersect(rhs)
    }
}

impl std::ops::Sub for &Zdd {
    type Output = Zdd;

    fn sub(self, rhs: &Zdd) -> Zdd {
        self.diff(rhs)
    }
}
