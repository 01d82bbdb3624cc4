//! Reference-counted BDD handles.
//!
//! A [`BddMgr`] owns the manager core behind an `Rc<RefCell<..>>`; every
//! [`Bdd`] wraps the manager plus a root edge and maintains the root
//! reference count through `Clone`/`Drop`. Handle destruction is what
//! triggers garbage collection, so raw edges never outlive the handles
//! that root them.

use std::cell::RefCell;
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::io::{Read, Write};
use std::rc::Rc;

use num_bigint::BigUint;

use crate::bdd::BddManager;
use crate::common::{HashMap, MgrParam, SweepBinder, VarId};
use crate::dump::{dump_bdd, restore_bdd, RestoreError};
use crate::edge::Edge;
use crate::expr::Expr;

/// Backend selector kept for compatibility; both kinds map to the same
/// implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MgrKind {
    Classic,
    Modern,
}

/// Operand count from which the batched operators switch to the
/// smallest-first heap strategy.
const NI_LIMIT: usize = 8;

pub struct BddMgr {
    kind: MgrKind,
    core: Rc<RefCell<BddManager>>,
}

impl BddMgr {
    /// `option == "reorder"` selects the variable-local table layout in
    /// the original design; here it only records the flag.
    pub fn new(kind: MgrKind, name: &str, option: &str) -> Self {
        Self {
            kind,
            core: Rc::new(RefCell::new(BddManager::new(name, option))),
        }
    }

    #[inline]
    pub fn kind(&self) -> MgrKind {
        self.kind
    }

    fn wrap(&self, e: Edge) -> Bdd {
        Bdd::new(self.core.clone(), e)
    }

    fn owns(&self, b: &Bdd) -> bool {
        Rc::ptr_eq(&self.core, &b.core)
    }

    pub fn zero(&self) -> Bdd {
        self.wrap(Edge::ZERO)
    }

    pub fn one(&self) -> Bdd {
        self.wrap(Edge::ONE)
    }

    pub fn error(&self) -> Bdd {
        self.wrap(Edge::ERROR)
    }

    pub fn overflow(&self) -> Bdd {
        self.wrap(Edge::OVERFLOW)
    }

    /// Literal of `varid`; the variable is created on first use.
    pub fn literal(&self, varid: VarId, inv: bool) -> Bdd {
        let e = {
            let mut core = self.core.borrow_mut();
            if inv {
                core.negaliteral(varid)
            } else {
                core.posiliteral(varid)
            }
        };
        self.wrap(e)
    }

    pub fn posiliteral(&self, varid: VarId) -> Bdd {
        self.literal(varid, false)
    }

    pub fn negaliteral(&self, varid: VarId) -> Bdd {
        self.literal(varid, true)
    }

    /// One decision node over `varid` with the given cofactors.
    pub fn make_bdd(&self, varid: VarId, low: &Bdd, high: &Bdd) -> Bdd {
        if !self.owns(low) || !self.owns(high) {
            return self.wrap(Edge::ERROR);
        }
        let e = self
            .core
            .borrow_mut()
            .make_bdd(varid, low.root, high.root);
        self.wrap(e)
    }

    pub fn ite(&self, f: &Bdd, g: &Bdd, h: &Bdd) -> Bdd {
        if !self.owns(f) || !self.owns(g) || !self.owns(h) {
            return self.wrap(Edge::ERROR);
        }
        let e = self.core.borrow_mut().ite_op(f.root, g.root, h.root);
        self.wrap(e)
    }

    fn batch_op(&self, bdds: &[Bdd], unit: Edge, op: fn(&mut BddManager, Edge, Edge) -> Edge) -> Bdd {
        if bdds.iter().any(|b| !self.owns(b)) {
            return self.wrap(Edge::ERROR);
        }
        if bdds.is_empty() {
            return self.wrap(unit);
        }
        if bdds.len() == 1 {
            return bdds[0].clone();
        }
        let mut core = self.core.borrow_mut();
        let ans = if bdds.len() < NI_LIMIT {
            let mut acc = bdds[0].root;
            for b in &bdds[1..] {
                acc = op(&mut core, acc, b.root);
            }
            acc
        } else {
            // smallest-first pairing keeps the intermediate results lean
            let mut work: BinaryHeap<Reverse<(usize, Edge)>> = BinaryHeap::new();
            for b in bdds {
                let size = core.size_op(b.root);
                work.push(Reverse((size, b.root)));
            }
            loop {
                let Reverse((_, a)) = work.pop().unwrap();
                match work.pop() {
                    None => break a,
                    Some(Reverse((_, b))) => {
                        let r = op(&mut core, a, b);
                        let size = core.size_op(r);
                        work.push(Reverse((size, r)));
                    }
                }
            }
        };
        drop(core);
        self.wrap(ans)
    }

    /// Conjunction of the whole list.
    pub fn and_op(&self, bdds: &[Bdd]) -> Bdd {
        self.batch_op(bdds, Edge::ONE, BddManager::and_op)
    }

    /// Disjunction of the whole list.
    pub fn or_op(&self, bdds: &[Bdd]) -> Bdd {
        self.batch_op(bdds, Edge::ZERO, BddManager::or_op)
    }

    /// Exclusive or of the whole list.
    pub fn xor_op(&self, bdds: &[Bdd]) -> Bdd {
        self.batch_op(bdds, Edge::ZERO, BddManager::xor_op)
    }

    /// Builds the BDD of an expression. Literals present in `varmap` are
    /// replaced by the mapped functions.
    pub fn expr_to_bdd(&self, expr: &Expr, varmap: &HashMap<VarId, Bdd>) -> Bdd {
        match expr {
            Expr::Zero => self.zero(),
            Expr::One => self.one(),
            Expr::Lit(varid, inv) => {
                let base = match varmap.get(varid) {
                    Some(b) => b.clone(),
                    None => self.posiliteral(*varid),
                };
                if *inv {
                    base.not()
                } else {
                    base
                }
            }
            Expr::Not(x) => self.expr_to_bdd(x, varmap).not(),
            Expr::And(xs) => {
                let list: Vec<Bdd> = xs.iter().map(|x| self.expr_to_bdd(x, varmap)).collect();
                self.and_op(&list)
            }
            Expr::Or(xs) => {
                let list: Vec<Bdd> = xs.iter().map(|x| self.expr_to_bdd(x, varmap)).collect();
                self.or_op(&list)
            }
            Expr::Xor(xs) => {
                let list: Vec<Bdd> = xs.iter().map(|x| self.expr_to_bdd(x, varmap)).collect();
                self.xor_op(&list)
            }
        }
    }

    /// Threshold function over variables `0..n`: true when at least `th`
    /// of them are.
    pub fn th_func(&self, n: u32, th: u32) -> Bdd {
        let elem = |i: u32, j: u32| (i * (th + 1) + j) as usize;
        let ans = {
            let mut core = self.core.borrow_mut();
            // keep the id order even though the table fills bottom-up
            for i in 0..n {
                core.new_var(i);
            }
            let mut table = vec![Edge::ZERO; ((n + 1) * (th + 1)) as usize];
            table[elem(n, 0)] = Edge::ONE;
            for i in (0..n).rev() {
                table[elem(i, 0)] = Edge::ONE;
                for j in 1..=th {
                    if j > n - i {
                        table[elem(i, j)] = Edge::ZERO;
                    } else {
                        let l = table[elem(i + 1, j)];
                        let h = table[elem(i + 1, j - 1)];
                        let tmp = core.make_bdd(i, l, h);
                        if tmp.is_overflow() {
                            table[elem(0, th)] = Edge::OVERFLOW;
                            break;
                        }
                        table[elem(i, j)] = tmp;
                    }
                }
                if table[elem(0, th)].is_overflow() {
                    break;
                }
            }
            table[elem(0, th)]
        };
        self.wrap(ans)
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

    pub fn enable_dvo(&self) {
        self.core.borrow_mut().enable_dvo();
    }

    pub fn disable_dvo(&self) {
        self.core.borrow_mut().disable_dvo();
    }

    pub fn dvo_enabled(&self) -> bool {
        self.core.borrow().dvo_enabled()
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

    /// Serializes the handles and their cones.
    pub fn dump<W: Write>(&self, w: &mut W, bdds: &[Bdd]) -> std::io::Result<()> {
        let roots: Vec<Edge> = bdds.iter().map(|b| b.root).collect();
        dump_bdd(&mut *self.core.borrow_mut(), w, &roots)
    }

    /// Reads edges dumped by [`dump`](Self::dump) back into this
    /// manager, re-interning every node.
    pub fn restore<R: Read>(&self, r: &mut R) -> Result<Vec<Bdd>, RestoreError> {
        let roots = restore_bdd(&mut *self.core.borrow_mut(), r)?;
        Ok(roots.into_iter().map(|e| self.wrap(e)).collect())
    }
}

impl Clone for BddMgr {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            core: self.core.clone(),
        }
    }
}

/// A Boolean function rooted in a [`BddMgr`].
pub struct Bdd {
    core: Rc<RefCell<BddManager>>,
    root: Edge,
}

impl Bdd {
    fn new(core: Rc<RefCell<BddManager>>, root: Edge) -> Self {
        core.borrow_mut().inc_rootref(root);
        Self { core, root }
    }

    fn wrap(&self, e: Edge) -> Bdd {
        Bdd::new(self.core.clone(), e)
    }

    fn same_mgr(&self, other: &Bdd) -> bool {
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
    pub fn is_const(&self) -> bool {
        self.root.is_const()
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

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.root.is_leaf()
    }

    pub fn is_cube(&self) -> bool {
        self.core.borrow().check_cube(self.root)
    }

    pub fn is_posi_cube(&self) -> bool {
        self.core.borrow().check_posi_cube(self.root)
    }

    pub fn not(&self) -> Bdd {
        let e = self.core.borrow().not_op(self.root);
        self.wrap(e)
    }

    pub fn and(&self, other: &Bdd) -> Bdd {
        if !self.same_mgr(other) {
            return self.wrap(Edge::ERROR);
        }
        let e = self.core.borrow_mut().and_op(self.root, other.root);
        self.wrap(e)
    }

    pub fn or(&self, other: &Bdd) -> Bdd {
        if !self.same_mgr(other) {
            return self.wrap(Edge::ERROR);
        }
        let e = self.core.borrow_mut().or_op(self.root, other.root);
        self.wrap(e)
    }

    pub fn xor(&self, other: &Bdd) -> Bdd {
        if !self.same_mgr(other) {
            return self.wrap(Edge::ERROR);
        }
        let e = self.core.borrow_mut().xor_op(self.root, other.root);
        self.wrap(e)
    }

    pub fn nand(&self, other: &Bdd) -> Bdd {
        self.and(other).not()
    }

    pub fn nor(&self, other: &Bdd) -> Bdd {
        self.or(other).not()
    }

    pub fn xnor(&self, other: &Bdd) -> Bdd {
        self.xor(other).not()
    }

    /// Cofactor with the variable set to false.
    pub fn cofactor0(&self, varid: VarId) -> Bdd {
        let e = self.core.borrow_mut().scofactor(self.root, varid, false);
        self.wrap(e)
    }

    /// Cofactor with the variable set to true.
    pub fn cofactor1(&self, varid: VarId) -> Bdd {
        let e = self.core.borrow_mut().scofactor(self.root, varid, true);
        self.wrap(e)
    }

    /// Restrict by a cube handle.
    pub fn cofactor(&self, cube: &Bdd) -> Bdd {
        if !self.same_mgr(cube) {
            return self.wrap(Edge::ERROR);
        }
        let e = self.core.borrow_mut().cofactor_cube(self.root, cube.root);
        self.wrap(e)
    }

    /// Generalized cofactor (constrain).
    pub fn gcofactor(&self, c: &Bdd) -> Bdd {
        if !self.same_mgr(c) {
            return self.wrap(Edge::ERROR);
        }
        let e = self.core.borrow_mut().gcofactor(self.root, c.root);
        self.wrap(e)
    }

    /// Existential quantification over the variable set.
    pub fn exist(&self, vars: &[VarId]) -> Bdd {
        let e = {
            let mut core = self.core.borrow_mut();
            let cube = core.cube_from_vars(vars);
            core.esmooth(self.root, cube)
        };
        self.wrap(e)
    }

    /// Universal quantification over the variable set.
    pub fn forall(&self, vars: &[VarId]) -> Bdd {
        let e = {
            let mut core = self.core.borrow_mut();
            let cube = core.cube_from_vars(vars);
            core.asmooth(self.root, cube)
        };
        self.wrap(e)
    }

    /// Alias of [`exist`](Self::exist).
    pub fn smooth(&self, vars: &[VarId]) -> Bdd {
        self.exist(vars)
    }

    /// Substitutes one variable by a function.
    pub fn compose(&self, varid: VarId, g: &Bdd) -> Bdd {
        if !self.same_mgr(g) {
            return self.wrap(Edge::ERROR);
        }
        let e = self
            .core
            .borrow_mut()
            .compose_op(self.root, &[(varid, g.root)]);
        self.wrap(e)
    }

    /// Simultaneous substitution of several variables.
    pub fn compose_multi(&self, assoc: &[(VarId, Bdd)]) -> Bdd {
        if assoc.iter().any(|(_, g)| !self.same_mgr(g)) {
            return self.wrap(Edge::ERROR);
        }
        let pairs: Vec<(VarId, Edge)> = assoc.iter().map(|(v, g)| (*v, g.root)).collect();
        let e = self.core.borrow_mut().compose_op(self.root, &pairs);
        self.wrap(e)
    }

    /// Irredundant sum-of-products over the interval `[self, upper]`.
    pub fn isop(&self, upper: &Bdd) -> (Bdd, Expr) {
        if !self.same_mgr(upper) {
            return (self.wrap(Edge::ERROR), Expr::Zero);
        }
        let (e, cover) = self.core.borrow_mut().isop_op(self.root, upper.root);
        (self.wrap(e), cover)
    }

    /// Number of distinct nodes below the root.
    pub fn size(&self) -> usize {
        self.core.borrow_mut().size_op(self.root)
    }

    /// Minterm count over `nvars` variables.
    pub fn minterm_count(&self, nvars: u32) -> BigUint {
        self.core.borrow().minterm_count_op(self.root, nvars)
    }

    /// Support variables in level order.
    pub fn support(&self) -> Vec<VarId> {
        self.core.borrow_mut().support_op(self.root)
    }

    /// Some path to the one-terminal, as a cube.
    pub fn one_path(&self) -> Bdd {
        let e = self.core.borrow_mut().onepath(self.root);
        self.wrap(e)
    }

    /// A path to the one-terminal with the fewest positive literals.
    pub fn shortest_one_path(&self) -> Bdd {
        let e = self.core.borrow_mut().shortest_onepath(self.root);
        self.wrap(e)
    }

    pub fn shortest_one_path_len(&self) -> u32 {
        self.core.borrow().shortest_onepath_len(self.root)
    }

    /// Variable at the root, if any.
    pub fn root_var(&self) -> Option<VarId> {
        let core = self.core.borrow();
        let (level, _, _) = core.root_decomp(self.root);
        level.and_then(|l| core.varid(l))
    }

    /// Root variable plus both cofactor handles.
    pub fn root_decomp(&self) -> (Option<VarId>, Bdd, Bdd) {
        let (var, e0, e1) = {
            let core = self.core.borrow();
            let (level, e0, e1) = core.root_decomp(self.root);
            (level.and_then(|l| core.varid(l)), e0, e1)
        };
        (var, self.wrap(e0), self.wrap(e1))
    }

    pub(crate) fn root(&self) -> Edge {
        self.root
    }

    pub(crate) fn core(&self) -> &Rc<RefCell<BddManager>> {
        &self.core
    }
}

impl Clone for Bdd {
    fn clone(&self) -> Self {
        Bdd::new(self.core.clone(), self.root)
    }
}

impl Drop for Bdd {
    fn drop(&mut self) {
        self.core.borrow_mut().dec_rootref(self.root);
    }
}

impl PartialEq for Bdd {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.core, &other.core) && self.root == other.root
    }
}

impl Eq for Bdd {}

impl std::fmt::Debug for Bdd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Bdd({:?})", self.root)
    }
}

impl std::ops::BitAnd for &Bdd {
    type Output = Bdd;

    fn bitand(self, rhs: &Bdd) -> Bdd {
        self.and(rhs)
    }
}

impl std::ops::BitOr for &Bdd {
    type Output = Bdd;

    fn bitor(self, rhs: &Bdd) -> Bdd {
        self.or(rhs)
    }
}

impl std::ops::BitXor for &Bdd {
    type Output = Bdd;

    fn bitxor(self, rhs: &Bdd) -> Bdd {
        self.xor(rhs)
    }
}

/// `f - g` is `f & !g`.
impl std::ops::Sub for &Bdd {
    type Output = Bdd;

    fn sub(self, rhs: &Bdd) -> Bdd {
        if !self.same_mgr(rhs) {
            return self.wrap(Edge::ERROR);
        }
        let e = self.core.borrow_mut().diff_op(self.root, rhs.root);
        self.wrap(e)
    }
}

impl std::ops::Not for &Bdd {
    type Output = Bdd;

    fn not(self) -> Bdd {
        Bdd::not(self)
    }
}
