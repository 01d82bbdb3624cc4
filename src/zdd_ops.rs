//! Family-algebra kernel: union, intersection, difference, the
//! per-variable subset operators, membership toggle and counting.

use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::common::{HashMap, HashSet, Level, VarId};
use crate::edge::Edge;
use crate::zdd::ZddManager;

impl ZddManager {
    pub(crate) fn union_op(&mut self, f: Edge, g: Edge) -> Edge {
        if f.is_error() || g.is_error() {
            return Edge::ERROR;
        }
        if f.is_overflow() || g.is_overflow() {
            return Edge::OVERFLOW;
        }
        if f.is_zero() {
            return g;
        }
        if g.is_zero() {
            return f;
        }
        if f == g {
            return f;
        }
        let (f, g) = if f.raw() > g.raw() { (g, f) } else { (f, g) };
        if let Some(ans) = self.union_tbl.get(f, g) {
            return ans;
        }
        let f_level = self.edge_level(f);
        let g_level = self.edge_level(g);
        let ans = if f_level < g_level {
            let (f0, f1) = self.children(f);
            let r0 = self.union_op(f0, g);
            if r0.is_overflow() {
                return Edge::OVERFLOW;
            }
            self.new_node(f_level, r0, f1)
        } else if g_level < f_level {
            let (g0, g1) = self.children(g);
            let r0 = self.union_op(f, g0);
            if r0.is_overflow() {
                return Edge::OVERFLOW;
            }
            self.new_node(g_level, r0, g1)
        } else {
            let (f0, f1) = self.children(f);
            let (g0, g1) = self.children(g);
            let r0 = self.union_op(f0, g0);
            if r0.is_overflow() {
                return Edge::OVERFLOW;
            }
            let r1 = self.union_op(f1, g1);
            if r1.is_overflow() {
                return Edge::OVERFLOW;
            }
            self.new_node(f_level, r0, r1)
        };
        if !ans.is_overflow() {
            self.union_tbl.put(f, g, ans);
        }
        ans
    }

    pub(crate) fn intersect_op(&mut self, f: Edge, g: Edge) -> Edge {
        if f.is_error() || g.is_error() {
            return Edge::ERROR;
        }
        if f.is_overflow() || g.is_overflow() {
            return Edge::OVERFLOW;
        }
        if f.is_zero() || g.is_zero() {
            return Edge::ZERO;
        }
        if f == g {
            return f;
        }
        let (f, g) = if f.raw() > g.raw() { (g, f) } else { (f, g) };
        if let Some(ans) = self.int_tbl.get(f, g) {
            return ans;
        }
        let f_level = self.edge_level(f);
        let g_level = self.edge_level(g);
        let ans = if f_level < g_level {
            // sets containing the variable cannot be shared
            let (f0, _) = self.children(f);
            self.intersect_op(f0, g)
        } else if g_level < f_level {
            let (g0, _) = self.children(g);
            self.intersect_op(f, g0)
        } else {
            let (f0, f1) = self.children(f);
            let (g0, g1) = self.children(g);
            let r0 = self.intersect_op(f0, g0);
            if r0.is_overflow() {
                return Edge::OVERFLOW;
            }
            let r1 = self.intersect_op(f1, g1);
            if r1.is_overflow() {
                return Edge::OVERFLOW;
            }
            self.new_node(f_level, r0, r1)
        };
        if !ans.is_overflow() {
            self.int_tbl.put(f, g, ans);
        }
        ans
    }

    pub(crate) fn diff_op(&mut self, f: Edge, g: Edge) -> Edge {
        if f.is_error() || g.is_error() {
            return Edge::ERROR;
        }
        if f.is_overflow() || g.is_overflow() {
            return Edge::OVERFLOW;
        }
        if f.is_zero() || g.is_zero() {
            return f;
        }
        if f == g {
            return Edge::ZERO;
        }
        if let Some(ans) = self.diff_tbl.get(f, g) {
            return ans;
        }
        let f_level = self.edge_level(f);
        let g_level = self.edge_level(g);
        let ans = if f_level < g_level {
            let (f0, f1) = self.children(f);
            let r0 = self.diff_op(f0, g);
            if r0.is_overflow() {
                return Edge::OVERFLOW;
            }
            self.new_node(f_level, r0, f1)
        } else if g_level < f_level {
            let (g0, _) = self.children(g);
            self.diff_op(f, g0)
        } else {
            let (f0, f1) = self.children(f);
            let (g0, g1) = self.children(g);
            let r0 = self.diff_op(f0, g0);
            if r0.is_overflow() {
                return Edge::OVERFLOW;
            }
            let r1 = self.diff_op(f1, g1);
            if r1.is_overflow() {
                return Edge::OVERFLOW;
            }
            self.new_node(f_level, r0, r1)
        };
        if !ans.is_overflow() {
            self.diff_tbl.put(f, g, ans);
        }
        ans
    }

    /// Member sets containing the variable, with the variable removed.
    pub(crate) fn onset_op(&mut self, f: Edge, varid: VarId) -> Edge {
        if f.is_invalid() {
            return f;
        }
        let Some(level) = self.vars.level(varid) else {
            return Edge::ZERO;
        };
        self.onset_step(f, level)
    }

    fn onset_step(&mut self, f: Edge, level: Level) -> Edge {
        let f_level = self.edge_level(f);
        if f_level > level {
            return Edge::ZERO;
        }
        let (f0, f1) = self.children(f);
        if f_level == level {
            return f1;
        }
        if let Some(ans) = self.onset_tbl.get(f, level) {
            return ans;
        }
        let r0 = self.onset_step(f0, level);
        if r0.is_overflow() {
            return Edge::OVERFLOW;
        }
        let r1 = self.onset_step(f1, level);
        if r1.is_overflow() {
            return Edge::OVERFLOW;
        }
        let ans = self.new_node(f_level, r0, r1);
        if !ans.is_overflow() {
            self.onset_tbl.put(f, level, ans);
        }
        ans
    }

    /// Member sets not containing the variable.
    pub(crate) fn offset_op(&mut self, f: Edge, varid: VarId) -> Edge {
        if f.is_invalid() {
            return f;
        }
        let Some(level) = self.vars.level(varid) else {
            return f;
        };
        self.offset_step(f, level)
    }

    fn offset_step(&mut self, f: Edge, level: Level) -> Edge {
        let f_level = self.edge_level(f);
        if f_level > level {
            return f;
        }
        let (f0, f1) = self.children(f);
        if f_level == level {
            return f0;
        }
        if let Some(ans) = self.offset_tbl.get(f, level) {
            return ans;
        }
        let r0 = self.offset_step(f0, level);
        if r0.is_overflow() {
            return Edge::OVERFLOW;
        }
        let r1 = self.offset_step(f1, level);
        if r1.is_overflow() {
            return Edge::OVERFLOW;
        }
        let ans = self.new_node(f_level, r0, r1);
        if !ans.is_overflow() {
            self.offset_tbl.put(f, level, ans);
        }
        ans
    }

    /// Toggles membership of the variable in every member set.
    pub(crate) fn change_op(&mut self, f: Edge, varid: VarId) -> Edge {
        if f.is_invalid() {
            return f;
        }
        let level = self.vars.new_var(varid);
        self.change_step(f, level)
    }

    fn change_step(&mut self, f: Edge, level: Level) -> Edge {
        if f.is_zero() {
            return f;
        }
        let f_level = self.edge_level(f);
        if f_level > level {
            return self.new_node(level, Edge::ZERO, f);
        }
        if let Some(ans) = self.change_tbl.get(f, level) {
            return ans;
        }
        let (f0, f1) = self.children(f);
        let ans = if f_level == level {
            self.new_node(level, f1, f0)
        } else {
            let r0 = self.change_step(f0, level);
            if r0.is_overflow() {
                return Edge::OVERFLOW;
            }
            let r1 = self.change_step(f1, level);
            if r1.is_overflow() {
                return Edge::OVERFLOW;
            }
            self.new_node(f_level, r0, r1)
        };
        if !ans.is_overflow() {
            self.change_tbl.put(f, level, ans);
        }
        ans
    }

    /// Renames `from` to `to` in every member set. Sets already carrying
    /// `to` keep it; the rename assumes the target is otherwise absent.
    pub(crate) fn remap_var(&mut self, f: Edge, from: VarId, to: VarId) -> Edge {
        if f.is_invalid() {
            return f;
        }
        if from == to {
            return f;
        }
        if self.vars.level(from).is_none() {
            return f;
        }
        let with = self.onset_op(f, from);
        if with.is_zero() {
            return f;
        }
        let without = self.offset_op(f, from);
        if without.is_overflow() || with.is_overflow() {
            return Edge::OVERFLOW;
        }
        let moved = self.change_op(with, to);
        if moved.is_overflow() {
            return Edge::OVERFLOW;
        }
        self.union_op(without, moved)
    }

    /// Number of member sets.
    pub(crate) fn count_op(&self, f: Edge) -> BigUint {
        if f.is_invalid() {
            return BigUint::zero();
        }
        let mut memo: HashMap<Edge, BigUint> = HashMap::default();
        self.count_step(f, &mut memo)
    }

    fn count_step(&self, f: Edge, memo: &mut HashMap<Edge, BigUint>) -> BigUint {
        if f.is_zero() {
            return BigUint::zero();
        }
        if f.is_one() {
            return BigUint::one();
        }
        if let Some(v) = memo.get(&f) {
            return v.clone();
        }
        let (f0, f1) = self.children(f);
        let v = self.count_step(f0, memo) + self.count_step(f1, memo);
        memo.insert(f, v.clone());
        v
    }

    /// Variables occurring in some member set, in level order.
    pub(crate) fn support_op(&mut self, f: Edge) -> Vec<VarId> {
        let mut levels: HashSet<Level> = HashSet::default();
        self.mark_support(f, &mut levels);
        self.clear_pmark(f);
        let mut levels: Vec<_> = levels.into_iter().collect();
        levels.sort_unstable();
        levels
            .into_iter()
            .map(|l| self.vars.varid(l).unwrap())
            .collect()
    }

    fn mark_support(&mut self, e: Edge, levels: &mut HashSet<Level>) {
        if let Some(id) = e.node_id() {
            if self.pool.node(id).pmark() {
                return;
            }
            self.pool.node_mut(id).set_pmark(true);
            let node = self.pool.node(id);
            levels.insert(node.level());
            let (low, high) = (node.low(), node.high());
            self.mark_support(low, levels);
            self.mark_support(high, levels);
        }
    }

    /// Number of distinct nodes below the root, the terminal included.
    /// Leaf roots count zero.
    pub(crate) fn size_op(&mut self, e: Edge) -> usize {
        let mut count = 0;
        self.mark_count(e, &mut count);
        self.clear_pmark(e);
        if count == 0 {
            0
        } else {
            count + 1
        }
    }

    fn mark_count(&mut self, e: Edge, count: &mut usize) {
        if let Some(id) = e.node_id() {
            if self.pool.node(id).pmark() {
                return;
            }
            self.pool.node_mut(id).set_pmark(true);
            *count += 1;
            let node = self.pool.node(id);
            let (low, high) = (node.low(), node.high());
            self.mark_count(low, count);
            self.mark_count(high, count);
        }
    }

    fn clear_pmark(&mut self, e: Edge) {
        if let Some(id) = e.node_id() {
            if !self.pool.node(id).pmark() {
                return;
            }
            self.pool.node_mut(id).set_pmark(false);
            let node = self.pool.node(id);
            let (low, high) = (node.low(), node.high());
            self.clear_pmark(low);
            self.clear_pmark(high);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn family_algebra() {
        let mut m = ZddManager::new("test", "");
        let a = m.make_set(&[0]);
        let b = m.make_set(&[1]);
        let ab = m.make_set(&[0, 1]);
        let u = m.union_op(a, b);
        let u = m.union_op(u, ab);
        assert_eq!(m.count_op(u), BigUint::from(3u32));
        let i = m.intersect_op(u, a);
        assert_eq!(i, a);
        let d = m.diff_op(u, a);
        let want = m.union_op(b, ab);
        assert_eq!(d, want);
        // union is idempotent and commutative
        assert_eq!(m.union_op(u, u), u);
        assert_eq!(m.union_op(b, a), m.union_op(a, b));
    }

    #[test]
    fn onset_offset() {
        let mut m = ZddManager::new("test", "");
        let a = m.make_set(&[0]);
        let ab = m.make_set(&[0, 1]);
        let b = m.make_set(&[1]);
        let u1 = m.union_op(a, ab);
        let fam = m.union_op(u1, b);
        // sets containing var 0, with it removed: {{}, {1}}
        let on = m.onset_op(fam, 0);
        let empty_set = Edge::ONE;
        let want = m.union_op(empty_set, b);
        assert_eq!(on, want);
        // sets without var 0: {{1}}
        assert_eq!(m.offset_op(fam, 0), b);
        // unknown variable: nothing contains it
        assert_eq!(m.onset_op(fam, 9), Edge::ZERO);
        assert_eq!(m.offset_op(fam, 9), fam);
    }

    #[test]
    fn change_and_remap() {
        let mut m = ZddManager::new("test", "");
        let a = m.make_set(&[0]);
        let b = m.make_set(&[1]);
        assert_eq!(m.change_op(a, 0), Edge::ONE);
        assert_eq!(m.change_op(a, 1), m.make_set(&[0, 1]));
        let fam = m.union_op(a, b);
        // rename 0 -> 2: {{2}, {1}}
        let r = m.remap_var(fam, 0, 2);
        let c = m.make_set(&[2]);
        let want = m.union_op(b, c);
        assert_eq!(r, want);
        // renaming an absent variable is the identity
        assert_eq!(m.remap_var(fam, 7, 8), fam);
    }

    #[test]
    fn support_and_size() {
        let mut m = ZddManager::new("test", "");
        let ab = m.make_set(&[0, 1]);
        let c = m.make_set(&[2]);
        let fam = m.union_op(ab, c);
        assert_eq!(m.support_op(fam), vec![0, 1, 2]);
        assert!(m.size_op(fam) >= 3);
        assert_eq!(m.size_op(Edge::ONE), 0);
    }

    #[test]
    fn invalid_propagation() {
        let mut m = ZddManager::new("test", "");
        let a = m.make_set(&[0]);
        assert_eq!(m.union_op(a, Edge::ERROR), Edge::ERROR);
        assert_eq!(m.intersect_op(Edge::OVERFLOW, a), Edge::OVERFLOW);
        assert_eq!(m.diff_op(a, Edge::ERROR), Edge::ERROR);
        assert_eq!(m.count_op(Edge::ERROR), BigUint::zero());
    }
}
