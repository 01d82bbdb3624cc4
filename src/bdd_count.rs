//! Introspection: node counting, support, arbitrary-precision minterm
//! counts and witness paths.

use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::bdd::BddManager;
use crate::common::{HashMap, HashSet, Level, VarId};
use crate::edge::Edge;

impl BddManager {
    /// Number of distinct nodes reachable from the edges, the shared
    /// terminal included. Leaf-only roots count zero.
    pub(crate) fn size_list(&mut self, roots: &[Edge]) -> usize {
        let mut count = 0;
        for &e in roots {
            self.mark_count(e, &mut count);
        }
        for &e in roots {
            self.clear_pmark(e);
        }
        if count == 0 {
            0
        } else {
            count + 1
        }
    }

    pub(crate) fn size_op(&mut self, e: Edge) -> usize {
        self.size_list(&[e])
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

    /// Variables the function depends on, in ascending level order.
    pub(crate) fn support_op(&mut self, e: Edge) -> Vec<VarId> {
        let mut levels: HashSet<Level> = HashSet::default();
        self.mark_support(e, &mut levels);
        self.clear_pmark(e);
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

    /// Number of minterms over `nvars` variables. Invalid edges count
    /// zero, as does an `nvars` too small to cover the support.
    pub(crate) fn minterm_count_op(&self, e: Edge, nvars: u32) -> BigUint {
        if e.is_invalid() {
            return BigUint::zero();
        }
        let mut seen: HashSet<Edge> = HashSet::default();
        if !self.levels_below(e, nvars, &mut seen) {
            return BigUint::zero();
        }
        let mut memo: HashMap<Edge, BigUint> = HashMap::default();
        let top = self.edge_level(e).min(nvars);
        let base = self.mc_val(e, nvars, &mut memo);
        base << top as usize
    }

    fn levels_below(&self, e: Edge, nvars: u32, seen: &mut HashSet<Edge>) -> bool {
        match e.node_id() {
            None => true,
            Some(id) => {
                if !seen.insert(e.strip()) {
                    return true;
                }
                let node = self.pool.node(id);
                node.level() < nvars
                    && self.levels_below(node.low(), nvars, seen)
                    && self.levels_below(node.high(), nvars, seen)
            }
        }
    }

    /// Count of the subspace spanned by the levels at and below the
    /// edge's top node, complement handled by inversion against the
    /// subspace size.
    fn mc_val(&self, e: Edge, nvars: u32, memo: &mut HashMap<Edge, BigUint>) -> BigUint {
        if e.is_zero() {
            return BigUint::zero();
        }
        if e.is_one() {
            return BigUint::one();
        }
        let level = self.edge_level(e);
        let stripped = e.strip();
        let base = match memo.get(&stripped) {
            Some(v) => v.clone(),
            None => {
                let node = self.pool.node(stripped.node_id().unwrap());
                let (low, high) = (node.low(), node.high());
                let low_level = self.edge_level(low).min(nvars);
                let high_level = self.edge_level(high).min(nvars);
                let v0 = self.mc_val(low, nvars, memo) << (low_level - level - 1) as usize;
                let v1 = self.mc_val(high, nvars, memo) << (high_level - level - 1) as usize;
                let v = v0 + v1;
                memo.insert(stripped, v.clone());
                v
            }
        };
        if e.inv() {
            (BigUint::one() << (nvars - level) as usize) - base
        } else {
            base
        }
    }

    /// An arbitrary path to the one-terminal as a cube.
    pub(crate) fn onepath(&mut self, e: Edge) -> Edge {
        if e.is_error() {
            return Edge::ERROR;
        }
        if e.is_overflow() {
            return Edge::OVERFLOW;
        }
        if e.is_zero() {
            return Edge::ZERO;
        }
        self.onepath_step(e)
    }

    fn onepath_step(&mut self, e: Edge) -> Edge {
        if e.is_one() {
            return Edge::ONE;
        }
        let level = self.edge_level(e);
        let (e0, e1) = self.decomp(e);
        if e1.is_zero() {
            let chd = self.onepath_step(e0);
            self.new_node(level, chd, Edge::ZERO)
        } else {
            let chd = self.onepath_step(e1);
            self.new_node(level, Edge::ZERO, chd)
        }
    }

    /// A path to the one-terminal with the fewest positive literals.
    pub(crate) fn shortest_onepath(&mut self, e: Edge) -> Edge {
        if e.is_error() {
            return Edge::ERROR;
        }
        if e.is_overflow() {
            return Edge::OVERFLOW;
        }
        let mut assoc: HashMap<Edge, Edge> = HashMap::default();
        self.sp_step(e, &mut assoc)
    }

    fn sp_step(&mut self, e: Edge, assoc: &mut HashMap<Edge, Edge>) -> Edge {
        if e.is_one() {
            return Edge::ONE;
        }
        if e.is_zero() {
            return Edge::ZERO;
        }
        if let Some(&ans) = assoc.get(&e) {
            return ans;
        }
        let level = self.edge_level(e);
        let (e0, e1) = self.decomp(e);
        let mut l = self.sp_step(e0, assoc);
        let mut h = self.sp_step(e1, assoc);
        let llen = self.sp_len(l);
        let hlen = self.sp_len(h);
        if hlen != -1 && (llen == -1 || llen > hlen + 1) {
            l = Edge::ZERO;
        } else if llen != -1 && llen < hlen + 1 {
            h = Edge::ZERO;
        }
        let ans = self.new_node(level, l, h);
        assoc.insert(e, ans);
        ans
    }

    /// Positive-literal count of a cube, `-1` for the zero-terminal.
    fn sp_len(&self, e: Edge) -> i64 {
        if e.is_zero() {
            return -1;
        }
        let mut e = e;
        let mut len = 0;
        while !e.is_one() {
            let (e0, e1) = self.decomp(e);
            if e0.is_zero() {
                len += 1;
                e = e1;
            } else {
                e = e0;
            }
        }
        len
    }

    /// Length of the shortest path to the one-terminal.
    pub(crate) fn shortest_onepath_len(&self, e: Edge) -> u32 {
        if e.is_invalid() {
            return 0;
        }
        let mut assoc: HashMap<Edge, i64> = HashMap::default();
        let len = self.spl_step(e, &mut assoc);
        if len < 0 {
            0
        } else {
            len as u32
        }
    }

    fn spl_step(&self, e: Edge, assoc: &mut HashMap<Edge, i64>) -> i64 {
        if e.is_one() {
            return 0;
        }
        if e.is_zero() {
            return -1;
        }
        if let Some(&ans) = assoc.get(&e) {
            return ans;
        }
        let (e0, e1) = self.decomp(e);
        let len0 = self.spl_step(e0, assoc);
        let len1 = self.spl_step(e1, assoc);
        let ans = match (len0, len1) {
            (l0, -1) => l0,
            (-1, l1) => l1 + 1,
            (l0, l1) => l0.min(l1 + 1),
        };
        assoc.insert(e, ans);
        ans
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_counts_shared_nodes_once() {
        let mut m = BddManager::new("test", "");
        let x = m.posiliteral(0);
        let y = m.posiliteral(1);
        let f = m.xor_op(x, y);
        // top node plus the shared y node plus the terminal
        assert_eq!(m.size_op(f), 3);
        assert_eq!(m.size_op(Edge::ONE), 0);
        // marks were cleared
        assert_eq!(m.size_op(f), 3);
    }

    #[test]
    fn support_is_sorted_by_level() {
        let mut m = BddManager::new("test", "");
        let x = m.posiliteral(10);
        let z = m.posiliteral(30);
        let f = m.and_op(x, z);
        assert_eq!(m.support_op(f), vec![10, 30]);
        assert_eq!(m.support_op(Edge::ZERO), Vec::<VarId>::new());
    }

    #[test]
    fn minterm_counts() {
        let mut m = BddManager::new("test", "");
        let x = m.posiliteral(0);
        let y = m.posiliteral(1);
        m.new_var(2);
        let f = m.and_op(x, y);
        assert_eq!(m.minterm_count_op(f, 3), BigUint::from(2u32));
        let g = m.or_op(x, y);
        assert_eq!(m.minterm_count_op(g, 3), BigUint::from(6u32));
        assert_eq!(m.minterm_count_op(Edge::ONE, 3), BigUint::from(8u32));
        assert_eq!(m.minterm_count_op(Edge::ZERO, 3), BigUint::zero());
        assert_eq!(m.minterm_count_op(Edge::ERROR, 3), BigUint::zero());
    }

    #[test]
    fn paths() {
        let mut m = BddManager::new("test", "");
        let x = m.posiliteral(0);
        let y = m.posiliteral(1);
        let z = m.posiliteral(2);
        let xy = m.and_op(x, y);
        let f = m.or_op(xy, z);
        let p = m.onepath(f);
        assert!(m.check_cube(p));
        let and_in = m.and_op(p, f);
        assert_eq!(and_in, p);
        // shortest path picks the single-literal cube z
        assert_eq!(m.shortest_onepath_len(f), 1);
        let sp = m.shortest_onepath(f);
        assert!(m.check_cube(sp));
        assert_eq!(m.sp_len(sp), 1);
        assert_eq!(m.shortest_onepath_len(Edge::OVERFLOW), 0);
    }
}
