//! Boolean apply kernel: AND/XOR with cached recursion, OR and the other
//! gates by De Morgan, and the fully rewritten ITE.

use crate::bdd::BddManager;
use crate::common::Level;
use crate::edge::Edge;

impl BddManager {
    /// Splits two operands on their topmost level.
    fn split2(&self, f: Edge, g: Edge) -> (Level, Edge, Edge, Edge, Edge) {
        let fl = self.edge_level(f);
        let gl = self.edge_level(g);
        let level = fl.min(gl);
        let (f0, f1) = if fl == level { self.decomp(f) } else { (f, f) };
        let (g0, g1) = if gl == level { self.decomp(g) } else { (g, g) };
        (level, f0, f1, g0, g1)
    }

    #[inline]
    pub(crate) fn not_op(&self, f: Edge) -> Edge {
        f.complement()
    }

    pub(crate) fn and_op(&mut self, f: Edge, g: Edge) -> Edge {
        if f.is_error() || g.is_error() {
            return Edge::ERROR;
        }
        if f.is_overflow() || g.is_overflow() {
            return Edge::OVERFLOW;
        }
        if f.is_one() {
            return g;
        }
        if g.is_one() {
            return f;
        }
        if f.is_zero() || g.is_zero() {
            return Edge::ZERO;
        }
        if f == g {
            return f;
        }
        if f == g.complement() {
            return Edge::ZERO;
        }
        // commutative: order operands by the raw word
        let (f, g) = if f.raw() > g.raw() { (g, f) } else { (f, g) };
        if let Some(ans) = self.and_tbl.get(f, g) {
            return ans;
        }
        let (level, f0, f1, g0, g1) = self.split2(f, g);
        let r0 = self.and_op(f0, g0);
        if r0.is_overflow() {
            return Edge::OVERFLOW;
        }
        let r1 = self.and_op(f1, g1);
        if r1.is_overflow() {
            return Edge::OVERFLOW;
        }
        let ans = self.new_node(level, r0, r1);
        if !ans.is_overflow() {
            self.and_tbl.put(f, g, ans);
        }
        ans
    }

    pub(crate) fn or_op(&mut self, f: Edge, g: Edge) -> Edge {
        self.and_op(f.complement(), g.complement()).complement()
    }

    pub(crate) fn xor_op(&mut self, f: Edge, g: Edge) -> Edge {
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
        if f.is_one() {
            return g.complement();
        }
        if g.is_one() {
            return f.complement();
        }
        if f == g {
            return Edge::ZERO;
        }
        if f == g.complement() {
            return Edge::ONE;
        }
        // xor is linear in the complement: pull it off both operands
        let pol = f.inv() ^ g.inv();
        let (f, g) = (f.strip(), g.strip());
        let (f, g) = if f.raw() > g.raw() { (g, f) } else { (f, g) };
        if let Some(ans) = self.xor_tbl.get(f, g) {
            return ans.with_pol(pol);
        }
        let (level, f0, f1, g0, g1) = self.split2(f, g);
        let r0 = self.xor_op(f0, g0);
        if r0.is_overflow() {
            return Edge::OVERFLOW;
        }
        let r1 = self.xor_op(f1, g1);
        if r1.is_overflow() {
            return Edge::OVERFLOW;
        }
        let ans = self.new_node(level, r0, r1);
        if !ans.is_overflow() {
            self.xor_tbl.put(f, g, ans);
        }
        ans.with_pol(pol)
    }

    pub(crate) fn nand_op(&mut self, f: Edge, g: Edge) -> Edge {
        self.and_op(f, g).complement()
    }

    pub(crate) fn nor_op(&mut self, f: Edge, g: Edge) -> Edge {
        self.or_op(f, g).complement()
    }

    pub(crate) fn xnor_op(&mut self, f: Edge, g: Edge) -> Edge {
        self.xor_op(f, g).complement()
    }

    /// f AND NOT g; the handle layer exposes it as `-`.
    pub(crate) fn diff_op(&mut self, f: Edge, g: Edge) -> Edge {
        self.and_op(f, g.complement())
    }

    /// If-then-else. The rewrite table runs before the cache so that
    /// every reducible call collapses to a cheaper operator.
    pub(crate) fn ite_op(&mut self, f: Edge, g: Edge, h: Edge) -> Edge {
        if f.is_error() || g.is_error() || h.is_error() {
            return Edge::ERROR;
        }
        if f.is_overflow() || g.is_overflow() || h.is_overflow() {
            return Edge::OVERFLOW;
        }
        if f.is_one() {
            return g;
        }
        if f.is_zero() {
            return h;
        }
        if g == h {
            return g;
        }
        if g == h.complement() {
            return self.xor_op(f, h);
        }
        if g.is_one() || f == g {
            return self.or_op(f, h);
        }
        if g.is_zero() || f == g.complement() {
            return self.and_op(f.complement(), h);
        }
        if h.is_one() || f == h.complement() {
            return self.or_op(f.complement(), g);
        }
        if h.is_zero() || f == h {
            return self.and_op(f, g);
        }
        // f, g, h are all interior here
        let (mut f, mut g, mut h) = (f, g, h);
        if g.raw() > h.raw() {
            std::mem::swap(&mut g, &mut h);
            f = f.complement();
        }
        let pol = g.inv();
        g = g.strip();
        h = h.with_pol(pol);

        let f_level = self.edge_level(f);
        let g_level = self.edge_level(g);
        let h_level = self.edge_level(h);
        let (f0, f1) = self.decomp(f);
        // literal condition builds the node directly
        if f_level < g_level && f_level < h_level {
            if f0.is_zero() && f1.is_one() {
                return self.new_node(f_level, h, g).with_pol(pol);
            }
            if f0.is_one() && f1.is_zero() {
                return self.new_node(f_level, g, h).with_pol(pol);
            }
        }
        if let Some(ans) = self.ite_tbl.get(f, g, h) {
            return ans.with_pol(pol);
        }
        let level = f_level.min(g_level).min(h_level);
        let (f0, f1) = if f_level == level { (f0, f1) } else { (f, f) };
        let (g0, g1) = if g_level == level { self.decomp(g) } else { (g, g) };
        let (h0, h1) = if h_level == level { self.decomp(h) } else { (h, h) };
        let r0 = self.ite_op(f0, g0, h0);
        if r0.is_overflow() {
            return Edge::OVERFLOW;
        }
        let r1 = self.ite_op(f1, g1, h1);
        if r1.is_overflow() {
            return Edge::OVERFLOW;
        }
        let ans = self.new_node(level, r0, r1);
        if !ans.is_overflow() {
            self.ite_tbl.put(f, g, h, ans);
        }
        ans.with_pol(pol)
    }

    /// Shannon picks at the root.
    pub(crate) fn root_decomp(&self, e: Edge) -> (Option<Level>, Edge, Edge) {
        match e.node_id() {
            Some(id) => {
                let level = self.pool.node(id).level();
                let (e0, e1) = self.decomp(e);
                (Some(level), e0, e1)
            }
            None => (None, e, e),
        }
    }

    /// True when the function is a conjunction of literals.
    pub(crate) fn check_cube(&self, e: Edge) -> bool {
        if e.is_invalid() || e.is_zero() {
            return false;
        }
        if e.is_one() {
            return true;
        }
        let mut e = e;
        loop {
            let (e0, e1) = self.decomp(e);
            if e0.is_zero() {
                e = e1;
            } else if e1.is_zero() {
                e = e0;
            } else {
                return false;
            }
            if e.is_one() {
                return true;
            }
        }
    }

    /// True when the function is a cube of positive literals only.
    pub(crate) fn check_posi_cube(&self, e: Edge) -> bool {
        if e.is_invalid() || e.is_zero() {
            return false;
        }
        if e.is_one() {
            return true;
        }
        let mut e = e;
        loop {
            let (e0, e1) = self.decomp(e);
            if !e0.is_zero() || e1.is_zero() {
                return false;
            }
            if e1.is_one() {
                return true;
            }
            e = e1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mgr() -> BddManager {
        BddManager::new("test", "")
    }

    #[test]
    fn and_identities() {
        let mut m = mgr();
        let x = m.posiliteral(0);
        let y = m.posiliteral(1);
        assert_eq!(m.and_op(x, Edge::ONE), x);
        assert_eq!(m.and_op(x, Edge::ZERO), Edge::ZERO);
        assert_eq!(m.and_op(x, x.complement()), Edge::ZERO);
        let a = m.and_op(x, y);
        let b = m.and_op(y, x);
        assert_eq!(a, b);
    }

    #[test]
    fn de_morgan() {
        let mut m = mgr();
        let x = m.posiliteral(0);
        let y = m.posiliteral(1);
        let lhs = m.and_op(x, y).complement();
        let rhs = m.or_op(x.complement(), y.complement());
        assert_eq!(lhs, rhs);
    }

    #[test]
    fn xor_and_ite_agree() {
        let mut m = mgr();
        let x = m.posiliteral(0);
        let y = m.posiliteral(1);
        let via_xor = m.xor_op(x, y);
        let ny = y.complement();
        let via_ite = m.ite_op(x, ny, y);
        assert_eq!(via_xor, via_ite);
    }

    #[test]
    fn cube_predicates() {
        let mut m = mgr();
        let x = m.posiliteral(0);
        let y = m.posiliteral(1);
        let ny = y.complement();
        let cube = m.and_op(x, ny);
        assert!(m.check_cube(cube));
        assert!(!m.check_posi_cube(cube));
        let pcube = m.and_op(x, y);
        assert!(m.check_posi_cube(pcube));
        let sum = m.or_op(x, y);
        assert!(!m.check_cube(sum));
        assert!(!m.check_cube(Edge::ZERO));
        assert!(m.check_cube(Edge::ONE));
    }

    #[test]
    fn error_and_overflow_poison() {
        let mut m = mgr();
        let x = m.posiliteral(0);
        assert_eq!(m.and_op(x, Edge::ERROR), Edge::ERROR);
        assert_eq!(m.and_op(x, Edge::OVERFLOW), Edge::OVERFLOW);
        assert_eq!(m.ite_op(Edge::ERROR, x, x), Edge::ERROR);
        assert_eq!(m.xor_op(Edge::OVERFLOW, x), Edge::OVERFLOW);
        // error wins over overflow
        assert_eq!(m.and_op(Edge::ERROR, Edge::OVERFLOW), Edge::ERROR);
    }
}
