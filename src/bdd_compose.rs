//! Variable substitution. Multiple substitutions are registered up
//! front and applied in one traversal; the per-call cache is cleared
//! afterwards because its entries depend on the registered map.

use crate::bdd::BddManager;
use crate::common::VarId;
use crate::edge::Edge;

impl BddManager {
    /// Substitutes `assoc` variables by the paired functions
    /// simultaneously. Unknown variables are ignored.
    pub(crate) fn compose_op(&mut self, f: Edge, assoc: &[(VarId, Edge)]) -> Edge {
        if f.is_error() || assoc.iter().any(|(_, g)| g.is_error()) {
            return Edge::ERROR;
        }
        if f.is_overflow() || assoc.iter().any(|(_, g)| g.is_overflow()) {
            return Edge::OVERFLOW;
        }
        self.compose_map.clear();
        self.last_level = 0;
        for &(varid, g) in assoc {
            if let Some(level) = self.vars.level(varid) {
                self.compose_map.insert(level, g);
                if level > self.last_level {
                    self.last_level = level;
                }
            }
        }
        if self.compose_map.is_empty() {
            return f;
        }
        let ans = self.compose_step(f);
        self.cmp_tbl.clear();
        self.compose_map.clear();
        ans
    }

    fn compose_step(&mut self, f: Edge) -> Edge {
        if f.is_leaf() {
            return f;
        }
        let f_level = self.edge_level(f);
        if f_level > self.last_level {
            return f;
        }
        // substitution is linear in the complement
        let pol = f.inv();
        let f = f.strip();
        if let Some(ans) = self.cmp_tbl.get(f) {
            return ans.with_pol(pol);
        }
        let (f0, f1) = self.decomp(f);
        let r0 = self.compose_step(f0);
        if r0.is_overflow() {
            return Edge::OVERFLOW;
        }
        let r1 = self.compose_step(f1);
        if r1.is_overflow() {
            return Edge::OVERFLOW;
        }
        let selector = match self.compose_map.get(&f_level).copied() {
            Some(g) => g,
            None => self.new_node(f_level, Edge::ZERO, Edge::ONE),
        };
        let ans = self.ite_op(selector, r1, r0);
        if !ans.is_overflow() {
            self.cmp_tbl.put(f, ans);
        }
        ans.with_pol(pol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitute_literal() {
        let mut m = BddManager::new("test", "");
        let x = m.posiliteral(0);
        let y = m.posiliteral(1);
        let z = m.posiliteral(2);
        let f = m.and_op(x, y);
        // x := z
        let g = m.compose_op(f, &[(0, z)]);
        let want = m.and_op(z, y);
        assert_eq!(g, want);
    }

    #[test]
    fn substitute_function_and_unknown_var() {
        let mut m = BddManager::new("test", "");
        let x = m.posiliteral(0);
        let y = m.posiliteral(1);
        let z = m.posiliteral(2);
        let f = m.or_op(x, y);
        let yz = m.and_op(y, z);
        // x := y & z, plus an unregistered variable which is ignored
        let g = m.compose_op(f, &[(0, yz), (42, z)]);
        let want = m.or_op(yz, y);
        assert_eq!(g, want);
    }

    #[test]
    fn simultaneous_swap() {
        let mut m = BddManager::new("test", "");
        let x = m.posiliteral(0);
        let y = m.posiliteral(1);
        let nx = x.complement();
        let f = m.and_op(nx, y);
        // swap x and y in one pass
        let g = m.compose_op(f, &[(0, y), (1, x)]);
        let ny = y.complement();
        let want = m.and_op(ny, x);
        assert_eq!(g, want);
    }
}
