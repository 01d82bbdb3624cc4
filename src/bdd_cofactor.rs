//! Restriction operators: single-literal cofactor, restrict by a cube
//! (linear in the argument size) and the generalized cofactor
//! (constrain).

use crate::bdd::{BddManager, MARK_NEGA, MARK_POSI};
use crate::common::VarId;
use crate::edge::Edge;

impl BddManager {
    /// Cofactor with respect to one literal. Unknown variables leave the
    /// function unchanged.
    pub(crate) fn scofactor(&mut self, f: Edge, varid: VarId, pol: bool) -> Edge {
        if f.is_error() {
            return Edge::ERROR;
        }
        if f.is_overflow() {
            return Edge::OVERFLOW;
        }
        let Some(level) = self.vars.level(varid) else {
            return f;
        };
        self.clear_varmark();
        self.var_marks
            .insert(level, if pol { MARK_POSI } else { MARK_NEGA });
        self.last_level = level;
        let ans = self.cubediv_step(f);
        self.cubediv_tbl.clear();
        self.clear_varmark();
        ans
    }

    /// Restrict by a cube. The restrictor must be a cube; `ZERO` (and any
    /// non-cube) yields `ERROR`, never `OVERFLOW`.
    pub(crate) fn cofactor_cube(&mut self, f: Edge, cube: Edge) -> Edge {
        if f.is_error() || cube.is_error() {
            return Edge::ERROR;
        }
        if f.is_overflow() || cube.is_overflow() {
            return Edge::OVERFLOW;
        }
        if cube.is_one() {
            return f;
        }
        if !self.check_cube(cube) {
            return Edge::ERROR;
        }
        self.cube_division(f, cube)
    }

    /// Restrict by a cube already known to be one: marks every literal of
    /// the cube, then divides in a single traversal of `f`.
    pub(crate) fn cube_division(&mut self, f: Edge, cube: Edge) -> Edge {
        self.clear_varmark();
        self.last_level = 0;
        let mut e = cube;
        while let Some(id) = e.node_id() {
            let level = self.pool.node(id).level();
            let (e0, e1) = self.decomp(e);
            self.last_level = level;
            if e0.is_zero() {
                self.var_marks.insert(level, MARK_POSI);
                e = e1;
            } else {
                self.var_marks.insert(level, MARK_NEGA);
                e = e0;
            }
        }
        let ans = self.cubediv_step(f);
        self.cubediv_tbl.clear();
        self.clear_varmark();
        ans
    }

    /// Division worker; linear in the size of `f` thanks to the per-call
    /// unary cache.
    fn cubediv_step(&mut self, f: Edge) -> Edge {
        if f.is_leaf() {
            return f;
        }
        let f_level = self.edge_level(f);
        if f_level > self.last_level {
            return f;
        }
        // restriction commutes with complement
        let pol = f.inv();
        let f = f.strip();
        if let Some(ans) = self.cubediv_tbl.get(f) {
            return ans.with_pol(pol);
        }
        let (f0, f1) = self.decomp(f);
        let ans = match self.var_marks.get(&f_level).copied() {
            Some(MARK_POSI) => self.cubediv_step(f1),
            Some(MARK_NEGA) => self.cubediv_step(f0),
            _ => {
                let r0 = self.cubediv_step(f0);
                if r0.is_overflow() {
                    return Edge::OVERFLOW;
                }
                let r1 = self.cubediv_step(f1);
                if r1.is_overflow() {
                    return Edge::OVERFLOW;
                }
                self.new_node(f_level, r0, r1)
            }
        };
        if !ans.is_overflow() {
            self.cubediv_tbl.put(f, ans);
        }
        ans.with_pol(pol)
    }

    /// Generalized cofactor (constrain). A constant-zero constraint is a
    /// caller error; cube constraints route to the linear divider.
    pub(crate) fn gcofactor(&mut self, f: Edge, c: Edge) -> Edge {
        if f.is_error() || c.is_error() {
            return Edge::ERROR;
        }
        if f.is_overflow() || c.is_overflow() {
            return Edge::OVERFLOW;
        }
        if c.is_zero() {
            return Edge::ERROR;
        }
        if self.check_cube(c) {
            return self.cube_division(f, c);
        }
        self.gcofactor_step(f, c)
    }

    fn gcofactor_step(&mut self, f: Edge, c: Edge) -> Edge {
        if c.is_zero() {
            return Edge::ERROR;
        }
        if f.is_leaf() || c.is_one() {
            return f;
        }
        if f == c {
            return Edge::ONE;
        }
        if f == c.complement() {
            return Edge::ZERO;
        }
        // (~f)/c == ~(f/c)
        let pol = f.inv();
        let f = f.with_pol(pol);
        if let Some(ans) = self.cofac_tbl.get(f, c) {
            return ans.with_pol(pol);
        }
        let f_level = self.edge_level(f);
        let c_level = self.edge_level(c);
        let (f0, f1) = if f_level <= c_level {
            self.decomp(f)
        } else {
            (f, f)
        };
        let ans = if f_level < c_level {
            let r0 = self.gcofactor_step(f0, c);
            if r0.is_overflow() {
                return Edge::OVERFLOW;
            }
            let r1 = self.gcofactor_step(f1, c);
            if r1.is_overflow() {
                return Edge::OVERFLOW;
            }
            self.new_node(f_level, r0, r1)
        } else {
            let (c0, c1) = self.decomp(c);
            if c0.is_zero() {
                self.gcofactor_step(f1, c1)
            } else if c1.is_zero() {
                self.gcofactor_step(f0, c0)
            } else {
                let r0 = self.gcofactor_step(f0, c0);
                if r0.is_overflow() {
                    return Edge::OVERFLOW;
                }
                let r1 = self.gcofactor_step(f1, c1);
                if r1.is_overflow() {
                    return Edge::OVERFLOW;
                }
                self.new_node(c_level, r0, r1)
            }
        };
        if !ans.is_overflow() {
            self.cofac_tbl.put(f, c, ans);
        }
        ans.with_pol(pol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_cofactors() {
        let mut m = BddManager::new("test", "");
        let x = m.posiliteral(0);
        let y = m.posiliteral(1);
        let f = m.and_op(x, y);
        assert_eq!(m.scofactor(f, 0, true), y);
        assert_eq!(m.scofactor(f, 0, false), Edge::ZERO);
        // unknown variable leaves f untouched
        assert_eq!(m.scofactor(f, 99, true), f);
    }

    #[test]
    fn cube_restrict() {
        let mut m = BddManager::new("test", "");
        let x = m.posiliteral(0);
        let y = m.posiliteral(1);
        let z = m.posiliteral(2);
        let xy = m.and_op(x, y);
        let f = m.or_op(xy, z);
        let nx = x.complement();
        let cube = m.and_op(nx, y);
        // f with x=0, y=1 is z
        assert_eq!(m.cofactor_cube(f, cube), z);
        assert_eq!(m.cofactor_cube(f, Edge::ZERO), Edge::ERROR);
        assert_eq!(m.cofactor_cube(f, Edge::ONE), f);
    }

    #[test]
    fn constrain_zero_is_error() {
        let mut m = BddManager::new("test", "");
        let x = m.posiliteral(0);
        assert_eq!(m.gcofactor(x, Edge::ZERO), Edge::ERROR);
        assert_eq!(m.gcofactor(Edge::ZERO, Edge::ZERO), Edge::ERROR);
        assert_eq!(m.gcofactor(x, Edge::OVERFLOW), Edge::OVERFLOW);
    }

    #[test]
    fn constrain_identities() {
        let mut m = BddManager::new("test", "");
        let x = m.posiliteral(0);
        let y = m.posiliteral(1);
        let f = m.or_op(x, y);
        assert_eq!(m.gcofactor(f, f), Edge::ONE);
        let nf = f.complement();
        assert_eq!(m.gcofactor(f, nf), Edge::ZERO);
        assert_eq!(m.gcofactor(f, Edge::ONE), f);
    }
}
