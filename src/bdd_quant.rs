//! Quantifiers over a variable set represented as a cube of positive
//! literals. Universal quantification is the dual of the existential
//! one.

use crate::bdd::BddManager;
use crate::common::VarId;
use crate::edge::Edge;

impl BddManager {
    /// Builds the positive cube of a variable set. Unknown variables are
    /// auto-created like any literal constructor.
    pub(crate) fn cube_from_vars(&mut self, vars: &[VarId]) -> Edge {
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

    /// Existential quantification (smoothing) of every variable in the
    /// cube.
    pub(crate) fn esmooth(&mut self, f: Edge, cube: Edge) -> Edge {
        if f.is_error() || cube.is_error() {
            return Edge::ERROR;
        }
        if f.is_overflow() || cube.is_overflow() {
            return Edge::OVERFLOW;
        }
        if !self.check_posi_cube(cube) {
            return Edge::ERROR;
        }
        self.esmooth_step(f, cube)
    }

    fn esmooth_step(&mut self, f: Edge, cube: Edge) -> Edge {
        if f.is_leaf() || cube.is_one() {
            return f;
        }
        let f_level = self.edge_level(f);
        let cube_level = self.edge_level(cube);
        if cube_level < f_level {
            // the quantified variable does not occur in f
            let (_, c1) = self.decomp(cube);
            return self.esmooth_step(f, c1);
        }
        if let Some(ans) = self.sm_tbl.get(f, cube) {
            return ans;
        }
        let (f0, f1) = self.decomp(f);
        let ans = if cube_level == f_level {
            let (_, c1) = self.decomp(cube);
            let r0 = self.esmooth_step(f0, c1);
            if r0.is_overflow() {
                return Edge::OVERFLOW;
            }
            let r1 = self.esmooth_step(f1, c1);
            if r1.is_overflow() {
                return Edge::OVERFLOW;
            }
            self.or_op(r0, r1)
        } else {
            let r0 = self.esmooth_step(f0, cube);
            if r0.is_overflow() {
                return Edge::OVERFLOW;
            }
            let r1 = self.esmooth_step(f1, cube);
            if r1.is_overflow() {
                return Edge::OVERFLOW;
            }
            self.new_node(f_level, r0, r1)
        };
        if !ans.is_overflow() {
            self.sm_tbl.put(f, cube, ans);
        }
        ans
    }

    /// Universal quantification: `∀S.f == ¬∃S.¬f`.
    pub(crate) fn asmooth(&mut self, f: Edge, cube: Edge) -> Edge {
        self.esmooth(f.complement(), cube).complement()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exist_drops_a_conjunct() {
        let mut m = BddManager::new("test", "");
        let x = m.posiliteral(0);
        let y = m.posiliteral(1);
        let f = m.and_op(x, y);
        let cube = m.cube_from_vars(&[0]);
        assert_eq!(m.esmooth(f, cube), y);
    }

    #[test]
    fn exist_of_disjunction_is_one() {
        let mut m = BddManager::new("test", "");
        let x = m.posiliteral(0);
        let y = m.posiliteral(1);
        let f = m.or_op(x, y);
        let cube = m.cube_from_vars(&[0, 1]);
        assert_eq!(m.esmooth(f, cube), Edge::ONE);
    }

    #[test]
    fn forall_duality() {
        let mut m = BddManager::new("test", "");
        let x = m.posiliteral(0);
        let y = m.posiliteral(1);
        let f = m.or_op(x, y);
        let cube = m.cube_from_vars(&[0]);
        let lhs = m.asmooth(f, cube);
        let nf = f.complement();
        let tmp = m.esmooth(nf, cube);
        assert_eq!(lhs, tmp.complement());
        // ∀x.(x | y) == y
        assert_eq!(lhs, y);
    }

    #[test]
    fn non_cube_varset_is_error() {
        let mut m = BddManager::new("test", "");
        let x = m.posiliteral(0);
        let y = m.posiliteral(1);
        let f = m.or_op(x, y);
        assert_eq!(m.esmooth(f, f), Edge::ERROR);
        assert_eq!(m.esmooth(f, Edge::ZERO), Edge::ERROR);
    }
}
