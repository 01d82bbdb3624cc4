//! Irredundant sum-of-products covers over an interval of functions
//! (Minato-Morreale expansion). Returns both the BDD of the cover and
//! the cover expression; the cache keeps the expression next to the
//! edge.

use crate::bdd::BddManager;
use crate::edge::Edge;
use crate::expr::Expr;

impl BddManager {
    /// ISOP of the interval `[l, u]`: a cover `g` with `l ≤ g ≤ u` none
    /// of whose cubes or literals can be dropped.
    pub(crate) fn isop_op(&mut self, l: Edge, u: Edge) -> (Edge, Expr) {
        if l.is_error() || u.is_error() {
            return (Edge::ERROR, Expr::Zero);
        }
        if l.is_overflow() || u.is_overflow() {
            return (Edge::OVERFLOW, Expr::Zero);
        }
        // the interval must be well formed
        let outside = self.and_op(l, u.complement());
        if outside.is_overflow() {
            return (Edge::OVERFLOW, Expr::Zero);
        }
        if !outside.is_zero() {
            return (Edge::ERROR, Expr::Zero);
        }
        self.isop_step(l, u)
    }

    fn isop_step(&mut self, l: Edge, u: Edge) -> (Edge, Expr) {
        if l.is_zero() {
            return (Edge::ZERO, Expr::Zero);
        }
        if u.is_one() {
            return (Edge::ONE, Expr::One);
        }
        if let Some(hit) = self.isop_tbl.get(l, u) {
            return hit;
        }
        let level = self.edge_level(l).min(self.edge_level(u));
        let varid = self.vars.varid(level).unwrap();
        let l_level = self.edge_level(l);
        let u_level = self.edge_level(u);
        let (l0, l1) = if l_level == level { self.decomp(l) } else { (l, l) };
        let (u0, u1) = if u_level == level { self.decomp(u) } else { (u, u) };

        // cubes that need the negative literal
        let must0 = self.and_op(l0, u1.complement());
        let (g0, c0) = self.isop_step(must0, u0);
        if g0.is_overflow() {
            return (Edge::OVERFLOW, Expr::Zero);
        }
        // cubes that need the positive literal
        let must1 = self.and_op(l1, u0.complement());
        let (g1, c1) = self.isop_step(must1, u1);
        if g1.is_overflow() {
            return (Edge::OVERFLOW, Expr::Zero);
        }
        // remainder, coverable without the split variable
        let h0 = self.and_op(l0, g0.complement());
        let h1 = self.and_op(l1, g1.complement());
        let ld = self.or_op(h0, h1);
        let ud = self.and_op(u0, u1);
        let (gd, cd) = self.isop_step(ld, ud);
        if gd.is_overflow() {
            return (Edge::OVERFLOW, Expr::Zero);
        }

        let part0 = self.new_node(level, g0, Edge::ZERO);
        let part1 = self.new_node(level, Edge::ZERO, g1);
        let tmp = self.or_op(part0, part1);
        let ans = self.or_op(tmp, gd);
        if ans.is_overflow() {
            return (Edge::OVERFLOW, Expr::Zero);
        }
        let cover = Expr::or(vec![
            Expr::and(vec![Expr::nega_literal(varid), c0]),
            Expr::and(vec![Expr::posi_literal(varid), c1]),
            cd,
        ]);
        self.isop_tbl.put(l, u, ans, cover.clone());
        (ans, cover)
    }
}
