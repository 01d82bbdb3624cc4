use std::fmt;

use crate::common::VarId;

/// Boolean expression AST.
///
/// Used as the input of [`expr_to_bdd`] and as the cover representation
/// produced by the ISOP operator. Literals carry the variable id and an
/// inversion flag.
///
/// [`expr_to_bdd`]: crate::bdd_api::BddMgr::expr_to_bdd
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Zero,
    One,
    Lit(VarId, bool),
    Not(Box<Expr>),
    And(Vec<Expr>),
    Or(Vec<Expr>),
    Xor(Vec<Expr>),
}

impl Expr {
    pub fn posi_literal(varid: VarId) -> Expr {
        Expr::Lit(varid, false)
    }

    pub fn nega_literal(varid: VarId) -> Expr {
        Expr::Lit(varid, true)
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, Expr::Zero)
    }

    pub fn is_one(&self) -> bool {
        matches!(self, Expr::One)
    }

    /// Conjunction with constant folding and flattening.
    pub fn and(xs: Vec<Expr>) -> Expr {
        let mut out = Vec::with_capacity(xs.len());
        for x in xs {
            match x {
                Expr::One => {}
                Expr::Zero => return Expr::Zero,
                Expr::And(inner) => out.extend(inner),
                other => out.push(other),
            }
        }
        match out.len() {
            0 => Expr::One,
            1 => out.pop().unwrap(),
            _ => Expr::And(out),
        }
    }

    /// Disjunction with constant folding and flattening.
    pub fn or(xs: Vec<Expr>) -> Expr {
        let mut out = Vec::with_capacity(xs.len());
        for x in xs {
            match x {
                Expr::Zero => {}
                Expr::One => return Expr::One,
                Expr::Or(inner) => out.extend(inner),
                other => out.push(other),
            }
        }
        match out.len() {
            0 => Expr::Zero,
            1 => out.pop().unwrap(),
            _ => Expr::Or(out),
        }
    }

    /// Exclusive or with constant folding.
    pub fn xor(xs: Vec<Expr>) -> Expr {
        let mut inverted = false;
        let mut out = Vec::with_capacity(xs.len());
        for x in xs {
            match x {
                Expr::Zero => {}
                Expr::One => inverted = !inverted,
                Expr::Xor(inner) => out.extend(inner),
                other => out.push(other),
            }
        }
        let base = match out.len() {
            0 => Expr::Zero,
            1 => out.pop().unwrap(),
            _ => Expr::Xor(out),
        };
        if inverted {
            Expr::not(base)
        } else {
            base
        }
    }

    pub fn not(x: Expr) -> Expr {
        match x {
            Expr::Zero => Expr::One,
            Expr::One => Expr::Zero,
            Expr::Lit(v, inv) => Expr::Lit(v, !inv),
            Expr::Not(inner) => *inner,
            other => Expr::Not(Box::new(other)),
        }
    }

    /// Number of literal occurrences.
    pub fn literal_num(&self) -> usize {
        match self {
            Expr::Zero | Expr::One => 0,
            Expr::Lit(..) => 1,
            Expr::Not(x) => x.literal_num(),
            Expr::And(xs) | Expr::Or(xs) | Expr::Xor(xs) => {
                xs.iter().map(Expr::literal_num).sum()
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join(
            f: &mut fmt::Formatter<'_>,
            xs: &[Expr],
            sep: &str,
        ) -> fmt::Result {
            write!(f, "(")?;
            for (i, x) in xs.iter().enumerate() {
                if i > 0 {
                    write!(f, " {} ", sep)?;
                }
                write!(f, "{}", x)?;
            }
            write!(f, ")")
        }
        match self {
            Expr::Zero => write!(f, "0"),
            Expr::One => write!(f, "1"),
            Expr::Lit(v, false) => write!(f, "x{}", v),
            Expr::Lit(v, true) => write!(f, "~x{}", v),
            Expr::Not(x) => write!(f, "~{}", x),
            Expr::And(xs) => join(f, xs, "&"),
            Expr::Or(xs) => join(f, xs, "|"),
            Expr::Xor(xs) => join(f, xs, "^"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folding() {
        let a = Expr::posi_literal(0);
        let b = Expr::nega_literal(1);
        assert_eq!(Expr::and(vec![a.clone(), Expr::One]), a);
        assert_eq!(Expr::and(vec![a.clone(), Expr::Zero]), Expr::Zero);
        assert_eq!(Expr::or(vec![Expr::Zero]), Expr::Zero);
        assert_eq!(Expr::not(Expr::not(b.clone())), b);
        let e = Expr::or(vec![a.clone(), b.clone()]);
        assert_eq!(e.literal_num(), 2);
        assert_eq!(format!("{}", e), "(x0 | ~x1)");
    }

    #[test]
    fn xor_folds_ones() {
        let a = Expr::posi_literal(0);
        assert_eq!(
            Expr::xor(vec![a.clone(), Expr::One]),
            Expr::Lit(0, true)
        );
        assert_eq!(Expr::xor(vec![Expr::One, Expr::One]), Expr::Zero);
    }
}
