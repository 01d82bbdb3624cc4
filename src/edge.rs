use std::fmt;

use crate::common::NodeId;

/// A tagged edge word.
///
/// Values `0..=3` are the distinguished constants; a node edge packs the
/// node index shifted left by two with the complement attribute in bit 0:
/// `((id + 1) << 2) | inv`. The raw-word order doubles as the total order
/// used to canonicalize commutative operands.
///
/// `complement` flips `ZERO` and `ONE` into each other and toggles the
/// attribute bit of node edges; `ERROR` and `OVERFLOW` are fixed points so
/// that they poison every downstream operation unchanged.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge(u64);

impl Edge {
    pub const ZERO: Edge = Edge(0);
    pub const ONE: Edge = Edge(1);
    pub const ERROR: Edge = Edge(2);
    pub const OVERFLOW: Edge = Edge(3);

    /// Sentinel for empty cache slots. Never a legal operand or result.
    pub(crate) const INVALID: Edge = Edge(u64::MAX);

    #[inline]
    pub(crate) fn new(node: NodeId, inv: bool) -> Edge {
        Edge(((node as u64 + 1) << 2) | inv as u64)
    }

    #[inline]
    pub fn is_zero(self) -> bool {
        self == Edge::ZERO
    }

    #[inline]
    pub fn is_one(self) -> bool {
        self == Edge::ONE
    }

    #[inline]
    pub fn is_const(self) -> bool {
        self.0 < 2
    }

    #[inline]
    pub fn is_error(self) -> bool {
        self == Edge::ERROR
    }

    #[inline]
    pub fn is_overflow(self) -> bool {
        self == Edge::OVERFLOW
    }

    /// Error or overflow.
    #[inline]
    pub fn is_invalid(self) -> bool {
        self == Edge::ERROR || self == Edge::OVERFLOW
    }

    /// Any of the four non-node values.
    #[inline]
    pub fn is_leaf(self) -> bool {
        self.0 < 4
    }

    #[inline]
    pub(crate) fn node_id(self) -> Option<NodeId> {
        if self.0 >= 4 {
            Some((self.0 >> 2) as NodeId - 1)
        } else {
            None
        }
    }

    /// Complement attribute. `ONE` is the complement of `ZERO`, so the
    /// normalization that pulls the attribute off high branches also
    /// covers constant children; `ERROR`/`OVERFLOW` carry none.
    #[inline]
    pub(crate) fn inv(self) -> bool {
        !self.is_invalid() && self.0 & 1 == 1
    }

    #[inline]
    pub fn complement(self) -> Edge {
        if self.is_invalid() {
            self
        } else {
            Edge(self.0 ^ 1)
        }
    }

    /// Drops the complement attribute (`ONE` becomes `ZERO`).
    #[inline]
    pub(crate) fn strip(self) -> Edge {
        if self.is_invalid() {
            self
        } else {
            Edge(self.0 & !1)
        }
    }

    /// Applies a polarity pulled off some other edge.
    #[inline]
    pub(crate) fn with_pol(self, inv: bool) -> Edge {
        if inv {
            self.complement()
        } else {
            self
        }
    }

    #[inline]
    pub(crate) fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Edge::ZERO => write!(f, "Edge(0)"),
            Edge::ONE => write!(f, "Edge(1)"),
            Edge::ERROR => write!(f, "Edge(error)"),
            Edge::OVERFLOW => write!(f, "Edge(overflow)"),
            Edge::INVALID => write!(f, "Edge(invalid)"),
            e => write!(
                f,
                "Edge(n{}{})",
                e.node_id().unwrap(),
                if e.inv() { "~" } else { "" }
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complement_constants() {
        assert_eq!(Edge::ZERO.complement(), Edge::ONE);
        assert_eq!(Edge::ONE.complement(), Edge::ZERO);
        assert_eq!(Edge::ERROR.complement(), Edge::ERROR);
        assert_eq!(Edge::OVERFLOW.complement(), Edge::OVERFLOW);
    }

    #[test]
    fn complement_involution() {
        let e = Edge::new(42, false);
        assert_eq!(e.complement().complement(), e);
        assert!(e.complement().inv());
        assert_eq!(e.complement().node_id(), Some(42));
    }

    #[test]
    fn strip_and_pol() {
        let e = Edge::new(7, true);
        assert_eq!(e.strip(), Edge::new(7, false));
        assert_eq!(e.strip().with_pol(true), e);
        assert_eq!(Edge::ZERO.strip(), Edge::ZERO);
    }
}
