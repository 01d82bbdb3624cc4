//! `ddpack`: a canonical BDD/ZDD package.
//!
//! Reduced ordered binary decision diagrams with complement edges and
//! zero-suppressed decision diagrams, sharing a slab node pool, an
//! interning unique table, direct-mapped operation caches and a
//! reference-count driven garbage collector. External code works through
//! the [`BddMgr`]/[`Bdd`] and [`ZddMgr`]/[`Zdd`] handle layers; handles
//! keep their cones alive and their destruction is what schedules GC.
//!
//! Memory pressure and internal faults are reported in-band: every
//! operator can return the `OVERFLOW` or `ERROR` sentinel, and both
//! poison every downstream operation.

pub mod common;
pub mod edge;
pub mod expr;
pub mod nodes;
pub mod vartable;
pub mod unique;
pub mod cache;

pub mod bdd;
pub mod bdd_ops;
pub mod bdd_cofactor;
pub mod bdd_quant;
pub mod bdd_compose;
pub mod bdd_isop;
pub mod bdd_count;
pub mod bdd_api;

pub mod zdd;
pub mod zdd_ops;
pub mod zdd_api;

pub mod dump;
pub mod dot;

pub use bdd_api::{Bdd, BddMgr, MgrKind};
pub use common::{MgrParam, SweepBinder, VarId};
pub use dump::RestoreError;
pub use expr::Expr;
pub use zdd_api::{Zdd, ZddMgr};

pub mod prelude {
    pub use crate::bdd_api::{Bdd, BddMgr, MgrKind};
    pub use crate::common::{MgrParam, SweepBinder, VarId};
    pub use crate::dot::Dot;
    pub use crate::dump::RestoreError;
    pub use crate::expr::Expr;
    pub use crate::zdd_api::{Zdd, ZddMgr};
}
