use ddpack::prelude::*;

use num_bigint::BigUint;

fn mgr() -> BddMgr {
    BddMgr::new(MgrKind::Classic, "test_mgr", "")
}

fn abc(mgr: &BddMgr) -> (Bdd, Bdd, Bdd) {
    (
        mgr.posiliteral(0),
        mgr.posiliteral(1),
        mgr.posiliteral(2),
    )
}

#[test]
fn contradiction_and_tautology() {
    let m = mgr();
    let a = m.posiliteral(0);
    let na = m.negaliteral(0);
    assert_eq!(&a & &na, m.zero());
    assert_eq!(&a | &na, m.one());
    assert_eq!(&a ^ &a, m.zero());
}

#[test]
fn involution_and_de_morgan() {
    let m = mgr();
    let (a, b, _) = abc(&m);
    let f = &a & &b;
    assert_eq!(f.not().not(), f);
    assert_eq!(f.not(), &a.not() | &b.not());
    assert_eq!((&a | &b).not(), &a.not() & &b.not());
}

#[test]
fn commutativity_and_associativity() {
    let m = mgr();
    let (a, b, c) = abc(&m);
    assert_eq!(&a & &b, &b & &a);
    assert_eq!(&a | &b, &b | &a);
    assert_eq!(&a ^ &b, &b ^ &a);
    let ab = &a & &b;
    let bc = &b & &c;
    assert_eq!(&ab & &c, &a & &bc);
    let o1 = &(&a | &b) | &c;
    let o2 = &a | &(&b | &c);
    assert_eq!(o1, o2);
    let x1 = &(&a ^ &b) ^ &c;
    let x2 = &a ^ &(&b ^ &c);
    assert_eq!(x1, x2);
}

#[test]
fn canonicity_across_build_orders() {
    let m = mgr();
    let (a, b, c) = abc(&m);
    // (a & b) | (a & c) == a & (b | c)
    let lhs = &(&a & &b) | &(&a & &c);
    let rhs = &a & &(&b | &c);
    assert_eq!(lhs, rhs);
    // xor via or/and
    let viax = &a ^ &b;
    let viaoa = &(&a & &b.not()) | &(&a.not() & &b);
    assert_eq!(viax, viaoa);
}

#[test]
fn ite_scenario() {
    let m = mgr();
    let (a, b, c) = abc(&m);
    let f = m.ite(&a, &b, &c);
    assert_eq!(f.size(), 4);
    assert_eq!(f.minterm_count(3), BigUint::from(4u32));
    assert_eq!(f.root_var(), Some(0));
    let (var, f0, f1) = f.root_decomp();
    assert_eq!(var, Some(0));
    assert_eq!(f0, c);
    assert_eq!(f1, b);
    // Shannon expansion rebuilds f for every support variable
    for v in f.support() {
        let hi = f.cofactor1(v);
        let lo = f.cofactor0(v);
        let lit = m.posiliteral(v);
        assert_eq!(m.ite(&lit, &hi, &lo), f);
    }
}

#[test]
fn exist_scenario() {
    let m = mgr();
    let (a, b, _) = abc(&m);
    let f = &a & &b;
    assert_eq!(f.exist(&[0]), b);
    assert_eq!(f.smooth(&[0]), b);
    assert_eq!(f.exist(&[0, 1]), m.one());
    assert_eq!(m.zero().exist(&[0]), m.zero());
}

#[test]
fn quantifier_duality() {
    let m = mgr();
    let (a, b, c) = abc(&m);
    let f = &(&a & &b) | &c;
    for vars in [&[0u32][..], &[1, 2][..], &[0, 1, 2][..]] {
        let lhs = f.forall(vars);
        let rhs = f.not().exist(vars).not();
        assert_eq!(lhs, rhs);
    }
}

#[test]
fn threshold_function() {
    let m = mgr();
    let f = m.th_func(3, 2);
    // at least two of a, b, c
    let (a, b, c) = abc(&m);
    let want = &(&(&a & &b) | &(&b & &c)) | &(&a & &c);
    assert_eq!(f, want);
    assert_eq!(f.minterm_count(3), BigUint::from(4u32));
    assert_eq!(f.root_var(), Some(0));
    assert_eq!(m.th_func(3, 0), m.one());
}

#[test]
fn batched_operators() {
    let m = mgr();
    let lits: Vec<Bdd> = (0u32..10).map(|i| m.posiliteral(i)).collect();
    let all = m.and_op(&lits);
    assert_eq!(all.minterm_count(10), BigUint::from(1u32));
    let any = m.or_op(&lits);
    assert_eq!(
        any.minterm_count(10),
        BigUint::from(1023u32)
    );
    let parity = m.xor_op(&lits);
    assert_eq!(parity.minterm_count(10), BigUint::from(512u32));
    assert_eq!(m.and_op(&[]), m.one());
    assert_eq!(m.or_op(&[]), m.zero());
    assert_eq!(m.and_op(&lits[..1]), lits[0]);
}

#[test]
fn expr_to_bdd_matches_operators() {
    let m = mgr();
    let (a, b, c) = abc(&m);
    let expr = Expr::or(vec![
        Expr::and(vec![Expr::posi_literal(0), Expr::posi_literal(1)]),
        Expr::nega_literal(2),
    ]);
    let f = m.expr_to_bdd(&expr, &Default::default());
    let want = &(&a & &b) | &c.not();
    assert_eq!(f, want);
    // literal remapping through the varmap
    let mut map = ddpack::common::HashMap::default();
    map.insert(2u32, &a & &b);
    let g = m.expr_to_bdd(&Expr::posi_literal(2), &map);
    assert_eq!(g, &a & &b);
}

#[test]
fn compose_and_cofactor() {
    let m = mgr();
    let (a, b, c) = abc(&m);
    let f = &(&a & &b) | &c;
    let g = f.compose(0, &c);
    let want = &(&c & &b) | &c;
    assert_eq!(g, want);
    let cube = &a & &b.not();
    let restricted = f.cofactor(&cube);
    assert_eq!(restricted, c);
    // constrain agrees with restrict on cubes
    assert_eq!(f.gcofactor(&cube), c);
    assert_eq!(f.gcofactor(&m.zero()), m.error());
}

#[test]
fn isop_covers_the_function() {
    let m = mgr();
    let (a, b, c) = abc(&m);
    let f = &(&a & &b) | &(&b.not() & &c);
    let (g, cover) = f.isop(&f);
    assert_eq!(g, f);
    assert!(cover.literal_num() >= 4);
    let rebuilt = m.expr_to_bdd(&cover, &Default::default());
    assert_eq!(rebuilt, f);
}

#[test]
fn paths() {
    let m = mgr();
    let (a, b, c) = abc(&m);
    let f = &(&a & &b) | &c;
    let p = f.one_path();
    assert!(p.is_cube());
    assert_eq!(&p & &f, p);
    let sp = f.shortest_one_path();
    assert!(sp.is_cube());
    assert_eq!(&sp & &f, sp);
    assert_eq!(f.shortest_one_path_len(), 1);
    assert_eq!(m.one().shortest_one_path_len(), 0);
    assert_eq!(m.error().shortest_one_path_len(), 0);
}

#[test]
fn support() {
    let m = mgr();
    let (a, _, c) = abc(&m);
    let f = &a ^ &c;
    assert_eq!(f.support(), vec![0, 2]);
    assert_eq!(m.one().support(), Vec::<VarId>::new());
}

#[test]
fn gc_quiescence() {
    let m = mgr();
    {
        let (a, b, c) = abc(&m);
        let f = &(&a & &b) | &c;
        assert!(m.node_num() > 0);
        let p = f.one_path();
        drop(p);
    }
    // every handle is gone
    m.gc(true);
    assert_eq!(m.node_num(), 0);
    assert_eq!(m.garbage_num(), 0);
    assert!(m.gc_count() >= 1);
}

#[test]
fn gc_keeps_rooted_cones() {
    let m = mgr();
    let (a, b, _) = abc(&m);
    let f = &a & &b;
    drop(a);
    drop(b);
    m.gc(false);
    assert!(m.node_num() > 0);
    assert_eq!(f.minterm_count(2), BigUint::from(1u32));
    // rebuilding the literals finds the interned nodes again
    let a2 = m.posiliteral(0);
    let b2 = m.posiliteral(1);
    assert_eq!(&a2 & &b2, f);
}

#[test]
fn overflow_monotonicity() {
    let m = mgr();
    let (a, b, _) = abc(&m);
    let f = &a & &b;
    // freeze the budget at the current slab count; allocation fails once
    // the freelist runs dry
    let mut param = m.params();
    param.mem_limit = m.used_mem();
    m.set_params(&param);
    m.disable_gc();
    let mut acc = m.one();
    let mut overflow = m.one();
    for i in 0u32..8 * 1024 {
        let lit = m.posiliteral(10 + i);
        acc = &acc & &lit;
        if acc.is_overflow() {
            overflow = acc.clone();
            break;
        }
    }
    assert!(overflow.is_overflow());
    // any operation consuming the overflow edge returns it unchanged
    assert!((&f & &overflow).is_overflow());
    assert!((&overflow | &a).is_overflow());
    assert!((&a ^ &overflow).is_overflow());
    assert!(m.ite(&overflow, &a, &b).is_overflow());
    assert!(overflow.not().is_overflow());
    // inspection of an overflow handle yields the defined sentinels
    assert_eq!(overflow.minterm_count(3), BigUint::from(0u32));
    assert_eq!(overflow.size(), 0);
    assert_eq!(overflow.support(), Vec::<VarId>::new());
    // raising the limit clears the latch
    param.mem_limit = 0;
    m.set_params(&param);
    m.enable_gc();
    let c2 = m.posiliteral(5);
    assert!(!c2.is_overflow());
}

#[test]
fn error_edges_dominate() {
    let m = mgr();
    let (a, _, _) = abc(&m);
    let e = m.error();
    assert!((&a & &e).is_error());
    assert!((&a | &e).is_error());
    assert!((&a ^ &e).is_error());
    assert!(e.not().is_error());
    assert!(m.ite(&e, &a, &a).is_error());
    assert_eq!(e.minterm_count(3), BigUint::from(0u32));
    assert_eq!(e.size(), 0);
}

#[test]
fn dvo_toggles_are_observable_noops() {
    let m = mgr();
    assert!(!m.dvo_enabled());
    m.enable_dvo();
    assert!(m.dvo_enabled());
    let (a, b, _) = abc(&m);
    let before = &a & &b;
    m.disable_dvo();
    assert!(!m.dvo_enabled());
    assert_eq!(&a & &b, before);
}

#[test]
fn sweep_binder_runs_before_gc() {
    use std::cell::Cell;
    use std::rc::Rc;

    struct Probe(Rc<Cell<usize>>);
    impl SweepBinder for Probe {
        fn on_sweep_begin(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    let m = mgr();
    let hits = Rc::new(Cell::new(0));
    m.reg_sweep_binder(Box::new(Probe(hits.clone())));
    m.gc(false);
    assert_eq!(hits.get(), 1);
    m.gc(true);
    assert_eq!(hits.get(), 2);
}

#[test]
fn both_kinds_share_one_backend() {
    let classic = BddMgr::new(MgrKind::Classic, "c", "");
    let modern = BddMgr::new(MgrKind::Modern, "m", "reorder");
    let f1 = {
        let a = classic.posiliteral(0);
        let b = classic.posiliteral(1);
        (&a ^ &b).minterm_count(2)
    };
    let f2 = {
        let a = modern.posiliteral(0);
        let b = modern.posiliteral(1);
        (&a ^ &b).minterm_count(2)
    };
    assert_eq!(f1, f2);
    assert_eq!(classic.kind(), MgrKind::Classic);
    assert_eq!(modern.kind(), MgrKind::Modern);
}

#[test]
fn cross_manager_operands_poison() {
    let m1 = mgr();
    let m2 = mgr();
    let a = m1.posiliteral(0);
    let b = m2.posiliteral(0);
    assert!((&a & &b).is_error());
    assert!((&a - &b).is_error());
}

#[test]
fn dot_render_smoke() {
    let m = mgr();
    let (a, b, _) = abc(&m);
    let f = &a ^ &b;
    let s = f.dot_string();
    assert!(s.starts_with("digraph"));
    assert!(s.contains("x0"));
    assert!(s.contains("x1"));
}
