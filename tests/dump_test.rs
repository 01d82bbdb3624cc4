use std::io::Cursor;

use ddpack::prelude::*;

use num_bigint::BigUint;

fn mgr(name: &str) -> BddMgr {
    BddMgr::new(MgrKind::Classic, name, "")
}

#[test]
fn roundtrip_threshold_function() {
    let src = mgr("src");
    let f = src.th_func(3, 2);
    let count = f.minterm_count(3);
    let size = f.size();

    let mut buf = Vec::new();
    src.dump(&mut buf, std::slice::from_ref(&f)).unwrap();

    let dst = mgr("dst");
    let restored = dst.restore(&mut Cursor::new(&buf)).unwrap();
    assert_eq!(restored.len(), 1);
    let g = &restored[0];
    assert_eq!(g.minterm_count(3), count);
    assert_eq!(g.size(), size);
    assert_eq!(g.root_var(), Some(0));
}

#[test]
fn roundtrip_into_same_manager_is_identity() {
    let m = mgr("m");
    let a = m.posiliteral(0);
    let b = m.posiliteral(1);
    let c = m.posiliteral(2);
    let f = &(&a & &b.not()) | &c;
    let g = &a ^ &c;

    let mut buf = Vec::new();
    m.dump(&mut buf, &[f.clone(), g.clone()]).unwrap();
    let restored = m.restore(&mut Cursor::new(&buf)).unwrap();
    assert_eq!(restored.len(), 2);
    assert_eq!(restored[0], f);
    assert_eq!(restored[1], g);
}

#[test]
fn roundtrip_preserves_semantics_in_fresh_manager() {
    let src = mgr("src");
    let a = src.posiliteral(0);
    let b = src.posiliteral(1);
    let f = &a.not() | &b;

    let mut buf = Vec::new();
    src.dump(&mut buf, std::slice::from_ref(&f)).unwrap();

    let dst = mgr("dst");
    let g = dst.restore(&mut Cursor::new(&buf)).unwrap().remove(0);
    // rebuild the same function natively and compare canonically
    let a2 = dst.posiliteral(0);
    let b2 = dst.posiliteral(1);
    assert_eq!(g, &a2.not() | &b2);
}

#[test]
fn constants_and_sentinels_roundtrip() {
    let m = mgr("m");
    let handles = [m.zero(), m.one(), m.error(), m.overflow()];
    let mut buf = Vec::new();
    m.dump(&mut buf, &handles).unwrap();
    let restored = m.restore(&mut Cursor::new(&buf)).unwrap();
    assert!(restored[0].is_zero());
    assert!(restored[1].is_one());
    assert!(restored[2].is_error());
    assert!(restored[3].is_overflow());
}

#[test]
fn bad_magic_is_rejected() {
    let m = mgr("m");
    let mut buf = Vec::new();
    m.dump(&mut buf, &[m.one()]).unwrap();
    buf[0] ^= 0xff;
    match m.restore(&mut Cursor::new(&buf)) {
        Err(RestoreError::BadMagic) => {}
        other => panic!("expected BadMagic, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn truncated_stream_is_an_io_error() {
    let m = mgr("m");
    let f = m.th_func(3, 2);
    let mut buf = Vec::new();
    m.dump(&mut buf, std::slice::from_ref(&f)).unwrap();
    buf.truncate(buf.len() - 3);
    assert!(matches!(
        m.restore(&mut Cursor::new(&buf)),
        Err(RestoreError::Io(_))
    ));
}

#[test]
fn kind_mismatch_is_rejected() {
    let bdd_mgr = mgr("b");
    let mut buf = Vec::new();
    bdd_mgr.dump(&mut buf, &[bdd_mgr.one()]).unwrap();
    let zdd_mgr = ZddMgr::new("z", "");
    assert!(matches!(
        zdd_mgr.restore(&mut Cursor::new(&buf)),
        Err(RestoreError::KindMismatch)
    ));
}

#[test]
fn zdd_roundtrip() {
    let src = ZddMgr::new("src", "");
    let a = src.make_set(&[0, 2]);
    let b = src.make_set(&[1]);
    let fam = &a | &b;

    let mut buf = Vec::new();
    src.dump(&mut buf, std::slice::from_ref(&fam)).unwrap();

    let dst = ZddMgr::new("dst", "");
    let restored = dst.restore(&mut Cursor::new(&buf)).unwrap().remove(0);
    assert_eq!(restored.count(), BigUint::from(2u32));
    assert_eq!(restored.support(), vec![0, 1, 2]);
    let native = {
        let a2 = dst.make_set(&[0, 2]);
        let b2 = dst.make_set(&[1]);
        &a2 | &b2
    };
    assert_eq!(restored, native);
}

#[test]
fn dump_then_gc_then_restore() {
    let m = mgr("m");
    let mut buf = Vec::new();
    {
        let f = m.th_func(3, 2);
        m.dump(&mut buf, std::slice::from_ref(&f)).unwrap();
    }
    m.gc(true);
    assert_eq!(m.node_num(), 0);
    let g = m.restore(&mut Cursor::new(&buf)).unwrap().remove(0);
    assert_eq!(g.minterm_count(3), BigUint::from(4u32));
}
