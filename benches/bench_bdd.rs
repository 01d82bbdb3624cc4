use ddpack::prelude::*;

fn clock<F>(s: &str, f: F)
where
    F: FnOnce(),
{
    let start = std::time::Instant::now();
    f();
    let end = start.elapsed();
    println!("{}: time {}", s, end.as_secs_f64());
}

fn bench_parity(n: u32) {
    let m = BddMgr::new(MgrKind::Classic, "bench", "");
    let lits: Vec<Bdd> = (0..n).map(|i| m.posiliteral(i)).collect();
    let f = m.xor_op(&lits);
    println!("parity({}): size {} nodes {}", n, f.size(), m.node_num());
}

fn bench_threshold(n: u32, th: u32) {
    let m = BddMgr::new(MgrKind::Classic, "bench", "");
    let f = m.th_func(n, th);
    println!(
        "th({},{}): size {} minterms {}",
        n,
        th,
        f.size(),
        f.minterm_count(n)
    );
}

fn bench_gc_churn(rounds: usize) {
    let m = BddMgr::new(MgrKind::Classic, "bench", "");
    for r in 0..rounds {
        let lits: Vec<Bdd> = (0..16u32).map(|i| m.posiliteral(i)).collect();
        let f = m.and_op(&lits);
        let g = m.or_op(&lits);
        let _h = &f ^ &g;
        if r % 8 == 0 {
            m.gc(false);
        }
    }
    m.gc(true);
    println!("gc churn: {} collections", m.gc_count());
}

fn main() {
    clock("parity 64", || bench_parity(64));
    clock("parity 256", || bench_parity(256));
    clock("th(64, 32)", || bench_threshold(64, 32));
    clock("th(128, 8)", || bench_threshold(128, 8));
    clock("gc churn", || bench_gc_churn(256));
}
