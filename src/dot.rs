//! Graphviz output for handles. Complement edges are drawn dotted.

use std::io::{BufWriter, Write};

use crate::bdd_api::Bdd;
use crate::common::{HashSet, NodeId};
use crate::edge::Edge;
use crate::zdd_api::Zdd;

const HEADER: &str =
    "digraph { layout=dot; overlap=false; splines=true; node [fontsize=10];\n";

fn target_name(e: Edge) -> String {
    match e.node_id() {
        Some(id) => format!("obj{}", id),
        None => match e {
            Edge::ONE => "one".to_string(),
            Edge::ERROR => "error".to_string(),
            Edge::OVERFLOW => "ovf".to_string(),
            _ => "zero".to_string(),
        },
    }
}

fn write_terminal<W: Write>(w: &mut W, e: Edge, seen: &mut HashSet<u64>) -> std::io::Result<()> {
    if e.node_id().is_some() || !seen.insert(e.raw()) {
        return Ok(());
    }
    let label = match e {
        Edge::ONE => "1",
        Edge::ERROR => "E",
        Edge::OVERFLOW => "O",
        _ => "0",
    };
    writeln!(w, "\"{}\" [shape=square, label=\"{}\"];", target_name(e), label)
}

pub trait Dot {
    /// Writes the graph rooted at this handle in DOT format.
    fn dot<W: Write>(&self, w: &mut W) -> std::io::Result<()>;

    fn dot_string(&self) -> String {
        let mut buf = Vec::new();
        {
            let mut w = BufWriter::new(&mut buf);
            self.dot(&mut w).unwrap();
        }
        String::from_utf8(buf).unwrap()
    }
}

impl Dot for Bdd {
    fn dot<W: Write>(&self, w: &mut W) -> std::io::Result<()> {
        w.write_all(HEADER.as_bytes())?;
        let core = self.core().borrow();
        let mut visited: HashSet<NodeId> = HashSet::default();
        let mut terminals: HashSet<u64> = HashSet::default();
        let root = self.root();
        write_terminal(w, root, &mut terminals)?;
        if let Some(id) = root.node_id() {
            let style = if root.inv() { " [style=dotted]" } else { "" };
            writeln!(w, "\"root\" [shape=plaintext, label=\"f\"];")?;
            writeln!(w, "\"root\" -> \"obj{}\"{};", id, style)?;
        }
        let mut stack = Vec::new();
        if let Some(id) = root.node_id() {
            stack.push(id);
        }
        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            let node = core.pool.node(id);
            let varid = core.varid(node.level()).unwrap();
            writeln!(w, "\"obj{}\" [shape=circle, label=\"x{}\"];", id, varid)?;
            for (tag, e) in [("0", node.low()), ("1", node.high())] {
                write_terminal(w, e, &mut terminals)?;
                let style = if e.inv() && e.node_id().is_some() {
                    ", style=dotted"
                } else {
                    ""
                };
                writeln!(
                    w,
                    "\"obj{}\" -> \"{}\" [label=\"{}\"{}];",
                    id,
                    target_name(e),
                    tag,
                    style
                )?;
                if let Some(chd) = e.node_id() {
                    stack.push(chd);
                }
            }
        }
        w.write_all(b"}\n")
    }
}

impl Dot for Zdd {
    fn dot<W: Write>(&self, w: &mut W) -> std::io::Result<()> {
        w.write_all(HEADER.as_bytes())?;
        let core = self.core().borrow();
        let mut visited: HashSet<NodeId> = HashSet::default();
        let mut terminals: HashSet<u64> = HashSet::default();
        let root = self.root();
        write_terminal(w, root, &mut terminals)?;
        let mut stack = Vec::new();
        if let Some(id) = root.node_id() {
            stack.push(id);
        }
        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            let node = core.pool.node(id);
            let varid = core.varid(node.level()).unwrap();
            writeln!(w, "\"obj{}\" [shape=circle, label=\"x{}\"];", id, varid)?;
            for (tag, e) in [("0", node.low()), ("1", node.high())] {
                write_terminal(w, e, &mut terminals)?;
                writeln!(
                    w,
                    "\"obj{}\" -> \"{}\" [label=\"{}\"];",
                    id,
                    target_name(e),
                    tag
                )?;
                if let Some(chd) = e.node_id() {
                    stack.push(chd);
                }
            }
        }
        w.write_all(b"}\n")
    }
}
