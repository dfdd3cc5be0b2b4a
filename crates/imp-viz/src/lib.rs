//! # imp-viz
//!
//! Renders a parsed imp pipeline as a Graphviz DOT document.
//!
//! The renderer only reads the tree: node kind, name, optional scalar value,
//! and ordered children via [`NodeRef`]. Output is deterministic for a given
//! AST, so diagrams are diff- and snapshot-friendly.
//!
//! ```rust
//! use imp_syntax::parse_strict;
//! use imp_viz::render_dot;
//!
//! let program = parse_strict(r#"imp --target="in.png" crop --x=10 -> bw"#).unwrap();
//! let dot = render_dot(&program);
//! assert!(dot.starts_with("digraph pipeline {"));
//! ```

use imp_syntax::ast::{NodeRef, StartCommand};

/// Renders the whole program as a DOT digraph, one box per AST node, edges
/// parent to child in child order.
pub fn render_dot(program: &StartCommand) -> String {
    let mut out = String::new();
    out.push_str("digraph pipeline {\n");
    out.push_str("    node [shape=box, fontname=\"Helvetica\"];\n");

    let mut next_id = 0;
    emit(NodeRef::Start(program), None, &mut out, &mut next_id);

    out.push_str("}\n");
    out
}

fn emit(node: NodeRef<'_>, parent: Option<usize>, out: &mut String, next_id: &mut usize) {
    let id = *next_id;
    *next_id += 1;

    let mut label = format!("{}: {}", node.kind(), escape(node.name()));
    if let Some(value) = node.value() {
        label.push_str("\\nvalue: ");
        label.push_str(&escape(&value));
    }
    out.push_str(&format!("    n{} [label=\"{}\"];\n", id, label));

    if let Some(parent_id) = parent {
        out.push_str(&format!("    n{} -> n{};\n", parent_id, id));
    }

    for child in node.children() {
        emit(child, Some(id), out, next_id);
    }
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use imp_syntax::parse_strict;

    fn program() -> StartCommand {
        parse_strict(r#"imp --target="in.png" crop --x=10 --y=20 -> bw"#).unwrap()
    }

    #[test]
    fn test_one_box_per_node() {
        let dot = render_dot(&program());

        // StartCommand, TargetFlag, crop, two flags, bw
        assert_eq!(dot.matches("[label=").count(), 6);
        assert_eq!(dot.matches(" -> n").count(), 5);
    }

    #[test]
    fn test_labels_carry_kind_name_and_value() {
        let dot = render_dot(&program());

        assert!(dot.contains("StartCommand: imp"));
        assert!(dot.contains("TargetFlag: target\\nvalue: in.png"));
        assert!(dot.contains("Command: crop"));
        assert!(dot.contains("Flag: x\\nvalue: 10"));
        assert!(dot.contains("Command: bw"));
    }

    #[test]
    fn test_deterministic_output() {
        let program = program();

        assert_eq!(render_dot(&program), render_dot(&program));
    }

    #[test]
    fn test_quotes_in_values_are_escaped() {
        let program = parse_strict(r#"imp --target="in.png" convert --format="png""#).unwrap();
        let dot = render_dot(&program);

        assert!(dot.contains("Flag: format\\nvalue: \\\"png\\\""));
    }

    #[test]
    fn test_windows_paths_are_escaped() {
        let program = parse_strict(r#"imp --target="C:\imgs\in.png" bw"#).unwrap();
        let dot = render_dot(&program);

        assert!(dot.contains(r"C:\\imgs\\in.png"));
    }
}
