use asmview_index::TypeIndex;
use std::collections::HashSet;
use std::fmt::Write;

/// Every root with its derived types indented below it.
pub fn render_tree(index: &TypeIndex) -> String {
    let mut out = String::new();
    let mut seen = HashSet::new();
    // (type, depth); children are pushed in reverse to print in link order
    let mut stack: Vec<_> = index.roots().map(|root| (root.id, 0usize)).collect();
    stack.reverse();

    while let Some((id, depth)) = stack.pop() {
        let Some(node) = index.get(id) else {
            continue;
        };
        if !seen.insert(id) {
            continue;
        }
        let _ = writeln!(
            out,
            "{}{} ({}, {} descendants)",
            "  ".repeat(depth),
            node.full_name,
            node.kind,
            node.descendant_count()
        );
        stack.extend(node.derived_types().iter().rev().map(|child| (*child, depth + 1)));
    }
    out
}
