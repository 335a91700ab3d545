use hashbrown::HashSet;

use super::alphabet::letter_str;
use super::graph::WordGraph;

/// Renders a trie or DAWG in GraphViz DOT format.
///
/// Word nodes are drawn as double circles and labeled with the number of words below
/// them. Edges carry their letter and the rank offset of the child (`+n`). Shared
/// nodes are emitted once.
pub fn to_dot(graph: &impl WordGraph) -> String {
    let mut out = String::from("digraph Dawg {\n  rankdir=TB;\n  node [shape=circle];\n");
    let mut visited = HashSet::new();
    let mut stack = vec![graph.root()];

    while let Some(id) = stack.pop() {
        if !visited.insert(id) {
            continue;
        }
        let node = graph.node(id);
        let shape = if node.is_word() { "shape=doublecircle " } else { "" };
        out.push_str(&format!(
            "  n{} [{shape}label=\"{}\"];\n",
            id.index(),
            node.words_under()
        ));
        for (position, (letter, child)) in node.children().enumerate() {
            out.push_str(&format!(
                "  n{} -> n{} [label=\"{} +{}\"];\n",
                id.index(),
                child.index(),
                letter_str(letter),
                node.child_offset(position).unwrap_or(0)
            ));
        }
        let children: Vec<_> = node.children().map(|(_, child)| child).collect();
        stack.extend(children.into_iter().rev());
    }
    out.push_str("}\n");
    out
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dawg::minimize::minimize;
    use crate::dawg::trie::build_trie;

    #[test]
    fn shared_nodes_are_emitted_once() {
        let dawg = minimize(&build_trie(["sea", "tea", "teapot"]));
        let dot = to_dot(&dawg);
        let node_lines = dot
            .lines()
            .filter(|l| l.contains("label=") && !l.contains("->"))
            .count();
        assert_eq!(node_lines, dawg.node_count());
        // "sea" and "teapot" end in the same leaf, which has two incoming edges.
        let edge_lines = dot.lines().filter(|l| l.contains("->")).count();
        assert_eq!(edge_lines, 9);
        assert!(dot.starts_with("digraph Dawg {"));
        assert!(dot.trim_end().ends_with('}'));
    }

    #[test]
    fn word_nodes_are_double_circles() {
        let dot = to_dot(&build_trie(["aaa"]));
        assert_eq!(dot.matches("doublecircle").count(), 1);
        assert!(dot.contains("[label=\"a +0\"]"));
    }
}
