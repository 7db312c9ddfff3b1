mod common;

use common::sample_analysis_json;
use textbook_scanner::mind_map::{outline, render, rows};
use textbook_scanner::{MindMapNode, validate_analysis_value};

fn sample_tree() -> MindMapNode {
    MindMapNode::branch(
        "A",
        vec![
            MindMapNode::leaf("B"),
            MindMapNode::branch("C", vec![MindMapNode::leaf("D")]),
        ],
    )
}

#[test]
fn test_pre_order_with_depths() {
    let tree = sample_tree();
    let visited: Vec<(&str, usize)> = render(&tree)
        .unwrap()
        .into_iter()
        .map(|r| (r.node.label.as_str(), r.depth))
        .collect();

    assert_eq!(visited, vec![("A", 0), ("B", 1), ("C", 1), ("D", 2)]);
}

fn count_nodes(node: &MindMapNode) -> usize {
    1 + node.children.iter().map(count_nodes).sum::<usize>()
}

#[test]
fn test_every_node_visited_once_with_ancestor_depth() {
    let result = validate_analysis_value(sample_analysis_json()).unwrap();
    let rendered = render(&result.mind_map).unwrap();

    assert_eq!(rendered.len(), count_nodes(&result.mind_map));

    // In pre-order, a node's parent is the closest earlier node one level up.
    for (i, r) in rendered.iter().enumerate().skip(1) {
        let parent = rendered[..i]
            .iter()
            .rev()
            .find(|p| p.depth + 1 == r.depth)
            .expect("every non-root node has a parent");
        assert!(parent.node.children.iter().any(|c| std::ptr::eq(c, r.node)));
    }
}

#[test]
fn test_wide_tree_terminates() {
    let children: Vec<MindMapNode> = (0..500)
        .map(|i| MindMapNode::leaf(&format!("leaf {}", i)))
        .collect();
    let tree = MindMapNode::branch("root", children);

    let rendered = render(&tree).unwrap();
    assert_eq!(rendered.len(), 501);
    assert!(rendered.iter().skip(1).all(|r| r.depth == 1));
    assert_eq!(rendered[1].node.label, "leaf 0");
    assert_eq!(rendered[500].node.label, "leaf 499");
}

#[test]
fn test_rows_mark_root() {
    let rows = rows(&sample_tree()).unwrap();
    assert!(rows[0].is_root);
    assert!(rows[1..].iter().all(|r| !r.is_root));
    assert_eq!(rows[3].label, "D");
    assert_eq!(rows[3].depth, 2);
}

#[test]
fn test_outline_text() {
    assert_eq!(outline(&sample_tree()).unwrap(), "- A\n  - B\n  - C\n    - D");
}
