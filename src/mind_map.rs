use thiserror::Error;

use crate::models::{MindMapNode, MindMapRow};

/// Traversal stops and fails once a node sits deeper than this.
pub const MAX_RENDER_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MindMapError {
    #[error("Mind map is deeper than {0} levels")]
    TooDeep(usize),
}

/// A node paired with its distance from the root.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderedNode<'a> {
    pub node: &'a MindMapNode,
    pub depth: usize,
}

impl RenderedNode<'_> {
    pub fn is_root(&self) -> bool {
        self.depth == 0
    }
}

/// Pre-order traversal of the tree. Uses an explicit stack, so the call
/// stack does not grow with the tree.
pub fn render(root: &MindMapNode) -> Result<Vec<RenderedNode<'_>>, MindMapError> {
    render_with_limit(root, MAX_RENDER_DEPTH)
}

pub fn render_with_limit(
    root: &MindMapNode,
    max_depth: usize,
) -> Result<Vec<RenderedNode<'_>>, MindMapError> {
    let mut rendered = Vec::new();
    let mut stack = vec![(root, 0usize)];

    while let Some((node, depth)) = stack.pop() {
        if depth > max_depth {
            return Err(MindMapError::TooDeep(max_depth));
        }
        rendered.push(RenderedNode { node, depth });

        // Reverse so the first child is visited first.
        for child in node.children.iter().rev() {
            stack.push((child, depth + 1));
        }
    }

    Ok(rendered)
}

pub fn rows(root: &MindMapNode) -> Result<Vec<MindMapRow>, MindMapError> {
    Ok(render(root)?
        .into_iter()
        .map(|r| MindMapRow {
            id: r.node.id.clone(),
            label: r.node.label.clone(),
            depth: r.depth,
            is_root: r.is_root(),
        })
        .collect())
}

/// Indented plain-text outline, two spaces per level.
pub fn outline(root: &MindMapNode) -> Result<String, MindMapError> {
    let lines: Vec<String> = render(root)?
        .into_iter()
        .map(|r| format!("{}- {}", "  ".repeat(r.depth), r.node.label))
        .collect();
    Ok(lines.join("\n"))
}
