//! Depth-bounded size trees for assets and files.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// A named node with a size and nested children.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TreeNode {
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn leaf(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
            children: Vec::new(),
        }
    }

    pub fn branch(name: impl Into<String>, children: Vec<TreeNode>) -> Self {
        let size = children.iter().map(|c| c.size).sum();
        Self {
            name: name.into(),
            size,
            children,
        }
    }

    /// Render this node with `depth` levels of children below it.
    pub fn render(&self, depth: u32) -> Value {
        let mut node = json!({
            "name": self.name,
            "size": self.size,
            "childCount": self.children.len(),
        });
        if depth > 0 && !self.children.is_empty() {
            node["children"] = render_level(&self.children, depth - 1);
        }
        node
    }
}

/// Render a list of sibling nodes, each expanded `depth` levels.
pub fn render_level(nodes: &[TreeNode], depth: u32) -> Value {
    Value::Array(nodes.iter().map(|n| n.render(depth)).collect())
}

/// Walk `path` by child name and render what it addresses. An empty path
/// renders the top level itself.
pub fn render_path(roots: &[TreeNode], path: &[&str], depth: u32) -> Option<Value> {
    let Some((first, rest)) = path.split_first() else {
        return Some(render_level(roots, depth));
    };
    let mut node = roots.iter().find(|n| n.name == *first)?;
    for name in rest {
        node = node.children.iter().find(|n| n.name == *name)?;
    }
    Some(node.render(depth))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<TreeNode> {
        vec![
            TreeNode::branch(
                "Textures",
                vec![
                    TreeNode::branch("UI", vec![TreeNode::leaf("button.png", 10)]),
                    TreeNode::leaf("sky.png", 90),
                ],
            ),
            TreeNode::leaf("Audio", 5),
        ]
    }

    #[test]
    fn depth_zero_shows_only_the_addressed_level() {
        let value = render_path(&sample(), &[], 0).unwrap();
        assert_eq!(
            value,
            json!([
                {"name": "Textures", "size": 100, "childCount": 2},
                {"name": "Audio", "size": 5, "childCount": 0},
            ])
        );
    }

    #[test]
    fn depth_expands_levels() {
        let value = render_path(&sample(), &["Textures"], 1).unwrap();
        assert_eq!(value["childCount"], 2);
        assert_eq!(value["children"][0]["name"], "UI");
        assert!(value["children"][0].get("children").is_none());

        let value = render_path(&sample(), &["Textures"], 2).unwrap();
        assert_eq!(value["children"][0]["children"][0]["name"], "button.png");
    }

    #[test]
    fn nested_and_missing_paths() {
        let value = render_path(&sample(), &["Textures", "UI"], 0).unwrap();
        assert_eq!(value["size"], 10);
        assert!(render_path(&sample(), &["Textures", "Fonts"], 0).is_none());
        assert!(render_path(&sample(), &["Missing"], 3).is_none());
    }
}
