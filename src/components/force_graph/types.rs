/// One entry of the input hierarchy.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TreeNode {
	/// Text shown on the node.
	pub name: String,
	/// Subtrees, in display order.
	pub children: Vec<TreeNode>,
}

impl TreeNode {
	/// A node without children.
	pub fn leaf(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			children: Vec::new(),
		}
	}

	/// A node with the given children, in display order.
	pub fn with_children(name: impl Into<String>, children: Vec<TreeNode>) -> Self {
		Self {
			name: name.into(),
			children,
		}
	}
}

/// A node of the flattened graph.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
	/// Unique within its [`GraphData`].
	pub id: String,
	/// Display text; renderers fall back to the id.
	pub label: Option<String>,
	/// Distance from the root of the source hierarchy.
	pub depth: usize,
}

/// A parent -> child edge, by node id.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphLink {
	/// Parent id.
	pub source: String,
	/// Child id.
	pub target: String,
}

/// Nodes and links ready to hand to the layout engine.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphData {
	/// Breadth-first order, root first.
	pub nodes: Vec<GraphNode>,
	/// One per non-root node.
	pub links: Vec<GraphLink>,
}
