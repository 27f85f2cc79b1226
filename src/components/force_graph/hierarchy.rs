//! Flattening of a rooted tree into node and link lists.

use std::collections::VecDeque;

use super::types::{GraphData, GraphLink, GraphNode, TreeNode};

impl GraphData {
	/// Flatten `root` breadth-first.
	///
	/// Every entry gets its breadth-first index as identifier and the tree
	/// name as label. Links run parent to child and follow the node order,
	/// skipping the root.
	pub fn from_tree(root: &TreeNode) -> Self {
		let mut data = GraphData::default();
		let mut queue: VecDeque<(&TreeNode, usize, Option<usize>)> = VecDeque::new();
		queue.push_back((root, 0, None));

		while let Some((entry, depth, parent)) = queue.pop_front() {
			let index = data.nodes.len();
			data.nodes.push(GraphNode {
				id: index.to_string(),
				label: Some(entry.name.clone()),
				depth,
			});
			if let Some(parent) = parent {
				data.links.push(GraphLink {
					source: parent.to_string(),
					target: index.to_string(),
				});
			}
			for child in &entry.children {
				queue.push_back((child, depth + 1, Some(index)));
			}
		}

		data
	}
}
