/// Errors raised while building a layout.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum LayoutError {
	/// A link names a node that is not part of the node set.
	#[error("link #{link} references unknown node `{id}`")]
	InvalidTopology {
		/// Position of the offending link in the input.
		link: usize,
		/// The id that did not resolve.
		id: String,
	},
}

/// Result alias for layout operations.
pub type Result<T> = std::result::Result<T, LayoutError>;
