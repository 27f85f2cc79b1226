use leptos::prelude::*;

use crate::components::force_graph::{ForceGraphCanvas, TreeNode};

/// A small genre -> band hierarchy to lay out.
fn sample_tree() -> TreeNode {
	let genre = |name: &str, bands: &[&str]| {
		TreeNode::with_children(name, bands.iter().copied().map(TreeNode::leaf).collect())
	};
	TreeNode::with_children(
		"Music",
		vec![
			genre("Grunge", &["Nirvana", "Soundgarden", "Alice in Chains"]),
			genre("Punk", &["Ramones", "The Clash"]),
			TreeNode::with_children(
				"Metal",
				vec![
					genre("Thrash", &["Metallica", "Slayer"]),
					genre("Doom", &["Black Sabbath"]),
				],
			),
			TreeNode::leaf("Jazz"),
		],
	)
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let tree = Signal::derive(sample_tree);

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-graph">
				<ForceGraphCanvas data=tree fullscreen=true />
				<div class="graph-overlay">
					<h1>"Force-Directed Hierarchy"</h1>
					<p class="subtitle">
						"Move the pointer to steer. Drag nodes to reposition. Click to enlarge, double-click to shrink."
					</p>
				</div>
			</div>
		</ErrorBoundary>
	}
}
