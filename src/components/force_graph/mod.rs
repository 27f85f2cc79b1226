//! Hierarchy layout: the force engine, the loop that drives it, and the
//! canvas component on top.

mod component;
pub mod config;
mod error;
pub mod forces;
mod hierarchy;
pub mod interaction;
mod render;
mod simulation;
mod state;
mod types;

pub use component::ForceGraphCanvas;
pub use error::{LayoutError, Result};
pub use interaction::{Frame, InteractionLoop, LinkFrame, LoopState, NodeFrame, RenderSink, Tick};
pub use render::CanvasSink;
pub use simulation::{Link, Node, Simulation, Snapshot};
pub use types::{GraphData, GraphLink, GraphNode, TreeNode};
