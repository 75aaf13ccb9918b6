mod arena;
mod handle;
mod node;

pub(crate) use arena::Arena;
pub(crate) use handle::Handle;
pub use node::Color;
pub(crate) use node::{Node, Side};
