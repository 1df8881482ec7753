pub mod item;
pub mod tree;

pub use item::*;
pub use tree::*;
