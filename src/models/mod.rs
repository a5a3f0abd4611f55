pub mod cart;
pub mod post;
pub mod product;

pub use cart::*;
pub use post::*;
pub use product::*;
