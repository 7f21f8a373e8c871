pub mod frame;
pub mod renderer;

pub use frame::*;
pub use renderer::*;
