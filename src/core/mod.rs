pub mod canvas;
pub mod clock;
pub mod input_adapter;
pub mod surface_renderer;
pub mod viewport;

pub use canvas::{Canvas, DrawOp};
pub use clock::Clock;
pub use input_adapter::WinitPointerAdapter;
pub use surface_renderer::SurfaceRenderer;
pub use viewport::{SurfaceLayout, Viewport};
