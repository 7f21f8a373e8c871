use crate::core::Canvas;
use crate::error::Result;
use crate::scene::SceneGraph;

/// Destination the finished frame is presented to
pub trait RenderSurface {
    /// Resize backing storage; zero-area sizes are ignored
    fn resize(&mut self, width: u32, height: u32);

    /// Present a finished canvas
    fn present(&mut self, canvas: &Canvas) -> Result<()>;

    /// Release GPU or host resources. Called once on teardown.
    fn release(&mut self);

    fn dimensions(&self) -> (u32, u32);
}

/// One render of the scene per animation tick
pub trait RenderPass {
    fn render(&mut self, scene: &SceneGraph) -> Result<()>;

    /// Viewport changed
    fn resize(&mut self, width: u32, height: u32);

    fn release(&mut self);
}
