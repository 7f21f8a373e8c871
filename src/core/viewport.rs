/// Viewport - backdrop dimensions in physical pixels plus the device
/// pixel ratio they were derived from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Width in physical pixels
    pub width: u32,
    /// Height in physical pixels
    pub height: u32,
    pub scale_factor: f64,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            scale_factor: 1.0,
        }
    }

    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width over height; 1.0 for an empty viewport
    pub fn aspect(&self) -> f32 {
        if self.is_empty() {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    /// Total number of pixels
    pub fn pixel_count(&self) -> usize {
        (self.width * self.height) as usize
    }

    /// Total size in bytes for RGBA buffer
    pub fn buffer_size(&self) -> usize {
        self.pixel_count() * 4
    }
}

/// How the backdrop surface sits in its host: full viewport, behind
/// content, taking pointer input only when drag rotation is on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceLayout {
    pub z_index: i32,
    pub captures_pointer: bool,
}

impl SurfaceLayout {
    pub fn backdrop(drag_enabled: bool) -> Self {
        Self {
            z_index: -1,
            captures_pointer: drag_enabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_creates_viewport_with_dimensions() {
        let vp = Viewport::new(1920, 1080);
        assert_eq!(vp.width, 1920);
        assert_eq!(vp.height, 1080);
        assert_eq!(vp.scale_factor, 1.0);
    }

    #[test]
    fn test_buffer_size_rgba() {
        let vp = Viewport::new(100, 100);
        // 100x100 pixels * 4 bytes per pixel (RGBA)
        assert_eq!(vp.buffer_size(), 40000);
    }

    #[test]
    fn test_aspect() {
        assert!((Viewport::new(1280, 720).aspect() - 16.0 / 9.0).abs() < 1e-6);
        assert_eq!(Viewport::new(0, 720).aspect(), 1.0);
        assert!(Viewport::new(640, 0).is_empty());
    }

    #[test]
    fn test_backdrop_layout() {
        assert_eq!(SurfaceLayout::backdrop(true).z_index, -1);
        assert!(SurfaceLayout::backdrop(true).captures_pointer);
        assert!(!SurfaceLayout::backdrop(false).captures_pointer);
    }
}
