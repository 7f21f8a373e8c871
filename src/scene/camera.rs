use glam::{Mat4, Vec3, Vec4Swizzles};

/// A world point mapped to surface pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projected {
    pub x: f32,
    pub y: f32,
    /// Distance in front of the camera along its view axis
    pub depth: f32,
    /// Surface pixels covered by one world unit at this depth
    pub pixels_per_unit: f32,
}

/// Perspective camera looking at a fixed target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub fov_y_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(position: Vec3, target: Vec3, fov_y_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            position,
            target,
            fov_y_degrees,
            aspect,
            near,
            far,
        }
    }

    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }

    pub fn right(&self) -> Vec3 {
        self.forward().cross(Vec3::Y).normalize_or_zero()
    }

    pub fn up(&self) -> Vec3 {
        self.right().cross(self.forward())
    }

    /// Recompute projection for a new surface shape
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view()
    }

    /// Project a world point onto a `width` x `height` surface.
    /// Points behind the near plane yield `None`.
    pub fn project(&self, view_projection: &Mat4, point: Vec3, width: u32, height: u32) -> Option<Projected> {
        let clip = *view_projection * point.extend(1.0);
        if clip.w < self.near {
            return None;
        }
        let ndc = clip.xyz() / clip.w;
        let half_h = height as f32 * 0.5;
        let focal = half_h / (self.fov_y_degrees.to_radians() * 0.5).tan();

        Some(Projected {
            x: (ndc.x + 1.0) * 0.5 * width as f32,
            y: (1.0 - ndc.y) * half_h,
            depth: clip.w,
            pixels_per_unit: focal / clip.w,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backdrop_camera() -> Camera {
        Camera::new(Vec3::new(0.0, 3.0, 8.0), Vec3::new(0.0, 3.0, 0.0), 75.0, 1.0, 0.1, 1000.0)
    }

    #[test]
    fn target_projects_to_centre() {
        let camera = backdrop_camera();
        let vp = camera.view_projection();
        let p = camera.project(&vp, camera.target, 200, 100).unwrap();
        assert!((p.x - 100.0).abs() < 1e-3);
        assert!((p.y - 50.0).abs() < 1e-3);
        assert!((p.depth - 8.0).abs() < 1e-4);
    }

    #[test]
    fn points_behind_are_culled() {
        let camera = backdrop_camera();
        let vp = camera.view_projection();
        assert!(camera.project(&vp, Vec3::new(0.0, 3.0, 20.0), 100, 100).is_none());
    }

    #[test]
    fn higher_points_land_higher_on_screen() {
        let camera = backdrop_camera();
        let vp = camera.view_projection();
        let low = camera.project(&vp, Vec3::new(0.0, 1.0, 0.0), 100, 100).unwrap();
        let high = camera.project(&vp, Vec3::new(0.0, 5.0, 0.0), 100, 100).unwrap();
        assert!(high.y < low.y);
    }

    #[test]
    fn aspect_ignores_zero_area() {
        let mut camera = backdrop_camera();
        camera.set_aspect(1600, 900);
        assert!((camera.aspect - 16.0 / 9.0).abs() < 1e-6);
        camera.set_aspect(0, 900);
        assert!((camera.aspect - 16.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn basis_is_orthonormal() {
        let camera = backdrop_camera();
        assert!(camera.forward().dot(camera.right()).abs() < 1e-6);
        assert!((camera.up() - Vec3::Y).length() < 1e-6);
    }
}
