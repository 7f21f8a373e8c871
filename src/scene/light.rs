use glam::Vec3;

use crate::math::Color;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: Color,
    pub intensity: f32,
}

/// Light arriving from `position` towards the origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub color: Color,
    pub intensity: f32,
    pub position: Vec3,
}

impl DirectionalLight {
    pub fn new(color: Color, intensity: f32, position: Vec3) -> Self {
        Self {
            color,
            intensity,
            position,
        }
    }

    /// Unit vector pointing from a surface towards the light
    pub fn direction(&self) -> Vec3 {
        self.position.normalize_or_zero()
    }
}

/// Linear distance fog.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fog {
    pub color: Color,
    pub near: f32,
    pub far: f32,
}

impl Fog {
    /// Blend factor in `[0, 1]` for a fragment at `depth`
    pub fn factor(&self, depth: f32) -> f32 {
        if self.far <= self.near {
            return if depth >= self.far { 1.0 } else { 0.0 };
        }
        ((depth - self.near) / (self.far - self.near)).clamp(0.0, 1.0)
    }
}

/// Theme-dependent scene state: background, fog and ambient light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Environment {
    pub background: Color,
    pub fog: Fog,
    pub ambient: AmbientLight,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fog_is_linear_between_bounds() {
        let fog = Fog {
            color: Color::BLACK,
            near: 20.0,
            far: 50.0,
        };
        assert_eq!(fog.factor(8.0), 0.0);
        assert!((fog.factor(35.0) - 0.5).abs() < 1e-6);
        assert_eq!(fog.factor(80.0), 1.0);
    }

    #[test]
    fn directional_light_points_at_source() {
        let sun = DirectionalLight::new(Color::WHITE, 0.8, Vec3::new(5.0, 10.0, 5.0));
        assert!(sun.direction().y > 0.8);
        assert!((sun.direction().length() - 1.0).abs() < 1e-6);
    }
}
