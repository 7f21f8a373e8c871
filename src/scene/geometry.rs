use crate::math::Color;

/// Primitive shapes the tree and leaves are assembled from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Geometry {
    /// Upright cylinder centred on its local origin
    Cylinder {
        radius_top: f32,
        radius_bottom: f32,
        height: f32,
        radial_segments: u32,
    },
    Sphere {
        radius: f32,
        segments: u32,
    },
    /// Flat quad in the local XY plane
    Plane { width: f32, height: f32 },
}

/// Surface appearance of a mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub color: Color,
    pub opacity: f32,
    /// Lit by scene lights; unlit materials ignore lighting
    pub lit: bool,
    pub double_sided: bool,
    pub flat_shading: bool,
    pub shininess: f32,
}

impl Material {
    /// Phong-style lit material
    pub fn lit(color: Color) -> Self {
        Self {
            color,
            opacity: 1.0,
            lit: true,
            double_sided: false,
            flat_shading: false,
            shininess: 30.0,
        }
    }

    /// Unlit material, as used by the falling leaves
    pub fn basic(color: Color) -> Self {
        Self {
            lit: false,
            ..Self::lit(color)
        }
    }

    pub fn flat(mut self) -> Self {
        self.flat_shading = true;
        self
    }

    pub fn shininess(mut self, shininess: f32) -> Self {
        self.shininess = shininess;
        self
    }

    pub fn translucent(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn double_sided(mut self) -> Self {
        self.double_sided = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_material_is_unlit() {
        let m = Material::basic(Color::WHITE).translucent(0.8).double_sided();
        assert!(!m.lit);
        assert!(m.double_sided);
        assert_eq!(m.opacity, 0.8);
    }
}
