//! Software render pass.
//!
//! Meshes are projected through the scene camera and painted back to front
//! onto a [`Canvas`]: spheres as shaded ellipses, cylinders as tapered
//! quads, planes as their projected corners. Lighting is one flat term per
//! primitive (ambient plus Lambert from each directional light), then
//! linear fog toward the environment fog color.

use glam::{Mat4, Vec3, Vec4Swizzles};

use crate::core::{Canvas, DrawOp};
use crate::error::Result;
use crate::math::Color;
use crate::scene::{Camera, DirectionalLight, Environment, Geometry, Material, MeshInstance, SceneGraph};
use crate::traits::{RenderPass, RenderSurface};

/// Share of a sphere's radius used for its highlight disc
const HIGHLIGHT_SCALE: f32 = 0.55;
/// How far the highlight is pushed toward the key light, in radii
const HIGHLIGHT_OFFSET: f32 = 0.3;

/// Keeps the last presented frame in memory. Used for headless runs.
#[derive(Debug, Default)]
pub struct OffscreenSurface {
    width: u32,
    height: u32,
    frame: Vec<u8>,
    presented: u64,
    released: bool,
}

impl OffscreenSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Pixels of the most recent frame, empty before the first present
    pub fn frame(&self) -> &[u8] {
        &self.frame
    }

    pub fn frames_presented(&self) -> u64 {
        self.presented
    }
}

impl RenderSurface for OffscreenSurface {
    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.width = width;
        self.height = height;
    }

    fn present(&mut self, canvas: &Canvas) -> Result<()> {
        if self.released {
            return Err(crate::error::SceneError::Surface("surface already released".into()));
        }
        self.frame.clear();
        self.frame.extend_from_slice(canvas.pixels());
        self.presented += 1;
        Ok(())
    }

    fn release(&mut self) {
        self.released = true;
        self.frame = Vec::new();
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

struct Primitive {
    depth: f32,
    op: DrawOp,
}

pub struct SoftwareRenderer {
    canvas: Canvas,
}

impl SoftwareRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            canvas: Canvas::new(width.max(1), height.max(1)),
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.canvas.resize(width, height);
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// Paint `scene` and return the finished canvas
    pub fn draw(&mut self, scene: &SceneGraph) -> &Canvas {
        let environment = scene.environment_snapshot();
        let (width, height) = self.canvas.dimensions();
        let view_projection = scene.camera.view_projection();

        let mut primitives: Vec<Primitive> = scene
            .meshes()
            .iter()
            .flat_map(|mesh| {
                rasterize(
                    mesh,
                    &scene.camera,
                    &view_projection,
                    &scene.lights,
                    &environment,
                    width,
                    height,
                )
            })
            .collect();
        // farthest first
        primitives.sort_by(|a, b| b.depth.total_cmp(&a.depth));

        let [r, g, b] = environment.background.to_rgb8();
        self.canvas.push(DrawOp::Clear(r, g, b, 255));
        for primitive in primitives {
            self.canvas.push(primitive.op);
        }
        self.canvas.flush();
        &self.canvas
    }
}

/// Flat shade of `material` for a surface facing `normal`
pub fn shade(material: &Material, normal: Vec3, lights: &[DirectionalLight], environment: &Environment) -> Color {
    if !material.lit {
        return material.color;
    }
    let ambient = environment.ambient.color.scale(environment.ambient.intensity);
    let mut light = (ambient.r, ambient.g, ambient.b);
    for sun in lights {
        let lambert = normal.dot(sun.direction()).max(0.0) * sun.intensity;
        light.0 += sun.color.r * lambert;
        light.1 += sun.color.g * lambert;
        light.2 += sun.color.b * lambert;
    }
    material.color.modulate(Color::new(light.0, light.1, light.2))
}

fn fogged(color: Color, depth: f32, environment: &Environment) -> Color {
    color.lerp(environment.fog.color, environment.fog.factor(depth))
}

fn rasterize(
    mesh: &MeshInstance<'_>,
    camera: &Camera,
    view_projection: &Mat4,
    lights: &[DirectionalLight],
    environment: &Environment,
    width: u32,
    height: u32,
) -> Vec<Primitive> {
    let centre = mesh.world.w_axis.xyz();
    let Some(projected) = camera.project(view_projection, centre, width, height) else {
        return Vec::new();
    };
    let towards_camera = (camera.position - centre).normalize_or_zero();
    let alpha = mesh.material.opacity;

    match *mesh.geometry {
        Geometry::Sphere { radius, .. } => {
            let rx = radius * mesh.world.x_axis.xyz().length() * projected.pixels_per_unit;
            let ry = radius * mesh.world.y_axis.xyz().length() * projected.pixels_per_unit;
            let base = fogged(
                shade(mesh.material, towards_camera, lights, environment),
                projected.depth,
                environment,
            );
            let mut out = vec![Primitive {
                depth: projected.depth,
                op: DrawOp::ellipse(projected.x, projected.y, rx, ry, base.to_rgba8(alpha)),
            }];

            // smooth materials get a lit cap offset toward the key light
            if !mesh.material.flat_shading {
                if let Some(key) = lights.first() {
                    let lit_normal = (towards_camera + key.direction()).normalize_or_zero();
                    let cap = fogged(shade(mesh.material, lit_normal, lights, environment), projected.depth, environment);
                    let screen = Vec3::new(key.direction().dot(camera.right()), -key.direction().dot(camera.up()), 0.0);
                    out.push(Primitive {
                        depth: projected.depth - 1e-4,
                        op: DrawOp::ellipse(
                            projected.x + screen.x * rx * HIGHLIGHT_OFFSET,
                            projected.y + screen.y * ry * HIGHLIGHT_OFFSET,
                            rx * HIGHLIGHT_SCALE,
                            ry * HIGHLIGHT_SCALE,
                            cap.to_rgba8(alpha),
                        ),
                    });
                }
            }
            out
        }
        Geometry::Cylinder {
            radius_top,
            radius_bottom,
            height: length,
            ..
        } => {
            let up = mesh.world.y_axis.xyz();
            let top = camera.project(view_projection, centre + up * (length * 0.5), width, height);
            let bottom = camera.project(view_projection, centre - up * (length * 0.5), width, height);
            let (Some(top), Some(bottom)) = (top, bottom) else {
                return Vec::new();
            };
            let side = mesh.world.x_axis.xyz().length();
            let rt = radius_top * side * top.pixels_per_unit;
            let rb = radius_bottom * side * bottom.pixels_per_unit;
            let color = fogged(
                shade(mesh.material, towards_camera, lights, environment),
                projected.depth,
                environment,
            );
            vec![Primitive {
                depth: projected.depth,
                op: DrawOp::polygon(
                    vec![(top.x - rt, top.y), (top.x + rt, top.y), (bottom.x + rb, bottom.y), (bottom.x - rb, bottom.y)],
                    color.to_rgba8(alpha),
                ),
            }]
        }
        Geometry::Plane { width: w, height: h } => {
            let corners = [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)];
            let points: Option<Vec<(f32, f32)>> = corners
                .iter()
                .map(|&(u, v)| {
                    let world = mesh.world.transform_point3(Vec3::new(u * w, v * h, 0.0));
                    camera
                        .project(view_projection, world, width, height)
                        .map(|p| (p.x, p.y))
                })
                .collect();
            let Some(points) = points else {
                return Vec::new();
            };
            let normal = mesh.world.z_axis.xyz().normalize_or_zero();
            // double-sided: light whichever face points at the camera
            let normal = if mesh.material.double_sided && normal.dot(towards_camera) < 0.0 {
                -normal
            } else {
                normal
            };
            let color = fogged(shade(mesh.material, normal, lights, environment), projected.depth, environment);
            vec![Primitive {
                depth: projected.depth,
                op: DrawOp::polygon(points, color.to_rgba8(alpha)),
            }]
        }
    }
}

/// Software renderer feeding a [`RenderSurface`]
pub struct Presenter {
    renderer: SoftwareRenderer,
    surface: Box<dyn RenderSurface>,
}

impl Presenter {
    pub fn new(surface: Box<dyn RenderSurface>) -> Self {
        let (width, height) = surface.dimensions();
        Self {
            renderer: SoftwareRenderer::new(width, height),
            surface,
        }
    }

    pub fn canvas(&self) -> &Canvas {
        self.renderer.canvas()
    }
}

impl RenderPass for Presenter {
    fn render(&mut self, scene: &SceneGraph) -> Result<()> {
        let canvas = self.renderer.draw(scene);
        self.surface.present(canvas)
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.renderer.resize(width, height);
        self.surface.resize(width, height);
    }

    fn release(&mut self) {
        self.surface.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{AmbientLight, Fog, Transform};

    fn scene(background: u32) -> SceneGraph {
        let camera = Camera::new(Vec3::new(0.0, 3.0, 8.0), Vec3::new(0.0, 3.0, 0.0), 75.0, 1.0, 0.1, 1000.0);
        SceneGraph::new(
            camera,
            Environment {
                background: Color::from_hex(background),
                fog: Fog {
                    color: Color::from_hex(background),
                    near: 20.0,
                    far: 50.0,
                },
                ambient: AmbientLight {
                    color: Color::WHITE,
                    intensity: 0.6,
                },
            },
        )
    }

    #[test]
    fn empty_scene_is_background() {
        let scene = scene(0x1a1a1a);
        let mut renderer = SoftwareRenderer::new(16, 16);
        let canvas = renderer.draw(&scene);
        assert_eq!(canvas.pixel(8, 8), Some([0x1a, 0x1a, 0x1a, 255]));
    }

    #[test]
    fn nearer_sphere_wins() {
        let mut scene = scene(0x000000);
        let root = scene.root();
        let sphere = scene.add_geometry(Geometry::Sphere { radius: 1.0, segments: 8 });
        let red = scene.add_material(Material::basic(Color::from_hex(0xff0000)));
        let green = scene.add_material(Material::basic(Color::from_hex(0x00ff00)));
        // added near first so submission order alone would paint it under
        scene.add_mesh(root, "near", sphere, green, Transform::from_position(Vec3::new(0.0, 3.0, 2.0)));
        scene.add_mesh(root, "far", sphere, red, Transform::from_position(Vec3::new(0.0, 3.0, -2.0)));

        let mut renderer = SoftwareRenderer::new(64, 64);
        let canvas = renderer.draw(&scene);
        assert_eq!(canvas.pixel(32, 32), Some([0, 255, 0, 255]));
    }

    #[test]
    fn unlit_material_ignores_lights() {
        let environment = Environment {
            background: Color::BLACK,
            fog: Fog {
                color: Color::BLACK,
                near: 20.0,
                far: 50.0,
            },
            ambient: AmbientLight {
                color: Color::WHITE,
                intensity: 0.0,
            },
        };
        let leaf = Material::basic(Color::from_hex(0xff9800));
        assert_eq!(shade(&leaf, Vec3::Z, &[], &environment), leaf.color);

        let bark = Material::lit(Color::WHITE);
        let sun = DirectionalLight::new(Color::WHITE, 0.8, Vec3::new(0.0, 0.0, 10.0));
        let lit = shade(&bark, Vec3::Z, &[sun], &environment);
        assert!((lit.r - 0.8).abs() < 1e-6);
        let unlit = shade(&bark, -Vec3::Z, &[sun], &environment);
        assert_eq!(unlit, Color::BLACK);
    }

    #[test]
    fn presenter_pushes_frames_to_surface() {
        let scene = scene(0xf1f8e9);
        let mut presenter = Presenter::new(Box::new(OffscreenSurface::new(8, 8)));
        presenter.render(&scene).unwrap();
        presenter.render(&scene).unwrap();
        assert_eq!(presenter.canvas().pixel(0, 0), Some([0xf1, 0xf8, 0xe9, 255]));

        presenter.release();
        assert!(presenter.render(&scene).is_err());
    }

    #[test]
    fn offscreen_ignores_zero_resize() {
        let mut surface = OffscreenSurface::new(10, 10);
        surface.resize(0, 5);
        assert_eq!(surface.dimensions(), (10, 10));
        surface.present(&Canvas::new(10, 10)).unwrap();
        assert_eq!(surface.frames_presented(), 1);
        assert_eq!(surface.frame().len(), 400);
    }
}
