//! Procedural tree: trunk, bark bumps and a layered foliage crown.
//!
//! [`TreeBuilder::build`] registers every piece into the [`SceneGraph`] and
//! returns a [`TreeHandle`] holding node ids plus the per-layer and
//! per-cluster animation data the frame loop needs.

use std::f32::consts::TAU;

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{ensure_non_negative, ensure_ordered, ensure_phase, Result, SceneError};
use crate::math::Color;
use crate::particles::Range;
use crate::scene::{Geometry, Material, NodeId, SceneGraph, Transform};

/// Vertical amplitude of crown breathing, world units
pub const BREATHING_AMPLITUDE: f32 = 0.1;
/// Angular rate of crown breathing, rad/s
pub const BREATHING_RATE: f32 = 0.5;
/// Horizontal sway radius of leaf clusters
pub const CLUSTER_SWAY_AMPLITUDE: f32 = 0.2;
pub const CROWN_YAW_RATE: f32 = 0.2;
pub const CROWN_YAW_AMPLITUDE: f32 = 0.05;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrunkProfile {
    pub top_radius: f32,
    pub bottom_radius: f32,
    pub height: f32,
    pub radial_segments: u32,
    pub color: Color,
}

impl Default for TrunkProfile {
    fn default() -> Self {
        Self {
            top_radius: 0.3,
            bottom_radius: 0.4,
            height: 4.0,
            radial_segments: 16,
            color: Color::from_hex(0x4a3527),
        }
    }
}

/// Bark bumps scattered over the trunk's lateral surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BarkProfile {
    pub count: usize,
    pub radius: f32,
    pub color: Color,
    pub min_height: f32,
    pub max_height: f32,
    /// Radial growth per unit of distance below the trunk top
    pub taper: f32,
    pub scale: Vec3,
}

impl Default for BarkProfile {
    fn default() -> Self {
        Self {
            count: 15,
            radius: 0.08,
            color: Color::from_hex(0x3d2817),
            min_height: 0.3,
            max_height: 3.8,
            taper: 0.015,
            scale: Vec3::new(1.0, 0.5, 0.8),
        }
    }
}

/// One spherical shell of the crown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrownLayer {
    pub radius: f32,
    pub base_height: f32,
    pub color: Color,
    /// Breathing phase; drawn at random when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<f32>,
}

impl CrownLayer {
    pub fn new(radius: f32, base_height: f32, color: Color) -> Self {
        Self {
            radius,
            base_height,
            color,
            phase: None,
        }
    }
}

/// Leaf clusters dotted over the crown surface.
///
/// Each cluster draws `f ~ U[0, 1]` and sits on a ring of radius
/// `base_radius + radius_spread * f` at height `base_height + height_spread * f`,
/// so the ring widens as it climbs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterProfile {
    pub count: usize,
    pub radius: f32,
    pub palette: Vec<Color>,
    pub base_radius: f32,
    pub radius_spread: f32,
    pub base_height: f32,
    pub height_spread: f32,
    pub min_sway_speed: f32,
    pub max_sway_speed: f32,
}

impl Default for ClusterProfile {
    fn default() -> Self {
        Self {
            count: 40,
            radius: 0.2,
            palette: vec![
                Color::from_hex(0x2d5016),
                Color::from_hex(0x3a6b1f),
                Color::from_hex(0x4a8229),
            ],
            base_radius: 1.3,
            radius_spread: 0.8,
            base_height: 3.8,
            height_spread: 1.8,
            min_sway_speed: 0.5,
            max_sway_speed: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeProfile {
    pub trunk: TrunkProfile,
    pub bark: BarkProfile,
    pub layers: Vec<CrownLayer>,
    pub clusters: ClusterProfile,
}

impl Default for TreeProfile {
    fn default() -> Self {
        Self {
            trunk: TrunkProfile::default(),
            bark: BarkProfile::default(),
            layers: vec![
                CrownLayer::new(1.5, 3.8, Color::from_hex(0x2d5016)),
                CrownLayer::new(1.7, 4.2, Color::from_hex(0x3a6b1f)),
                CrownLayer::new(1.6, 4.6, Color::from_hex(0x4a8229)),
                CrownLayer::new(1.3, 5.0, Color::from_hex(0x3a6b1f)),
                CrownLayer::new(1.0, 5.3, Color::from_hex(0x2d5016)),
            ],
            clusters: ClusterProfile::default(),
        }
    }
}

impl TreeProfile {
    pub fn validate(&self) -> Result<()> {
        let trunk = &self.trunk;
        ensure_non_negative("trunk.top_radius", trunk.top_radius)?;
        ensure_non_negative("trunk.bottom_radius", trunk.bottom_radius)?;
        ensure_non_negative("trunk.height", trunk.height)?;

        let bark = &self.bark;
        ensure_non_negative("bark.radius", bark.radius)?;
        ensure_non_negative("bark.min_height", bark.min_height)?;
        ensure_non_negative("bark.taper", bark.taper)?;
        ensure_ordered("bark.height", bark.min_height, bark.max_height)?;
        if bark.max_height > trunk.height {
            return Err(SceneError::invalid(
                "bark.max_height",
                format!("{} exceeds trunk height {}", bark.max_height, trunk.height),
            ));
        }

        for (i, layer) in self.layers.iter().enumerate() {
            ensure_non_negative(&format!("layers[{i}].radius"), layer.radius)?;
            ensure_non_negative(&format!("layers[{i}].base_height"), layer.base_height)?;
            if let Some(phase) = layer.phase {
                ensure_phase(&format!("layers[{i}].phase"), phase)?;
            }
        }

        let clusters = &self.clusters;
        ensure_non_negative("clusters.radius", clusters.radius)?;
        ensure_non_negative("clusters.base_radius", clusters.base_radius)?;
        ensure_non_negative("clusters.radius_spread", clusters.radius_spread)?;
        ensure_non_negative("clusters.base_height", clusters.base_height)?;
        ensure_non_negative("clusters.height_spread", clusters.height_spread)?;
        ensure_non_negative("clusters.min_sway_speed", clusters.min_sway_speed)?;
        ensure_ordered("clusters.sway_speed", clusters.min_sway_speed, clusters.max_sway_speed)?;
        if clusters.count > 0 && clusters.palette.is_empty() {
            return Err(SceneError::invalid("clusters.palette", "palette is empty"));
        }
        Ok(())
    }
}

/// Runtime state of one crown layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerState {
    pub node: NodeId,
    pub index: usize,
    pub original_height: f32,
    /// In `[0, 2π)`, fixed at construction
    pub phase: f32,
}

/// Runtime state of one leaf cluster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterState {
    pub node: NodeId,
    /// Frozen at creation, never animated
    pub original_position: Vec3,
    pub sway_phase: f32,
    pub sway_speed: f32,
}

/// Node ids and animation data for a built tree
#[derive(Debug, Clone)]
pub struct TreeHandle {
    root: NodeId,
    trunk: NodeId,
    crown: NodeId,
    bumps: Vec<NodeId>,
    layers: Vec<LayerState>,
    clusters: Vec<ClusterState>,
}

/// Height offset of a crown layer at `elapsed` seconds
pub fn breathing_offset(elapsed: f32, phase: f32) -> f32 {
    (elapsed * BREATHING_RATE + phase).sin() * BREATHING_AMPLITUDE
}

/// Horizontal displacement of a leaf cluster at `elapsed` seconds
pub fn cluster_offset(elapsed: f32, sway_speed: f32, sway_phase: f32) -> Vec3 {
    let angle = elapsed * sway_speed + sway_phase;
    Vec3::new(angle.sin(), 0.0, angle.cos()) * CLUSTER_SWAY_AMPLITUDE
}

pub fn crown_yaw(elapsed: f32) -> f32 {
    (elapsed * CROWN_YAW_RATE).sin() * CROWN_YAW_AMPLITUDE
}

impl TreeHandle {
    /// Group the interaction yaw is written to
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn trunk(&self) -> NodeId {
        self.trunk
    }

    pub fn crown(&self) -> NodeId {
        self.crown
    }

    pub fn bumps(&self) -> &[NodeId] {
        &self.bumps
    }

    pub fn layers(&self) -> &[LayerState] {
        &self.layers
    }

    pub fn clusters(&self) -> &[ClusterState] {
        &self.clusters
    }

    pub fn breathe(&self, scene: &mut SceneGraph, elapsed: f32) {
        for layer in &self.layers {
            scene.transform_mut(layer.node).position.y =
                layer.original_height + breathing_offset(elapsed, layer.phase);
        }
    }

    pub fn sway_clusters(&self, scene: &mut SceneGraph, elapsed: f32) {
        for cluster in &self.clusters {
            let offset = cluster_offset(elapsed, cluster.sway_speed, cluster.sway_phase);
            let position = &mut scene.transform_mut(cluster.node).position;
            position.x = cluster.original_position.x + offset.x;
            position.z = cluster.original_position.z + offset.z;
        }
    }

    pub fn drift_crown(&self, scene: &mut SceneGraph, elapsed: f32) {
        scene.transform_mut(self.crown).rotation.y = crown_yaw(elapsed);
    }
}

pub struct TreeBuilder;

impl TreeBuilder {
    /// Validate `profile` and register the tree under the scene root.
    pub fn build<R: Rng + ?Sized>(profile: &TreeProfile, scene: &mut SceneGraph, rng: &mut R) -> Result<TreeHandle> {
        profile.validate()?;

        let scene_root = scene.root();
        let root = scene.add_group(scene_root, "tree", Transform::IDENTITY);

        let trunk_profile = &profile.trunk;
        let trunk_geometry = scene.add_geometry(Geometry::Cylinder {
            radius_top: trunk_profile.top_radius,
            radius_bottom: trunk_profile.bottom_radius,
            height: trunk_profile.height,
            radial_segments: trunk_profile.radial_segments,
        });
        let trunk_material = scene.add_material(Material::lit(trunk_profile.color).shininess(5.0));
        let trunk = scene.add_mesh(
            root,
            "trunk",
            trunk_geometry,
            trunk_material,
            Transform::from_position(Vec3::new(0.0, trunk_profile.height * 0.5, 0.0)),
        );

        let bumps = Self::scatter_bark(profile, scene, root, rng);

        let crown = scene.add_group(root, "crown", Transform::IDENTITY);
        let layers = Self::stack_layers(profile, scene, crown, rng);
        let clusters = Self::place_clusters(profile, scene, crown, rng);

        log::debug!(
            "tree built: {} bumps, {} crown layers, {} clusters",
            bumps.len(),
            layers.len(),
            clusters.len()
        );

        Ok(TreeHandle {
            root,
            trunk,
            crown,
            bumps,
            layers,
            clusters,
        })
    }

    fn scatter_bark<R: Rng + ?Sized>(
        profile: &TreeProfile,
        scene: &mut SceneGraph,
        parent: NodeId,
        rng: &mut R,
    ) -> Vec<NodeId> {
        let bark = &profile.bark;
        let geometry = scene.add_geometry(Geometry::Sphere {
            radius: bark.radius,
            segments: 8,
        });
        let material = scene.add_material(Material::lit(bark.color));

        (0..bark.count)
            .map(|i| {
                let angle = rng.gen_range(0.0..TAU);
                let height = Range::new(bark.min_height, bark.max_height).sample(rng);
                let radius = profile.trunk.top_radius + (profile.trunk.height - height) * bark.taper;
                let transform = Transform::from_position(Vec3::new(
                    angle.cos() * radius,
                    height,
                    angle.sin() * radius,
                ))
                .with_scale(bark.scale);
                scene.add_mesh(parent, &format!("bark-{i}"), geometry, material, transform)
            })
            .collect()
    }

    fn stack_layers<R: Rng + ?Sized>(
        profile: &TreeProfile,
        scene: &mut SceneGraph,
        crown: NodeId,
        rng: &mut R,
    ) -> Vec<LayerState> {
        profile
            .layers
            .iter()
            .enumerate()
            .map(|(index, layer)| {
                let geometry = scene.add_geometry(Geometry::Sphere {
                    radius: layer.radius,
                    segments: 16,
                });
                let material = scene.add_material(Material::lit(layer.color).flat().shininess(10.0));
                let node = scene.add_mesh(
                    crown,
                    &format!("crown-layer-{index}"),
                    geometry,
                    material,
                    Transform::from_position(Vec3::new(0.0, layer.base_height, 0.0)),
                );
                LayerState {
                    node,
                    index,
                    original_height: layer.base_height,
                    phase: layer.phase.unwrap_or_else(|| rng.gen_range(0.0..TAU)),
                }
            })
            .collect()
    }

    fn place_clusters<R: Rng + ?Sized>(
        profile: &TreeProfile,
        scene: &mut SceneGraph,
        crown: NodeId,
        rng: &mut R,
    ) -> Vec<ClusterState> {
        let clusters = &profile.clusters;
        if clusters.count == 0 {
            return Vec::new();
        }
        let geometry = scene.add_geometry(Geometry::Sphere {
            radius: clusters.radius,
            segments: 8,
        });

        (0..clusters.count)
            .map(|i| {
                let color = clusters.palette[rng.gen_range(0..clusters.palette.len())];
                let material = scene.add_material(Material::lit(color).flat());

                let angle = rng.gen_range(0.0..TAU);
                let f: f32 = rng.gen_range(0.0..=1.0);
                let ring = clusters.base_radius + f * clusters.radius_spread;
                let position = Vec3::new(
                    angle.cos() * ring,
                    clusters.base_height + f * clusters.height_spread,
                    angle.sin() * ring,
                );

                let node = scene.add_mesh(
                    crown,
                    &format!("leaf-cluster-{i}"),
                    geometry,
                    material,
                    Transform::from_position(position),
                );
                ClusterState {
                    node,
                    original_position: position,
                    sway_phase: rng.gen_range(0.0..TAU),
                    sway_speed: Range::new(clusters.min_sway_speed, clusters.max_sway_speed).sample(rng),
                }
            })
            .collect()
    }
}
