//! Falling leaves.
//!
//! A fixed pool of leaf planes created once at startup. Each update moves
//! every leaf down, drifts it sideways on its own sway cycle and tumbles
//! it; a leaf that drops below the ground threshold is put back at its
//! start height in the same update, so the pool never shrinks or grows.

use std::f32::consts::TAU;

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{ensure_non_negative, ensure_ordered, Result, SceneError};
use crate::math::Color;
use crate::scene::{Geometry, Material, NodeId, SceneGraph, Transform};

/// Horizontal drift per update for a unit sway amplitude
pub const SWAY_STEP: f32 = 0.01;
/// Ratio between the z and x sway frequencies
pub const SWAY_Z_RATIO: f32 = 0.7;

/// Closed sampling interval. A collapsed interval always yields `min`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: f32,
    pub max: f32,
}

impl Range {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Symmetric interval `[-extent, extent]`
    pub const fn symmetric(extent: f32) -> Self {
        Self::new(-extent, extent)
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        if self.max > self.min {
            rng.gen_range(self.min..self.max)
        } else {
            self.min
        }
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    fn validate(&self, field: &str) -> Result<()> {
        ensure_ordered(field, self.min, self.max)
    }
}

/// Box leaves are scattered in at startup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnVolume {
    pub x: Range,
    pub y: Range,
    pub z: Range,
}

impl SpawnVolume {
    pub fn contains(&self, p: Vec3) -> bool {
        self.x.contains(p.x) && self.y.contains(p.y) && self.z.contains(p.z)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    pub count: usize,
    pub palette: Vec<Color>,
    pub leaf_width: f32,
    pub leaf_height: f32,
    pub opacity: f32,
    pub spawn: SpawnVolume,
    pub fall_speed: Range,
    pub rotation_speed: Range,
    pub sway_amplitude: Range,
    pub sway_speed: Range,
    /// Leaves below this height are respawned
    pub ground: f32,
    /// Horizontal half-extent for respawned leaves
    pub respawn_extent: f32,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            count: 100,
            palette: vec![
                Color::from_hex(0xff9800),
                Color::from_hex(0xffc107),
                Color::from_hex(0xff5722),
                Color::from_hex(0x66bb6a),
                Color::from_hex(0x4caf50),
            ],
            leaf_width: 0.2,
            leaf_height: 0.3,
            opacity: 0.8,
            spawn: SpawnVolume {
                x: Range::symmetric(3.0),
                y: Range::new(3.8, 6.8),
                z: Range::symmetric(3.0),
            },
            fall_speed: Range::new(0.01, 0.03),
            rotation_speed: Range::new(-0.05, 0.05),
            sway_amplitude: Range::new(0.5, 1.5),
            sway_speed: Range::new(0.5, 1.5),
            ground: -2.0,
            respawn_extent: 5.0,
        }
    }
}

impl ParticleConfig {
    pub fn validate(&self) -> Result<()> {
        ensure_non_negative("leaves.leaf_width", self.leaf_width)?;
        ensure_non_negative("leaves.leaf_height", self.leaf_height)?;
        ensure_non_negative("leaves.respawn_extent", self.respawn_extent)?;
        Range::symmetric(self.respawn_extent).validate("leaves.respawn_extent")?;
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(SceneError::invalid(
                "leaves.opacity",
                format!("{} is outside [0, 1]", self.opacity),
            ));
        }
        self.spawn.x.validate("leaves.spawn.x")?;
        self.spawn.y.validate("leaves.spawn.y")?;
        self.spawn.z.validate("leaves.spawn.z")?;
        self.fall_speed.validate("leaves.fall_speed")?;
        self.rotation_speed.validate("leaves.rotation_speed")?;
        self.sway_amplitude.validate("leaves.sway_amplitude")?;
        self.sway_speed.validate("leaves.sway_speed")?;
        ensure_non_negative("leaves.fall_speed.min", self.fall_speed.min)?;
        ensure_non_negative("leaves.sway_amplitude.min", self.sway_amplitude.min)?;
        ensure_non_negative("leaves.sway_speed.min", self.sway_speed.min)?;
        if !self.ground.is_finite() || self.spawn.y.min <= self.ground {
            return Err(SceneError::invalid(
                "leaves.ground",
                format!(
                    "ground {} must lie below the spawn floor {}",
                    self.ground, self.spawn.y.min
                ),
            ));
        }
        if self.count > 0 && self.palette.is_empty() {
            return Err(SceneError::invalid("leaves.palette", "palette is empty"));
        }
        Ok(())
    }
}

/// Kinematic state of one falling leaf; its position lives in the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FallingLeaf {
    pub node: NodeId,
    pub fall_speed: f32,
    pub rotation_speed: f32,
    pub sway_amplitude: f32,
    pub sway_phase: f32,
    pub sway_speed: f32,
    pub start_height: f32,
}

impl FallingLeaf {
    /// Advance one update. Returns `true` when the leaf was respawned.
    pub fn step<R: Rng + ?Sized>(
        &mut self,
        transform: &mut Transform,
        delta: f32,
        ground: f32,
        respawn_extent: f32,
        rng: &mut R,
    ) -> bool {
        transform.position.y -= self.fall_speed;

        self.sway_phase += self.sway_speed * delta;
        let drift = SWAY_STEP * self.sway_amplitude;
        transform.position.x += self.sway_phase.sin() * drift;
        transform.position.z += (self.sway_phase * SWAY_Z_RATIO).cos() * drift;

        let r = self.rotation_speed;
        transform.rotation += Vec3::new(r, r * 0.5, r * 0.3);

        if transform.position.y < ground {
            let footprint = Range::symmetric(respawn_extent);
            transform.position = Vec3::new(footprint.sample(rng), self.start_height, footprint.sample(rng));
            self.sway_phase = rng.gen_range(0.0..TAU);
            return true;
        }
        false
    }
}

pub struct ParticleSystem {
    leaves: Vec<FallingLeaf>,
    ground: f32,
    respawn_extent: f32,
    rng: StdRng,
    respawned: u64,
}

impl ParticleSystem {
    /// Validate `config` and register `config.count` leaves under the
    /// scene root. The system keeps its own generator seeded from `rng`.
    pub fn build<R: Rng + ?Sized>(config: &ParticleConfig, scene: &mut SceneGraph, rng: &mut R) -> Result<Self> {
        config.validate()?;

        let root = scene.root();
        let group = scene.add_group(root, "falling-leaves", Transform::IDENTITY);
        let geometry = scene.add_geometry(Geometry::Plane {
            width: config.leaf_width,
            height: config.leaf_height,
        });

        let leaves = (0..config.count)
            .map(|i| {
                let color = config.palette[rng.gen_range(0..config.palette.len())];
                let material = scene.add_material(Material::basic(color).translucent(config.opacity).double_sided());

                let position = Vec3::new(
                    config.spawn.x.sample(rng),
                    config.spawn.y.sample(rng),
                    config.spawn.z.sample(rng),
                );
                let rotation = Vec3::new(rng.gen_range(0.0..TAU), rng.gen_range(0.0..TAU), rng.gen_range(0.0..TAU));
                let node = scene.add_mesh(
                    group,
                    &format!("leaf-{i}"),
                    geometry,
                    material,
                    Transform {
                        position,
                        rotation,
                        ..Transform::IDENTITY
                    },
                );

                FallingLeaf {
                    node,
                    fall_speed: config.fall_speed.sample(rng),
                    rotation_speed: config.rotation_speed.sample(rng),
                    sway_amplitude: config.sway_amplitude.sample(rng),
                    sway_phase: rng.gen_range(0.0..TAU),
                    sway_speed: config.sway_speed.sample(rng),
                    start_height: position.y,
                }
            })
            .collect::<Vec<_>>();

        log::debug!("particle system built: {} leaves", leaves.len());

        Ok(Self {
            leaves,
            ground: config.ground,
            respawn_extent: config.respawn_extent,
            rng: StdRng::seed_from_u64(rng.gen()),
            respawned: 0,
        })
    }

    /// Step every leaf. Returns how many were respawned this update.
    ///
    /// Fall distance is per update, not per second; sway phase advances
    /// with `delta`. `_elapsed` is accepted so every animation pass shares
    /// one signature.
    pub fn update(&mut self, scene: &mut SceneGraph, delta: f32, _elapsed: f32) -> usize {
        let mut respawned = 0;
        for leaf in &mut self.leaves {
            let transform = scene.transform_mut(leaf.node);
            if leaf.step(transform, delta, self.ground, self.respawn_extent, &mut self.rng) {
                respawned += 1;
            }
        }
        self.respawned += respawned as u64;
        respawned
    }

    pub fn leaves(&self) -> &[FallingLeaf] {
        &self.leaves
    }

    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    pub fn ground(&self) -> f32 {
        self.ground
    }

    /// Respawns since construction
    pub fn total_respawned(&self) -> u64 {
        self.respawned
    }
}
