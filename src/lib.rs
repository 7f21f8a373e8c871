//! Procedural ambient tree backdrop: a layered tree with a breathing crown,
//! a pool of falling leaves, drag-to-rotate and light/dark theming, drawn
//! every frame by a software rasterizer and presented through wgpu.

pub mod animation;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod frame;
pub mod interaction;
pub mod lifecycle;
pub mod math;
pub mod particles;
pub mod render;
pub mod scene;
pub mod theme;
pub mod traits;
pub mod tree;

pub use config::BackdropConfig;
pub use error::{ConfigError, Result, SceneError};
pub use lifecycle::Backdrop;
