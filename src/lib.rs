//! # Firefly
//!
//! A small particle engine for soft, drifting effects such as fireflies,
//! embers or dust.
//!
//! Every particle lives in a fixed-size pool owned by a [`ParticleEngine`].
//! Particles are emitted at a constant rate, move with semi-implicit Euler
//! integration, and animate their size, color and opacity along keyframed
//! [`Tween`]s. When a particle dies its slot is refilled straight away, so
//! the frame loop never allocates.
//!
//! ## Quick Start
//!
//! ```
//! use firefly::{EmitterConfig, ParticleEngine, Scene};
//!
//! let mut scene = Scene::new();
//! let mut engine = ParticleEngine::with_seed(1);
//! engine.set_values(EmitterConfig::fireflies()).unwrap();
//! engine.initialize(&mut scene).unwrap();
//!
//! engine.update(0.016);
//! let positions = engine.buffers().data(firefly::Attribute::Position);
//! assert_eq!(positions.len(), engine.pool_size() * 3);
//! ```
//!
//! ## Core Concepts
//!
//! ### Emitter configuration
//!
//! [`EmitterConfig`] holds the base value and spread of every particle
//! attribute, the emission rate and the particle and emitter lifetimes. It
//! loads from JSON:
//!
//! ```
//! let config = firefly::EmitterConfig::from_json(r#"{
//!     "particlesPerSecond": 50,
//!     "particleDeathAge": 2.0,
//!     "blendStyle": "additive"
//! }"#).unwrap();
//! assert_eq!(config.pool_size(), 100);
//! ```
//!
//! ### Render surfaces
//!
//! The engine draws through a [`RenderSurface`]. [`Scene`] just records
//! attached meshes (handy for tests and headless runs);
//! [`gpu::ParticleRenderer`] draws them with wgpu. A surface reads the
//! engine's [`AttributeBuffers`] each frame and uploads whatever is dirty.
//!
//! ### Viewer
//!
//! [`viewer::run`] opens a window, drives the engine from a [`FrameClock`]
//! and renders it with an orbit camera.

pub mod buffers;
pub mod color;
pub mod config;
pub mod engine;
pub mod error;
pub mod gpu;
pub mod particle;
pub mod render;
pub mod shader;
pub mod spawn;
pub mod textures;
pub mod time;
pub mod tween;
pub mod viewer;

pub use buffers::{Attribute, AttributeBuffers};
pub use color::hsl_to_rgb;
pub use config::{BlendStyle, Distribution, EmitterConfig, MAX_POOL_SIZE};
pub use engine::{EngineStats, ParticleEngine};
pub use error::{ConfigError, GpuError, TextureError, TweenError, ViewerError};
pub use glam::Vec3;
pub use particle::{Particle, ParticleTweens};
pub use render::{MeshId, ParticleMaterial, ParticleMesh, RenderSurface, Scene};
pub use spawn::Sampler;
pub use textures::TextureConfig;
pub use time::FrameClock;
pub use tween::{Lerp, Tween};
