//! The particle engine.
//!
//! [`ParticleEngine`] owns a fixed-size pool of particles and advances it
//! once per frame. Particles are activated on a time-indexed schedule:
//! at emitter age `t` the slots `[round(rate * t), round(rate * (t + dt)))`
//! come alive, so the emission rate stays constant regardless of frame
//! timing. When a particle outlives `particle_death_age` its slot is
//! immediately refilled with a freshly sampled particle, which keeps the
//! pool busy without allocating during the frame loop.
//!
//! # Example
//!
//! ```
//! use firefly::{EmitterConfig, ParticleEngine, Scene};
//!
//! let mut scene = Scene::new();
//! let mut engine = ParticleEngine::with_seed(7);
//! engine.set_values(EmitterConfig::fireflies()).unwrap();
//! engine.initialize(&mut scene).unwrap();
//!
//! for _ in 0..60 {
//!     engine.update(1.0 / 60.0);
//! }
//! assert!(engine.alive_count() > 0);
//! ```

use std::sync::Arc;

use tracing::{debug, info, trace};

use crate::buffers::AttributeBuffers;
use crate::color::hsl_to_rgb;
use crate::config::{Distribution, EmitterConfig};
use crate::error::ConfigError;
use crate::particle::{Particle, ParticleTweens};
use crate::render::{MeshId, ParticleMaterial, ParticleMesh, RenderSurface};
use crate::spawn::Sampler;

/// Snapshot of the engine's state, for logging and HUDs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineStats {
    pub pool_size: usize,
    pub alive: usize,
    pub emitter_age: f32,
    pub emitter_alive: bool,
}

/// Fixed-pool particle emitter.
///
/// Lifecycle: [`set_values`](Self::set_values) once per configuration,
/// [`initialize`](Self::initialize) to fill the pool and attach to a
/// surface, [`update`](Self::update) every frame,
/// [`destroy`](Self::destroy) to detach.
#[derive(Debug)]
pub struct ParticleEngine {
    config: EmitterConfig,
    tweens: Arc<ParticleTweens>,
    particles: Vec<Particle>,
    pool_size: usize,
    buffers: AttributeBuffers,
    emitter_age: f32,
    emitter_alive: bool,
    initialized: bool,
    sampler: Sampler,
    mesh: Option<MeshId>,
    // Reused every tick.
    recycle: Vec<usize>,
}

impl ParticleEngine {
    /// Engine with the default configuration and an entropy-seeded sampler.
    pub fn new() -> Self {
        Self::with_sampler(Sampler::from_entropy())
    }

    /// Engine whose particles are reproducible for a given seed.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_sampler(Sampler::from_seed(seed))
    }

    fn with_sampler(sampler: Sampler) -> Self {
        let config = EmitterConfig::default();
        let pool_size = config.pool_size();
        Self {
            tweens: Arc::new(tweens_of(&config)),
            config,
            particles: Vec::new(),
            pool_size,
            buffers: AttributeBuffers::new(pool_size),
            emitter_age: 0.0,
            emitter_alive: true,
            initialized: false,
            sampler,
            mesh: None,
            recycle: Vec::new(),
        }
    }

    /// Apply a configuration.
    ///
    /// Discards the whole pool, restarts the emitter and resizes the
    /// attribute buffers. The pool is empty until the next
    /// [`initialize`](Self::initialize). An invalid configuration leaves
    /// the engine untouched.
    ///
    /// An attached mesh stays attached but no longer matches the buffers;
    /// [`destroy`](Self::destroy) before, or `initialize` after, to swap it.
    pub fn set_values(&mut self, config: EmitterConfig) -> Result<(), ConfigError> {
        config.validate()?;

        self.tweens = Arc::new(tweens_of(&config));
        self.particles.clear();
        self.recycle.clear();
        self.emitter_age = 0.0;
        self.emitter_alive = true;
        self.initialized = false;
        self.pool_size = config.pool_size();
        self.buffers = AttributeBuffers::new(self.pool_size);
        self.config = config;

        debug!(
            "Configured emitter: {} particles/s, pool of {}",
            self.config.particles_per_second, self.pool_size
        );
        Ok(())
    }

    /// Sample a fresh, inactive particle from the configuration.
    pub fn create_particle(&mut self) -> Particle {
        let config = &self.config;
        let sampler = &mut self.sampler;
        let mut particle = Particle::new(Arc::clone(&self.tweens));

        particle.position = match config.position_style {
            Distribution::Box => sampler.vec3(config.position_base, config.position_spread),
            Distribution::Sphere => {
                config.position_base + sampler.on_unit_sphere() * config.position_radius
            }
        };

        particle.velocity = match config.velocity_style {
            Distribution::Box => sampler.vec3(config.velocity_base, config.velocity_spread),
            Distribution::Sphere => {
                let direction = (particle.position - config.position_base).normalize_or_zero();
                direction * sampler.value(config.speed_base, config.speed_spread)
            }
        };

        particle.acceleration =
            sampler.vec3(config.acceleration_base, config.acceleration_spread);

        particle.angle = sampler.value(config.angle_base, config.angle_spread);
        particle.angle_velocity =
            sampler.value(config.angle_velocity_base, config.angle_velocity_spread);
        particle.angle_acceleration =
            sampler.value(config.angle_acceleration_base, config.angle_acceleration_spread);

        particle.size = sampler.value(config.size_base, config.size_spread);
        particle.color = hsl_to_rgb(sampler.vec3(config.color_base, config.color_spread));
        particle.opacity = sampler.value(config.opacity_base, config.opacity_spread);

        particle.age = 0.0;
        particle.alive = false;
        particle
    }

    /// Fill the pool with inactive particles and attach the mesh to `surface`.
    ///
    /// Calling it again refills the pool and re-attaches, removing the
    /// previously attached mesh first.
    pub fn initialize<S: RenderSurface>(&mut self, surface: &mut S) -> Result<MeshId, S::Error> {
        if let Some(previous) = self.mesh.take() {
            surface.remove(previous);
        }

        self.particles.clear();
        self.particles.reserve(self.pool_size);
        for index in 0..self.pool_size {
            let particle = self.create_particle();
            self.buffers.write_slot(index, &particle);
            self.particles.push(particle);
        }
        self.buffers.mark_all_dirty();
        self.initialized = true;

        let mesh = ParticleMesh {
            capacity: self.pool_size,
            material: ParticleMaterial::new(
                self.config.blend_style,
                self.config.particle_texture.clone(),
            ),
        };
        let id = surface.add(mesh)?;
        self.mesh = Some(id);

        info!("Particle engine initialized with {} slots", self.pool_size);
        Ok(id)
    }

    /// Advance the simulation by `dt` seconds.
    ///
    /// Alive particles are integrated and written to the attribute buffers.
    /// While the emitter runs, scheduled slots are activated and particles
    /// that died this tick are replaced by new ones straight away. Once the
    /// emitter is past `emitter_death_age` nothing is activated or recycled
    /// any more, but particles already in flight live out their lives.
    ///
    /// Does nothing before [`initialize`](Self::initialize). An empty pool
    /// still ages the emitter. `dt` is used as given.
    pub fn update(&mut self, dt: f32) {
        if !self.initialized {
            return;
        }

        let death_age = self.config.particle_death_age;
        self.recycle.clear();

        for (index, particle) in self.particles.iter_mut().enumerate() {
            if !particle.alive {
                continue;
            }
            particle.update(dt);
            if particle.age > death_age {
                particle.alive = false;
                self.recycle.push(index);
            }
            self.buffers.write_slot(index, particle);
        }

        if !self.emitter_alive {
            return;
        }

        if self.emitter_age < death_age {
            let rate = self.config.particles_per_second;
            let len = self.particles.len();
            let start = ((rate * self.emitter_age).round() as usize).min(len);
            let end = ((rate * (self.emitter_age + dt)).round() as usize).min(len);
            for index in start..end {
                let particle = &mut self.particles[index];
                if !particle.alive {
                    particle.alive = true;
                    self.buffers.write_slot(index, particle);
                }
            }
        }

        let recycle = std::mem::take(&mut self.recycle);
        for &index in &recycle {
            let mut particle = self.create_particle();
            particle.alive = true;
            self.buffers.write_slot(index, &particle);
            self.particles[index] = particle;
        }
        if !recycle.is_empty() {
            trace!("Recycled {} particles", recycle.len());
        }
        self.recycle = recycle;

        self.emitter_age += dt;
        if self.emitter_age > self.config.emitter_death_age {
            self.emitter_alive = false;
            info!("Emitter stopped after {:.2}s", self.emitter_age);
        }
    }

    /// Detach the mesh from `surface`. The pool is left as it is.
    pub fn destroy<S: RenderSurface>(&mut self, surface: &mut S) -> Option<ParticleMesh> {
        let id = self.mesh.take()?;
        debug!("Detaching particle mesh {:?}", id);
        surface.remove(id)
    }

    /// Active configuration.
    pub fn config(&self) -> &EmitterConfig {
        &self.config
    }

    /// Number of slots in the pool.
    #[inline]
    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    /// Seconds the emitter has been running.
    #[inline]
    pub fn emitter_age(&self) -> f32 {
        self.emitter_age
    }

    /// Whether the emitter still activates and recycles particles.
    #[inline]
    pub fn is_emitter_alive(&self) -> bool {
        self.emitter_alive
    }

    /// The pool, indexed by slot. Empty before [`initialize`](Self::initialize).
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Number of alive particles.
    pub fn alive_count(&self) -> usize {
        self.particles.iter().filter(|p| p.alive).count()
    }

    /// Attribute buffers for the render surface.
    pub fn buffers(&self) -> &AttributeBuffers {
        &self.buffers
    }

    /// Mutable buffers, for clearing dirty flags after an upload.
    pub fn buffers_mut(&mut self) -> &mut AttributeBuffers {
        &mut self.buffers
    }

    /// Mesh currently attached to a surface, if any.
    pub fn mesh_id(&self) -> Option<MeshId> {
        self.mesh
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            pool_size: self.pool_size,
            alive: self.alive_count(),
            emitter_age: self.emitter_age,
            emitter_alive: self.emitter_alive,
        }
    }
}

impl Default for ParticleEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn tweens_of(config: &EmitterConfig) -> ParticleTweens {
    ParticleTweens {
        size: config.size_tween.clone(),
        color: config.color_tween.clone(),
        opacity: config.opacity_tween.clone(),
    }
}
