//! Flat per-particle attribute buffers.
//!
//! The render surface consumes particle state as six tightly packed `f32`
//! arrays, one per shader attribute, indexed by pool slot. The engine
//! copies particle state into these arrays after each tick and marks the
//! touched arrays dirty; the surface uploads dirty arrays and clears the
//! flags.
//!
//! | Attribute | Components | Shader input |
//! |-----------|------------|--------------|
//! | [`Attribute::Position`] | 3 | `position` |
//! | [`Attribute::Visible`] | 1 | `visible` (0.0 / 1.0) |
//! | [`Attribute::Size`] | 1 | `size` |
//! | [`Attribute::Angle`] | 1 | `angle` (radians) |
//! | [`Attribute::Color`] | 3 | `color` (RGB) |
//! | [`Attribute::Opacity`] | 1 | `opacity` |

use glam::Vec3;

use crate::particle::Particle;

/// One per-particle shader attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Position,
    Visible,
    Size,
    Angle,
    Color,
    Opacity,
}

impl Attribute {
    /// Every attribute, in shader location order.
    pub const ALL: [Attribute; 6] = [
        Attribute::Position,
        Attribute::Visible,
        Attribute::Size,
        Attribute::Angle,
        Attribute::Color,
        Attribute::Opacity,
    ];

    /// Number of `f32` components per particle.
    pub const fn components(self) -> usize {
        match self {
            Attribute::Position | Attribute::Color => 3,
            Attribute::Visible | Attribute::Size | Attribute::Angle | Attribute::Opacity => 1,
        }
    }

    /// Shader location of this attribute.
    pub const fn location(self) -> u32 {
        match self {
            Attribute::Position => 0,
            Attribute::Visible => 1,
            Attribute::Size => 2,
            Attribute::Angle => 3,
            Attribute::Color => 4,
            Attribute::Opacity => 5,
        }
    }

    /// Attribute name as used in the shader.
    pub const fn name(self) -> &'static str {
        match self {
            Attribute::Position => "position",
            Attribute::Visible => "visible",
            Attribute::Size => "size",
            Attribute::Angle => "angle",
            Attribute::Color => "color",
            Attribute::Opacity => "opacity",
        }
    }

    const fn bit(self) -> u8 {
        1 << self.location()
    }
}

const ALL_DIRTY: u8 = 0b11_1111;

/// Structure-of-arrays mirror of the particle pool.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeBuffers {
    capacity: usize,
    position: Vec<f32>,
    visible: Vec<f32>,
    size: Vec<f32>,
    angle: Vec<f32>,
    color: Vec<f32>,
    opacity: Vec<f32>,
    dirty: u8,
}

impl AttributeBuffers {
    /// Zeroed buffers for `capacity` particles, all marked dirty.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            position: vec![0.0; capacity * 3],
            visible: vec![0.0; capacity],
            size: vec![0.0; capacity],
            angle: vec![0.0; capacity],
            color: vec![0.0; capacity * 3],
            opacity: vec![0.0; capacity],
            dirty: ALL_DIRTY,
        }
    }

    /// Number of particle slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Raw data of one attribute (`capacity * components` floats).
    pub fn data(&self, attribute: Attribute) -> &[f32] {
        match attribute {
            Attribute::Position => &self.position,
            Attribute::Visible => &self.visible,
            Attribute::Size => &self.size,
            Attribute::Angle => &self.angle,
            Attribute::Color => &self.color,
            Attribute::Opacity => &self.opacity,
        }
    }

    /// Copy every attribute of `particle` into slot `index`.
    pub fn write_slot(&mut self, index: usize, particle: &Particle) {
        write_vec3(&mut self.position, index, particle.position);
        self.visible[index] = particle.visibility();
        self.size[index] = particle.size;
        self.angle[index] = particle.angle;
        write_vec3(&mut self.color, index, particle.color);
        self.opacity[index] = particle.opacity;
        self.dirty = ALL_DIRTY;
    }

    /// Position stored in slot `index`.
    pub fn position(&self, index: usize) -> Vec3 {
        Vec3::from_slice(&self.position[index * 3..index * 3 + 3])
    }

    /// Visibility stored in slot `index`.
    pub fn visible(&self, index: usize) -> f32 {
        self.visible[index]
    }

    /// Whether `attribute` changed since the last [`clear_dirty`](Self::clear_dirty).
    #[inline]
    pub fn is_dirty(&self, attribute: Attribute) -> bool {
        self.dirty & attribute.bit() != 0
    }

    /// Attributes that changed since the last upload.
    pub fn dirty(&self) -> impl Iterator<Item = Attribute> + '_ {
        Attribute::ALL.into_iter().filter(|a| self.is_dirty(*a))
    }

    /// Mark every attribute as uploaded.
    pub fn clear_dirty(&mut self) {
        self.dirty = 0;
    }

    /// Force a full upload on the next frame.
    pub fn mark_all_dirty(&mut self) {
        self.dirty = ALL_DIRTY;
    }
}

#[inline]
fn write_vec3(buffer: &mut [f32], index: usize, value: Vec3) {
    value.write_to_slice(&mut buffer[index * 3..index * 3 + 3]);
}
