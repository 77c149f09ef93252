//! Sprite shader source and its uniform block.

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

pub const SPRITE_SHADER: &str = include_str!("sprite.wgsl");

/// Pixel edge of a size-1 sprite one unit from the camera.
pub const POINT_SCALE: f32 = 300.0;

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Uniforms {
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    pub viewport: [f32; 2],
    pub point_scale: f32,
    pub _padding: f32,
}

impl Uniforms {
    pub fn new(view: Mat4, proj: Mat4, width: u32, height: u32) -> Self {
        Self {
            view: view.to_cols_array_2d(),
            proj: proj.to_cols_array_2d(),
            viewport: [width.max(1) as f32, height.max(1) as f32],
            point_scale: POINT_SCALE,
            _padding: 0.0,
        }
    }
}
