//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// Simple 2D vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Colors for game elements
pub mod colors {
    pub const BACKGROUND: [f32; 4] = [0.02, 0.02, 0.06, 1.0];
    pub const GRID: [f32; 4] = [0.1, 0.12, 0.2, 1.0];
    pub const TERRAIN_FILL: [f32; 4] = [0.15, 0.3, 0.2, 1.0];
    pub const TERRAIN_EDGE: [f32; 4] = [0.3, 0.7, 0.4, 1.0];
    pub const SHIP: [f32; 4] = [0.9, 0.95, 1.0, 1.0];
    pub const PLAYER_SHOT: [f32; 4] = [1.0, 1.0, 0.6, 1.0];
    pub const ENEMY_SHOT: [f32; 4] = [1.0, 0.4, 0.4, 1.0];
    pub const TURRET: [f32; 4] = [0.75, 0.5, 0.3, 1.0];
    pub const FLOATER: [f32; 4] = [0.6, 0.4, 0.9, 1.0];
    pub const HEALTH_BAR_BG: [f32; 4] = [0.2, 0.05, 0.05, 1.0];
    pub const HEALTH_BAR_FILL: [f32; 4] = [0.2, 0.9, 0.3, 1.0];
}
