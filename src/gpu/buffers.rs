use wgpu::{Buffer, BufferUsages, Device, Queue};

use crate::sim::GridDims;

/// Ping-pong cell buffers plus the uniform buffers for one viewport-size
/// epoch. A resize tears the whole set down and allocates a fresh, freshly
/// seeded pair; dimensions never change in place.
pub struct GridBuffers {
    buffer_a: Buffer,
    buffer_b: Buffer,
    pub sim_params_buffer: Buffer,
    pub display_params_buffer: Buffer,
    /// Which buffer holds the last fully computed generation
    read_from_a: bool,
}

/// Per-step parameters for the automaton pass (64 bytes, 16-aligned)
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SimParams {
    pub sim_width: u32,
    pub sim_height: u32,
    pub step: u32,
    pub seed: u32,

    pub reseed_prob: f32,
    pub hover: f32,
    pub cursor_x: f32,
    pub cursor_y: f32,

    pub hover_radius: f32,
    pub mask_offset_x: f32,
    pub mask_offset_y: f32,
    pub band_phase: f32,

    pub mask_threshold: f32,
    pub _padding: [f32; 3],
}

/// Per-frame parameters for the display pass (48 bytes, 16-aligned)
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DisplayParams {
    pub sim_width: u32,
    pub sim_height: u32,
    pub disp_width: u32,
    pub disp_height: u32,

    pub pitch: f32,
    pub opacity: f32,
    pub alpha_activating: f32,
    pub alpha_fading: f32,

    pub phase_x: f32,
    pub phase_y: f32,
    pub viewport_w: f32,
    pub viewport_h: f32,
}

impl GridBuffers {
    /// Allocate the buffer pair and run the seeding upload so the first
    /// displayed frame is never uninitialized
    pub fn new(device: &Device, queue: &Queue, dims: GridDims, seed_cells: &[u32]) -> Self {
        assert_eq!(
            seed_cells.len(),
            dims.cell_count(),
            "seed data does not match grid dimensions"
        );

        let buffer_size = (dims.cell_count() * std::mem::size_of::<u32>()) as u64;

        let buffer_a = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("cells-buffer-a"),
            size: buffer_size,
            usage: BufferUsages::STORAGE | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let buffer_b = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("cells-buffer-b"),
            size: buffer_size,
            usage: BufferUsages::STORAGE | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let sim_params_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("sim-params-buffer"),
            size: std::mem::size_of::<SimParams>() as u64,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let display_params_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("display-params-buffer"),
            size: std::mem::size_of::<DisplayParams>() as u64,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        queue.write_buffer(&buffer_a, 0, bytemuck::cast_slice(seed_cells));

        Self {
            buffer_a,
            buffer_b,
            sim_params_buffer,
            display_params_buffer,
            read_from_a: true,
        }
    }

    /// (previous generation, next generation) for one automaton step
    pub fn io_buffers(&self) -> (&Buffer, &Buffer) {
        if self.read_from_a {
            (&self.buffer_a, &self.buffer_b)
        } else {
            (&self.buffer_b, &self.buffer_a)
        }
    }

    /// The buffer holding the last fully computed generation; what the
    /// display pass samples
    pub fn readable_buffer(&self) -> &Buffer {
        if self.read_from_a {
            &self.buffer_a
        } else {
            &self.buffer_b
        }
    }

    /// Swap roles after a step's writes complete. A reference exchange, not
    /// a copy.
    pub fn swap(&mut self) {
        self.read_from_a = !self.read_from_a;
    }

    pub fn update_sim_params(&self, queue: &Queue, params: &SimParams) {
        queue.write_buffer(&self.sim_params_buffer, 0, bytemuck::bytes_of(params));
    }

    pub fn update_display_params(&self, queue: &Queue, params: &DisplayParams) {
        queue.write_buffer(&self.display_params_buffer, 0, bytemuck::bytes_of(params));
    }

    /// Release GPU memory eagerly. Called when an epoch is superseded by a
    /// resize and from the engine's disposal path.
    pub fn destroy(&self) {
        self.buffer_a.destroy();
        self.buffer_b.destroy();
        self.sim_params_buffer.destroy();
        self.display_params_buffer.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sim_params_layout() {
        // Must match the WGSL uniform struct in shaders/sim.wgsl
        assert_eq!(std::mem::size_of::<SimParams>(), 64);
        assert_eq!(std::mem::size_of::<SimParams>() % 16, 0);
    }

    #[test]
    fn test_display_params_layout() {
        // Must match the WGSL uniform struct in shaders/display.wgsl
        assert_eq!(std::mem::size_of::<DisplayParams>(), 48);
        assert_eq!(std::mem::size_of::<DisplayParams>() % 16, 0);
    }
}
