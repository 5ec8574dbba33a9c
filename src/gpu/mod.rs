mod buffers;
mod context;
mod display_pass;
mod sim_pass;

pub use buffers::{DisplayParams, GridBuffers, SimParams};
pub use context::{GpuContext, ProbeError};
pub use display_pass::DisplayPipeline;
pub use sim_pass::SimPipeline;
