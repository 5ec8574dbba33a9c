pub mod grid;
pub mod rule;
pub mod timing;

pub use grid::GridDims;
pub use rule::MaskField;
pub use timing::StepClock;
