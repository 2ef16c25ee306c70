mod set;
mod validate;

pub use set::{ControlPoint, ControlPointSet, MAX_POINTS, MIN_POINTS};
