mod distance;
mod gate;
mod sample;
mod state;

pub use distance::{geodesic_distance_m, haversine_distance_m};
pub use gate::{evaluate, should_accept, Decision, DecisionReason, GateConfig};
pub use sample::LocationSample;
pub use state::{GateState, Position};
