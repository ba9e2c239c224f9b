pub mod error;
pub mod model;
pub mod utils;

pub use error::SignalingError;
pub use model::*;
