mod signal_sink;
mod ws_transport;

pub use signal_sink::*;
pub use ws_transport::*;
