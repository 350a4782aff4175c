pub mod gate;

pub use gate::{ACCESS_UUID_HEADER, gate_middleware, require_access};
