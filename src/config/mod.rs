pub mod types;

pub use types::{AlertThreshold, Config};
