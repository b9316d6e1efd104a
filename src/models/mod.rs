pub mod record;
pub mod result;
pub mod severity;

pub use record::*;
pub use result::*;
pub use severity::Severity;
