pub mod sanitize;

pub use sanitize::sanitize_name;
