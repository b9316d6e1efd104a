pub mod parser;

pub use parser::ImageReference;
