//! Configuration management

mod loader;
mod settings;

pub use loader::*;
pub use settings::*;
