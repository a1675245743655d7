//! Type definitions for Brokkr

mod build_spec;
mod credentials;
mod descriptor;
mod manifest;

pub use build_spec::*;
pub use credentials::*;
pub use descriptor::*;
pub use manifest::*;
