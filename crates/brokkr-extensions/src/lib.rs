//! Extension SQL composition for Brokkr
//!
//! This crate handles:
//! - Manifest resolution, including foundation and frozen parent manifests
//! - Content transforms keyed by script file extension
//! - Script compilation with terminator validation
//! - Registration SQL generation
//! - Bundling an extension into one SQL payload

pub mod compiler;
pub mod composer;
pub mod registration;
pub mod resolver;
pub mod transform;

pub use compiler::ScriptCompiler;
pub use composer::{ComposeOptions, ExtensionComposer};
pub use registration::{fill_placeholders, RegistrationSqlBuilder};
pub use resolver::{ManifestLayout, ManifestResolver, ResolveOptions, ResolvedManifest};
pub use transform::{ContentFormat, ContentTransform, TransformRegistry};
