//! In-memory model of an Xcode `project.pbxproj` object graph and its
//! OpenStep property-list serialization.

pub mod build_settings;
pub mod object;
pub mod writer;

pub use build_settings::{Configuration, Language, TargetSettings};
pub use object::*;
