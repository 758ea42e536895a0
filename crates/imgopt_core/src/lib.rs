//! Core data types for the imgopt image variant pipeline.
//!
//! This crate is pure: it classifies object keys, derives variant keys,
//! recognises junk left behind by earlier runs, and defines the report a
//! pipeline run returns. Nothing here performs I/O.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod asset;
mod junk;
mod naming;
mod report;
mod scope;

pub use asset::{Asset, Dimensions, ImageExtension};
pub use junk::JunkPattern;
pub use naming::{
    ALT_FORMAT_EXTENSION, Classification, DENSITY_MARKER, KeyParts, MOBILE_SCOPE, NamingScheme,
    RETINA_SCOPE, RetinaPlacement, VariantKind,
};
pub use report::{AssetFailure, AssetOutcome, RunReport, VariantOutcome};
pub use scope::DirectoryScope;
