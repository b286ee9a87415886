//! # Operation Descriptors
//!
//! The declarative record of every routable operation: its path template, methods,
//! consumed/produced media types, positional parameters and handler reference.
//!
//! Descriptors are produced at startup, either in code through [`OperationBuilder`] (optionally
//! under an [`EndpointBuilder`] that contributes a path prefix and shared metadata) or from a
//! YAML/TOML/JSON manifest through [`load_manifest`]. Once registered they are never mutated.

mod builder;
mod load;
mod types;

pub use builder::{EndpointBuilder, OperationBuilder};
pub use load::{
    load_manifest, parse_manifest, EndpointManifest, Manifest, ManifestFormat, OperationManifest,
    ParameterManifest,
};
pub use types::{
    ContextTypeRef, DeclaredType, DescriptorIssue, OperationDescriptor, ParameterDescriptor,
    ParameterKind, ParameterName,
};
