//! Protobuf support for `stubgen`.
//!
//! Adapts `prost-types` descriptors to the `stubgen` descriptor traits, and drives a
//! [`ClientGenerator`](stubgen::ClientGenerator) from a `protoc` plugin request:
//!
//! ```rust
//! use prost_types::compiler::CodeGeneratorRequest;
//! use stubgen::cpp::CppClientGenerator;
//!
//! let request = CodeGeneratorRequest::default();
//! let response = stubgen_prost::Config::new().run_plugin(&CppClientGenerator::new(), request);
//! assert!(response.error.is_none());
//! assert!(response.file.is_empty());
//! ```

mod index;
mod plugin;
mod views;

pub use crate::index::{DescriptorIndex, EnumEntry, MessageEntry};
pub use crate::plugin::Config;
pub use crate::views::{field_type, ProtoFile};
