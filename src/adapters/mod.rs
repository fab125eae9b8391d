//! Adapters layer: Concrete implementations of ports.
//!
//! - `builtin`: the compiled-in reference table
//! - `json_file`: reference curves loaded from a JSON file on disk

pub mod builtin;
pub mod json_file;

pub use builtin::BuiltinReference;
pub use json_file::JsonReferenceFile;
