pub mod ast;
pub mod go;

pub use ast::{AstLocation, FileId, ParsedFile, TextRange};
pub use go::parse_go_file;
