//! Template source parsers.
//!
//! - `comment`: removes template and HTML comments, preserving line numbers
//! - `template`: regex extraction of includes, blocks and directives

pub mod comment;
pub mod template;

pub use comment::strip_comments;
pub use template::{extract_dependencies, parse_template};
