//! Library crate for setconf.
//!
//! Takes configuration lines apart into key, assignment operator and value,
//! changes values in place and puts the lines back together without
//! disturbing whitespace or comments. The `setconf` binary is a thin
//! command-line layer on top of these modules.

pub mod edit;
pub mod error;
pub mod file;
pub mod line;
pub mod settings;
pub mod strutil;
pub mod syntax;

pub use edit::{AddOutcome, Adjust, Assignment, EditPolicy};
pub use error::{Error, Result};
pub use file::{ConfigFile, Encoding};
pub use line::{Line, LineEnding};
pub use syntax::Syntax;
