pub mod command;
pub mod delim;
pub mod interpolate;
pub mod program;
pub mod tokenize;

pub use command::Command;
pub use delim::{find_match, find_open};
pub use interpolate::{Lookup, interpolate};
pub use program::{Program, split_commands};
pub use tokenize::tokenize;
