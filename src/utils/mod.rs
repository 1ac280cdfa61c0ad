//! Shared utilities: atomic writes, directory copies, script permissions.

pub mod fs;

pub use fs::{make_executable, replace_dir, write_atomic};
