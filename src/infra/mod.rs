//! Infrastructure layer
//!
//! Handles all I/O operations: filesystem, external processes, and the
//! zig and fpm command-line tools.
//! This module is the only place where external programs are spawned.

pub mod filesystem;
pub mod fpm;
pub mod process;
pub mod toolchain;
