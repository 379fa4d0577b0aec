//! Filesystem primitives used by the transfer executor.
//! Moves never replace an existing destination; callers check vacancy first.

mod atomic;
mod copy;
mod file_move;
mod helpers;
mod io_copy;
mod meta;
mod util;

pub use file_move::{move_file, MoveMethod};
pub use helpers::io_error_with_help;
