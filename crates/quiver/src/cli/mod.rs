//! Subcommand implementations for the `quiver` binary.

pub mod browse;
pub mod context;
pub mod favorite;
pub mod folders;
pub mod locate;
pub mod output;
pub mod sync;
