//! SafeGuard CLI library.
//!
//! Terminal styling and output rendering shared by the `safeguard-cli`
//! subcommands.

pub mod output;
pub mod terminal;
