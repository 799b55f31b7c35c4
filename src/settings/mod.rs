//! Startup configuration: a TOML file chosen by `--settings`, overridable
//! through `LENDGATE__<SECTION>__<KEY>` environment variables.
//! See `bin/token_demo.rs` for a binary that loads it.

mod cli;
pub use clap::Parser;
pub use cli::*;

mod settings;
pub use settings::*;
