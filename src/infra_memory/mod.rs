//! In-process adapters for the storage ports. Used by the `memory`
//! backends and by tests.

mod borrower_repo_memory;
mod session_store_memory;

pub use borrower_repo_memory::*;
pub use session_store_memory::*;
