// store

mod session_store;

pub use session_store::*;

// repo

mod borrower_repo;

pub use borrower_repo::*;
