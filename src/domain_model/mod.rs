mod borrower;
mod payload;
mod session;

pub use borrower::*;
pub use payload::*;
pub use session::*;
