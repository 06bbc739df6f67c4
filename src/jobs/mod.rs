pub mod backoff;
pub mod worker;
pub mod retry;
pub mod summary;

pub use backoff::*;
pub use worker::*;
pub use retry::*;
pub use summary::*;
