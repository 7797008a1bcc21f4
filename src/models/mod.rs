pub mod finding;
pub mod session;
pub mod summary;

pub use finding::*;
pub use session::*;
pub use summary::*;
