//! Traits for pluggable collaborators
//!
//! ```text
//! Storage:
//!   - SessionStore: get/put/delete/list sessions with idle expiry
//!
//! Time:
//!   - Clock: source of "today" for relative date resolution
//! ```

mod clock;
mod session_store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use session_store::SessionStore;
