//! Request pipeline stages, outermost first:
//! identity → screening → auth (per route) → handler, with `recover`
//! wrapping the handlers.

mod auth;
mod identity;
mod recover;
mod screening;

pub use auth::require_auth;
pub use identity::{attach_identity, SESSION_COOKIE};
pub use recover::panic_response;
pub use screening::screen_request;
