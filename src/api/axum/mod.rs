mod middleware;

pub use middleware::{ErrorHandler, SessionAuth, require_session};
