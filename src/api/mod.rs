pub mod automation;
pub mod messages;
pub mod middleware;
pub mod router;
pub mod templates;

pub use middleware::*;
pub use router::build_router;
