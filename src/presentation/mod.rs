pub mod config;
pub mod handlers;
pub mod router;
pub mod state;

pub use self::config::{Environment, Settings};
pub use router::{create_router, create_router_with_body_limit};
pub use state::AppState;
