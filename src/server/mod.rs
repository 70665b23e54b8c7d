pub mod guards;
pub mod router;
pub mod routes;
pub mod shutdown;

pub use router::{DashState, dash_router};
pub use shutdown::{ShutdownReason, shutdown_signal};
