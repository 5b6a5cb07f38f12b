//! Gateway routes.

pub mod flows;
pub mod health;
pub mod proxy;

pub use flows::flow_routes;
pub use health::health_routes;
pub use proxy::provider_proxy_routes;
