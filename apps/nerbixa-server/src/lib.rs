//! Nerbixa generation proxy
//!
//! Library half of the server binary: the router and the proxy handler, kept
//! separate so they can be driven in-process by tests.

pub mod proxy;
pub mod router;

pub use proxy::ProxyState;
pub use router::create_router;
