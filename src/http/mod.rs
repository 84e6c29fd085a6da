//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, HTTP/1.1 and h2c)
//!     → request.rs (host, target, headers)
//!     → [routing classifies the request]
//!     → [access log line written]
//!     → dispatch.rs (pick primary or default forwarder)
//!     → forward.rs (rewrite for the origin, stream request and response)
//!     → Send to client
//! ```

pub mod dispatch;
pub mod forward;
pub mod request;
pub mod server;
pub mod upstream;

pub use dispatch::Dispatcher;
pub use forward::UpstreamForwarder;
pub use request::RequestView;
pub use server::HttpServer;
pub use upstream::UpstreamTarget;
