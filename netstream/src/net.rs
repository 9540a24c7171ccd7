//! Network primitives: endpoints, resolution, socket setup and readiness.
//!
//! Only [`Endpoint`], [`Protocol`] and [`resolve`] are public; socket setup
//! is reserved for servers and clients, which hand the result to streams.

pub mod endpoint;
pub(crate) mod readiness;
pub mod resolve;
pub(crate) mod socket;

pub use endpoint::{Endpoint, Protocol};
pub use resolve::resolve;
