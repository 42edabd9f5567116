//! Clients for the remote promotion service.

mod http;
mod notify;
mod promotions;

pub use http::*;
pub use notify::*;
pub use promotions::*;
