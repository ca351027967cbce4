//! Request handlers, one module per resource.

pub mod healthcheck;
pub mod products;
pub mod tokens;
pub mod users;
