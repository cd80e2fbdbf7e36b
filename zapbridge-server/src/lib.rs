//! Zapbridge HTTP layer.
//!
//! Exposes the LNURL-pay surface over a [`zapbridge_lib::PaymentBridge`]:
//! the LUD-06 payRequest endpoint, the invoice callback, a LUD-21-style
//! verify endpoint and a static demo page. This crate owns the mapping from
//! bridge error kinds to HTTP status codes and the `{status:"ERROR"}`
//! envelope every failure renders as.

pub mod config;
pub mod routes;

pub use config::ServerConfig;
pub use routes::{router, AppState};
