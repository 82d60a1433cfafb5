//! HTTP surface of CreateMate.
//!
//! | Route | Purpose |
//! |-------|---------|
//! | `POST /user-input` | Start a session |
//! | `POST /feedback` | Rate the initial post |
//! | `GET /state` | Current session snapshot |
//! | `GET /agents` | Per-agent metrics |
//! | `GET /health` | Liveness |

/// Mapping of errors onto HTTP responses.
pub mod error;
/// Router construction and handlers.
pub mod server;

pub use error::ApiError;
pub use server::{AppState, GatewayServer};
