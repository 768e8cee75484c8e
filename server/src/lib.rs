//! # Sparks API server
//!
//! HTTP front end for idea capture.
//!
//! ## Endpoints
//!
//! - `POST /ideas/process` - raw text to a structured suggestion (not stored)
//! - `GET|POST /ideas`, `PATCH|DELETE /ideas/{id}` - stored ideas
//! - `GET|POST /categories`, `DELETE /categories/{id}` - categories
//! - `GET /health` - liveness plus store probe
//! - `GET /metrics` - Prometheus metrics
//! - `GET /openapi.json` - API description

pub mod auth;
pub mod error;
pub mod handlers;
pub mod openapi;
pub mod routes;
pub mod server;
pub mod state;
pub mod telemetry;

pub use error::ApiError;
pub use routes::create_router;
pub use server::SparksServer;
pub use state::AppState;
