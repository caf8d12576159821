//! Flight delay prediction service
//!
//! HTTP front for the prediction engine in `predictor-lib`, plus the
//! configuration and startup wiring used by the `ml-service` binary.

pub mod api;
pub mod config;
pub mod error;
pub mod startup;

pub use api::{create_router, serve, AppState, PredictRequest, PredictResponse};
pub use config::{BaselineKind, ServiceConfig};
pub use error::{ApiError, ErrorResponse};
