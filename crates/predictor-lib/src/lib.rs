//! Prediction library for the Flight Sentinel ML service
//!
//! This crate provides the core functionality for:
//! - Feature extraction from flight queries
//! - Model loading and scoring behind a uniform adapter
//! - Delay probability prediction with graceful fallbacks
//! - Latest flight status tracking
//! - Health checks and observability

pub mod error;
pub mod flights;
pub mod health;
pub mod models;
pub mod observability;
pub mod predictor;

pub use error::{ModelError, ValidationError};
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use models::*;
pub use observability::{ServiceMetrics, StructuredLogger};
