//! Core library for the `forecast` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling for StormGlass
//! - The HTTP transport seam and its reqwest implementation
//! - The forecast client and the normalization of multi-source hourly data
//!
//! It is used by `forecast-cli`, but can also be reused by other binaries or services.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod model;

pub use client::{ForecastClient, normalize};
pub use config::{ClientConfig, Config, StormGlassConfig};
pub use error::ClientError;
pub use http::{HttpError, HttpRequest, HttpRequester, HttpResponse, ReqwestRequester};
pub use model::{Field, ForecastPoint, RawForecastResponse, RawHourPoint, Source};
