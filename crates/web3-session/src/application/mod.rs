//! # Application Module
//!
//! The lifecycle manager orchestrating the domain and outbound ports.

pub mod service;

pub use service::{HealthChecks, HostEnvironment, Web3Service};
