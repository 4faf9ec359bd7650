//! Core types for ecsroll.
//!
//! This crate resolves the deployment configuration from the environment
//! ([`DeployConfig`]), builds ECR image references ([`ImageRef`]), and
//! rewrites fetched ECS task definitions for re-registration
//! ([`task_definition`]).

pub mod config;
pub mod error;
pub mod image;
pub mod task_definition;

pub use config::{Credentials, DeployConfig};
pub use error::{Error, Result};
pub use image::{ImageRef, ImageTag};
