pub mod client;
pub mod command;
pub mod executor;

pub use client::{
    AppBuildError, CheckResult, DoctorReport, ImageError, RegistryError, ServiceError,
    TaskDefinitionError, ToolCheck, ToolClient,
};
pub use command::CommandError;
pub use executor::{CommandExecutor, RealExecutor};
