//! Command synthesis for terraform and terragrunt
//!
//! Builders accumulate and validate configuration, services render it into
//! the exact token array the wrapped CLI expects, and `format` turns that
//! array into display strings. Nothing here performs I/O.

pub mod command;
pub mod shared;
pub mod flags;
pub mod format;
pub mod service;
pub mod terraform;
pub mod terragrunt;

pub use command::{TerraformCommand, TerragruntCommand, Tool};
pub use shared::{CoreConfig, SharedBuilder};
pub use service::IacService;
pub use terraform::{TerraformBuilder, TerraformService};
pub use terragrunt::{TerragruntBuilder, TerragruntOptions, TerragruntService};
