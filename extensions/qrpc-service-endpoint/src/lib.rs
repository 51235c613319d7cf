mod endpoint;
pub use endpoint::*;

pub mod error;

mod from_args;
pub use from_args::*;

mod service;
pub use service::*;
