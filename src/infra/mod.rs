mod api;
mod cache;
mod config;
mod dispatch;
mod tracing_init;

#[cfg(test)]
pub(crate) mod test_server;

pub use api::*;
pub use cache::*;
pub use config::*;
pub use dispatch::*;
pub use tracing_init::*;
