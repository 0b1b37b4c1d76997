pub mod client;
pub mod config;
pub mod error;
#[cfg(feature = "cli")]
pub mod printer;
pub mod response;

pub use client::HttpClient;
pub use error::ClientError;
pub use response::{RequestSnapshot, ResponseSnapshot};
