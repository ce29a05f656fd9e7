// jamfsync-api: Async Rust client for the Jamf Pro APIs (Classic + Pro)

pub mod auth;
pub mod classic;
pub mod client;
pub mod error;
pub mod models;
pub mod pro;
pub mod transport;

pub use auth::ClientCredentials;
pub use client::JamfClient;
pub use error::Error;
pub use pro::ComputerSection;
pub use transport::{TlsMode, TransportConfig};
