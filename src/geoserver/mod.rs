//! GeoServer REST plumbing
//!
//! # Module Structure
//!
//! - [`paths`] - Resource kinds and REST URL resolution
//! - [`http`] - Request dispatch with auth and timeout
//! - [`client`] - Shared client and the existence-checked CRUD pattern
//!
//! # Example
//!
//! ```ignore
//! use gsrest::geoserver::{GeoServerClient, ResourceConfig, ResourceKind};
//!
//! async fn example(client: &GeoServerClient) -> gsrest::Result<()> {
//!     let ws = ResourceConfig::named("geoportal");
//!     let present = client.exists(ResourceKind::Workspace, &ws).await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod http;
pub mod paths;

pub use client::{CreateOutcome, DeleteOutcome, GeoServerClient};
pub use http::{Dispatcher, Payload, RestResponse};
pub use paths::{Operation, PathResolver, ResourceConfig, ResourceKind};
