//! Client library for managing GeoServer resources through its REST API.
//!
//! ## Architecture
//!
//! - [`geoserver`]: path resolution, HTTP dispatch and the shared
//!   existence-checked CRUD pattern
//! - [`resource`]: one manager per resource family, plus the composite
//!   WMS/WMTS layer group orchestration
//! - [`repository`]: the [`Repository`] facade bundling all managers
//! - [`config`]: immutable connection settings
//!
//! ```ignore
//! use gsrest::{Repository, RepositoryConfig, ResourceConfig};
//!
//! async fn example() -> gsrest::Result<()> {
//!     let config = RepositoryConfig::load("gsrest.yaml".as_ref())?;
//!     let repo = Repository::new(config)?;
//!     repo.workspaces().create(&ResourceConfig::named("geoportal")).await?;
//!     repo.datastores().create(&ResourceConfig::named("flat")).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod geoserver;
pub mod repository;
pub mod resource;

pub use config::{ConnectionConfig, RepositoryConfig};
pub use error::{Error, Result};
pub use geoserver::{CreateOutcome, DeleteOutcome, GeoServerClient, ResourceConfig, ResourceKind};
pub use repository::Repository;
pub use resource::{ExternalServiceLayer, ServiceKind, StyleScope};
