//! Resource managers
//!
//! One manager per resource family, each a thin borrow of the shared
//! [`GeoServerClient`](crate::geoserver::GeoServerClient). Managers resolve
//! URLs, build request bodies and apply the existence-checked create/delete
//! contract.
//!
//! # Architecture
//!
//! - [`workspace`], [`datastore`], [`featuretype`], [`layer`] - idempotent CRUD
//! - [`layergroup`] - groups, strict create
//! - [`coverage`] - raster stores and coverages
//! - [`service`] - WMS/WMTS stores and cascaded layers
//! - [`external`] - layer groups over generated WMS/WMTS child layers
//! - [`style`] - global, workspace and layer styles
//! - [`throttle`] - bounded-concurrency batches

pub mod coverage;
pub mod datastore;
pub mod external;
pub mod featuretype;
pub mod layer;
pub mod layergroup;
pub mod service;
pub mod style;
pub mod throttle;
pub mod workspace;

pub use coverage::{CoverageManager, CoverageStoreManager};
pub use datastore::DatastoreManager;
pub use external::{sanitize, ChildLayer, ExternalLayerManager, ExternalServiceLayer};
pub use featuretype::FeatureTypeManager;
pub use layer::LayerManager;
pub use layergroup::LayerGroupManager;
pub use service::{ServiceKind, ServiceLayerManager, ServiceStoreManager};
pub use style::{StyleManager, StyleScope};
pub use workspace::WorkspaceManager;
