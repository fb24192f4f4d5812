//! Repository facade
//!
//! One object per GeoServer, handing out a manager for each resource family.
//! Cloning is cheap; clones share the same HTTP connection pool.

use crate::config::RepositoryConfig;
use crate::error::Result;
use crate::geoserver::client::{DeleteOutcome, GeoServerClient};
use crate::geoserver::paths::{ResourceConfig, ResourceKind};
use crate::resource::*;
use serde_json::Value;
use std::sync::Arc;

#[derive(Clone)]
pub struct Repository {
    client: Arc<GeoServerClient>,
}

impl Repository {
    pub fn new(config: RepositoryConfig) -> Result<Self> {
        let client = GeoServerClient::new(config)?;
        tracing::debug!("repository ready at {}", client.paths().base());
        Ok(Self {
            client: Arc::new(client),
        })
    }

    pub fn client(&self) -> &GeoServerClient {
        &self.client
    }

    pub fn config(&self) -> &RepositoryConfig {
        self.client.config()
    }

    pub fn workspaces(&self) -> WorkspaceManager<'_> {
        WorkspaceManager::new(&self.client)
    }

    pub fn datastores(&self) -> DatastoreManager<'_> {
        DatastoreManager::new(&self.client)
    }

    pub fn feature_types(&self) -> FeatureTypeManager<'_> {
        FeatureTypeManager::new(&self.client)
    }

    pub fn layers(&self) -> LayerManager<'_> {
        LayerManager::new(&self.client)
    }

    pub fn layer_groups(&self) -> LayerGroupManager<'_> {
        LayerGroupManager::new(&self.client)
    }

    pub fn coverage_stores(&self) -> CoverageStoreManager<'_> {
        CoverageStoreManager::new(&self.client)
    }

    pub fn coverages(&self) -> CoverageManager<'_> {
        CoverageManager::new(&self.client)
    }

    pub fn wms_stores(&self) -> ServiceStoreManager<'_> {
        ServiceStoreManager::new(&self.client, ServiceKind::Wms)
    }

    pub fn wmts_stores(&self) -> ServiceStoreManager<'_> {
        ServiceStoreManager::new(&self.client, ServiceKind::Wmts)
    }

    pub fn wms_layers(&self) -> ServiceLayerManager<'_> {
        ServiceLayerManager::new(&self.client, ServiceKind::Wms)
    }

    pub fn wmts_layers(&self) -> ServiceLayerManager<'_> {
        ServiceLayerManager::new(&self.client, ServiceKind::Wmts)
    }

    /// Layer groups over generated WMS child layers
    pub fn wms_external_layers(&self) -> ExternalLayerManager<'_> {
        ExternalLayerManager::new(&self.client, ServiceKind::Wms)
    }

    /// Layer groups over generated WMTS child layers
    pub fn wmts_external_layers(&self) -> ExternalLayerManager<'_> {
        ExternalLayerManager::new(&self.client, ServiceKind::Wmts)
    }

    pub fn styles(&self) -> StyleManager<'_> {
        StyleManager::new(&self.client)
    }

    // =========================================================================
    // Kind-generic operations, used where the kind is only known at runtime
    // =========================================================================

    pub async fn exists(&self, kind: ResourceKind, config: &ResourceConfig) -> Result<bool> {
        self.client.exists(kind, config).await
    }

    pub async fn get(&self, kind: ResourceKind, config: &ResourceConfig) -> Result<Value> {
        self.client.fetch(kind, config).await
    }

    pub async fn delete(&self, kind: ResourceKind, config: &ResourceConfig) -> Result<DeleteOutcome> {
        self.client.delete(kind, config).await
    }
}
