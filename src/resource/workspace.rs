//! Workspaces

use crate::error::{Error, Result};
use crate::geoserver::client::{CreateOutcome, DeleteOutcome, GeoServerClient};
use crate::geoserver::paths::{ResourceConfig, ResourceKind};
use serde_json::{json, Value};

const KIND: ResourceKind = ResourceKind::Workspace;

pub struct WorkspaceManager<'a> {
    client: &'a GeoServerClient,
}

impl<'a> WorkspaceManager<'a> {
    pub fn new(client: &'a GeoServerClient) -> Self {
        Self { client }
    }

    pub async fn exists(&self, config: &ResourceConfig) -> Result<bool> {
        self.client.exists(KIND, config).await
    }

    pub async fn get(&self, config: &ResourceConfig) -> Result<Value> {
        self.client.fetch(KIND, config).await
    }

    pub async fn create(&self, config: &ResourceConfig) -> Result<CreateOutcome> {
        let name = self.client.name(KIND, config)?;
        self.client.create(KIND, config, json!({ "name": name })).await
    }

    /// Delete the workspace and everything in it
    pub async fn delete(&self, config: &ResourceConfig) -> Result<DeleteOutcome> {
        self.client.delete(KIND, config).await
    }

    /// Rename a workspace to the config's `newName`
    pub async fn rename(&self, config: &ResourceConfig) -> Result<()> {
        let new_name = config
            .extra_str("newName")
            .filter(|n| !n.is_empty())
            .ok_or_else(|| Error::validation("workspace rename requires 'newName'"))?;

        self.client
            .update(KIND, config, json!({ "name": new_name }), None)
            .await
    }
}
