//! Datastores
//!
//! Connection parameters come from the config's `connectionParameters`
//! field, or from the `database` section of the repository configuration
//! under the datastore's name. They are passed through without inspection.

use crate::error::{Error, Result};
use crate::geoserver::client::{merge_extra, CreateOutcome, DeleteOutcome, GeoServerClient};
use crate::geoserver::paths::{ResourceConfig, ResourceKind};
use serde_json::{json, Map, Value};

const KIND: ResourceKind = ResourceKind::Datastore;

pub struct DatastoreManager<'a> {
    client: &'a GeoServerClient,
}

impl<'a> DatastoreManager<'a> {
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
        let params = self
            .connection_parameters(&name, config)
            .ok_or_else(|| {
                Error::validation(format!("no connection parameters for datastore '{}'", name))
            })?;

        let body = self.body(&name, config, Some(params))?;
        self.client.create(KIND, config, body).await
    }

    /// Delete the datastore and its feature types
    pub async fn delete(&self, config: &ResourceConfig) -> Result<DeleteOutcome> {
        self.client.delete(KIND, config).await
    }

    pub async fn update(&self, config: &ResourceConfig) -> Result<()> {
        let name = self.client.name(KIND, config)?;
        let params = config
            .extra
            .get("connectionParameters")
            .and_then(|v| v.as_object());
        let body = self.body(&name, config, params)?;
        self.client.update(KIND, config, body, None).await
    }

    fn connection_parameters<'c>(
        &'c self,
        name: &str,
        config: &'c ResourceConfig,
    ) -> Option<&'c Map<String, Value>> {
        config
            .extra
            .get("connectionParameters")
            .and_then(|v| v.as_object())
            .or_else(|| self.client.config().connection_parameters(name))
    }

    fn body(
        &self,
        name: &str,
        config: &ResourceConfig,
        params: Option<&Map<String, Value>>,
    ) -> Result<Value> {
        let workspace = self.client.paths().workspace(KIND, config)?;
        let mut body = json!({
            "name": name,
            "enabled": true,
            "workspace": { "name": workspace },
        });

        if let Some(params) = params {
            body["connectionParameters"] = connection_entries(params);
        }

        merge_extra(&mut body, config, &["connectionParameters"]);
        Ok(body)
    }
}

/// `{ "entry": [ { "@key": k, "$": v }, ... ] }` with every value as a string
pub fn connection_entries(params: &Map<String, Value>) -> Value {
    let entries: Vec<Value> = params
        .iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            json!({ "@key": key, "$": value })
        })
        .collect();

    json!({ "entry": entries })
}
