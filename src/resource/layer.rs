//! Layers
//!
//! A layer is the published face of a feature type, addressed as
//! `{workspace}:{name}`. Creating a missing layer publishes the feature type
//! behind it.

use super::featuretype;
use crate::error::Result;
use crate::geoserver::client::{merge_extra, CreateOutcome, DeleteOutcome, GeoServerClient};
use crate::geoserver::http::Payload;
use crate::geoserver::paths::{Operation, ResourceConfig, ResourceKind};
use serde_json::{json, Value};

const KIND: ResourceKind = ResourceKind::Layer;

pub struct LayerManager<'a> {
    client: &'a GeoServerClient,
}

impl<'a> LayerManager<'a> {
    pub fn new(client: &'a GeoServerClient) -> Self {
        Self { client }
    }

    pub async fn exists(&self, config: &ResourceConfig) -> Result<bool> {
        self.client.exists(KIND, config).await
    }

    pub async fn get(&self, config: &ResourceConfig) -> Result<Value> {
        self.client.fetch(KIND, config).await
    }

    /// Publish the layer's feature type unless the layer is already there
    pub async fn create(&self, config: &ResourceConfig) -> Result<CreateOutcome> {
        if self.exists(config).await? {
            tracing::debug!("layer '{}' already exists", config.display_name());
            return Ok(CreateOutcome::AlreadyPresent);
        }

        let name = self.client.name(KIND, config)?;
        let body = featuretype::body(name, config);
        self.client
            .post_new(ResourceKind::FeatureType, config, body)
            .await?;
        Ok(CreateOutcome::Created)
    }

    pub async fn delete(&self, config: &ResourceConfig) -> Result<DeleteOutcome> {
        self.client.delete(KIND, config).await
    }

    /// PUT the config's extra fields (`defaultStyle`, `enabled`, ...) onto the layer
    pub async fn update(&self, config: &ResourceConfig) -> Result<()> {
        let mut body = json!({ "name": self.client.name(KIND, config)? });
        merge_extra(&mut body, config, &[]);
        self.client.update(KIND, config, body, None).await
    }

    /// Register `style` (plain or `ws:name`) as an additional style of the layer
    pub async fn add_style(&self, config: &ResourceConfig, style: &str) -> Result<()> {
        let layer = self.client.name(KIND, config)?;
        let workspace = self.client.paths().workspace(KIND, config)?;
        let style_config = ResourceConfig::named(style)
            .in_workspace(workspace)
            .on_layer(layer.as_str());

        let url = self
            .client
            .url(ResourceKind::LayerStyle, &style_config, Operation::Create)?;
        let body = json!({ "style": { "name": style } });
        let response = self.client.http().post(&url, Payload::Json(body)).await?;
        self.client
            .expect_status(response, 201, "create", ResourceKind::LayerStyle, &style_config)?;

        tracing::info!("added style '{}' to layer '{}'", style, layer);
        Ok(())
    }
}
