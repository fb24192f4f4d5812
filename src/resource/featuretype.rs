//! Feature types published from datastores

use crate::error::Result;
use crate::geoserver::client::{merge_extra, CreateOutcome, DeleteOutcome, GeoServerClient};
use crate::geoserver::paths::{ResourceConfig, ResourceKind};
use serde_json::{json, Value};

const KIND: ResourceKind = ResourceKind::FeatureType;

/// Query asking the server to recompute both bounding boxes on update
pub const RECALCULATE_BBOX: &str = "recalculate=nativebbox,latlonbbox";

pub struct FeatureTypeManager<'a> {
    client: &'a GeoServerClient,
}

impl<'a> FeatureTypeManager<'a> {
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
        let body = body(self.client.name(KIND, config)?, config);
        self.client.create(KIND, config, body).await
    }

    pub async fn delete(&self, config: &ResourceConfig) -> Result<DeleteOutcome> {
        self.client.delete(KIND, config).await
    }

    /// Update a feature type, optionally recomputing its bounding boxes
    pub async fn update(&self, config: &ResourceConfig, recalculate_bbox: bool) -> Result<()> {
        let mut body = json!({ "name": self.client.name(KIND, config)? });
        merge_extra(&mut body, config, &[]);

        let query = recalculate_bbox.then_some(RECALCULATE_BBOX);
        self.client.update(KIND, config, body, query).await
    }
}

/// Creation body; `nativeName` and `title` default to the name
pub(crate) fn body(name: String, config: &ResourceConfig) -> Value {
    let native = config.extra_str("nativeName").unwrap_or(&name).to_string();
    let title = config.extra_str("title").unwrap_or(&name).to_string();

    let mut body = json!({
        "name": name,
        "nativeName": native,
        "title": title,
        "enabled": true,
    });
    merge_extra(&mut body, config, &[]);
    body
}
