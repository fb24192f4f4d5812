//! Cascaded WMS and WMTS services
//!
//! Both protocols share one shape on the server: a store holding the remote
//! capabilities URL and credentials, and service layers re-publishing the
//! remote layers. [`ServiceKind`] picks the protocol.

use crate::error::{Error, Result};
use crate::geoserver::client::{merge_extra, CreateOutcome, DeleteOutcome, GeoServerClient};
use crate::geoserver::paths::{ResourceConfig, ResourceKind};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    Wms,
    Wmts,
}

impl ServiceKind {
    pub fn store_kind(&self) -> ResourceKind {
        match self {
            Self::Wms => ResourceKind::WmsStore,
            Self::Wmts => ResourceKind::WmtsStore,
        }
    }

    pub fn layer_kind(&self) -> ResourceKind {
        match self {
            Self::Wms => ResourceKind::WmsLayer,
            Self::Wmts => ResourceKind::WmtsLayer,
        }
    }

    /// Store `type` as the server names it
    pub fn store_type(&self) -> &'static str {
        match self {
            Self::Wms => "WMS",
            Self::Wmts => "WMTS",
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Wms => "wms",
            Self::Wmts => "wmts",
        })
    }
}

/// Stores pointing at a remote WMS or WMTS
pub struct ServiceStoreManager<'a> {
    client: &'a GeoServerClient,
    kind: ServiceKind,
}

impl<'a> ServiceStoreManager<'a> {
    pub fn new(client: &'a GeoServerClient, kind: ServiceKind) -> Self {
        Self { client, kind }
    }

    pub async fn exists(&self, config: &ResourceConfig) -> Result<bool> {
        self.client.exists(self.kind.store_kind(), config).await
    }

    pub async fn get(&self, config: &ResourceConfig) -> Result<Value> {
        self.client.fetch(self.kind.store_kind(), config).await
    }

    /// Register the store; fails with a conflict if it is already there.
    ///
    /// The config needs `url` (capabilities URL) and may carry
    /// `username` / `password` for the remote service.
    pub async fn create(&self, config: &ResourceConfig) -> Result<()> {
        if config.extra_str("url").map_or(true, str::is_empty) {
            return Err(Error::validation(format!(
                "{} store '{}' requires a capabilities url",
                self.kind,
                config.display_name()
            )));
        }

        let body = self.body(config)?;
        self.client
            .create_strict(self.kind.store_kind(), config, body)
            .await
    }

    pub async fn update(&self, config: &ResourceConfig) -> Result<()> {
        let body = self.body(config)?;
        self.client
            .update(self.kind.store_kind(), config, body, None)
            .await
    }

    /// Delete the store and every layer cascaded from it
    pub async fn delete(&self, config: &ResourceConfig) -> Result<DeleteOutcome> {
        self.client.delete(self.kind.store_kind(), config).await
    }

    fn body(&self, config: &ResourceConfig) -> Result<Value> {
        let kind = self.kind.store_kind();
        let name = self.client.name(kind, config)?;
        let workspace = self.client.paths().workspace(kind, config)?;

        let mut body = json!({
            "name": name,
            "type": self.kind.store_type(),
            "enabled": true,
            "workspace": { "name": workspace },
        });
        if let Some(url) = config.extra_str("url") {
            body["capabilitiesURL"] = json!(url);
        }
        if let Some(user) = config.extra_str("username") {
            body["user"] = json!(user);
        }
        if let Some(password) = config.extra_str("password") {
            body["password"] = json!(password);
        }

        merge_extra(&mut body, config, &["url", "username", "password"]);
        Ok(body)
    }
}

/// Individual layers cascaded from a WMS or WMTS store
pub struct ServiceLayerManager<'a> {
    client: &'a GeoServerClient,
    kind: ServiceKind,
}

impl<'a> ServiceLayerManager<'a> {
    pub fn new(client: &'a GeoServerClient, kind: ServiceKind) -> Self {
        Self { client, kind }
    }

    pub async fn exists(&self, config: &ResourceConfig) -> Result<bool> {
        self.client.exists(self.kind.layer_kind(), config).await
    }

    pub async fn get(&self, config: &ResourceConfig) -> Result<Value> {
        self.client.fetch(self.kind.layer_kind(), config).await
    }

    pub async fn create(&self, config: &ResourceConfig) -> Result<CreateOutcome> {
        let body = self.body(config)?;
        self.client
            .create(self.kind.layer_kind(), config, body)
            .await
    }

    /// POST without checking first
    pub(crate) async fn create_unchecked(&self, config: &ResourceConfig) -> Result<()> {
        let body = self.body(config)?;
        self.client
            .post_new(self.kind.layer_kind(), config, body)
            .await
    }

    pub async fn delete(&self, config: &ResourceConfig) -> Result<DeleteOutcome> {
        self.client.delete(self.kind.layer_kind(), config).await
    }

    fn body(&self, config: &ResourceConfig) -> Result<Value> {
        let name = self.client.name(self.kind.layer_kind(), config)?;
        let native = config.extra_str("nativeName").unwrap_or(&name).to_string();
        let title = config.extra_str("title").unwrap_or(&native).to_string();

        let mut body = json!({
            "name": name,
            "nativeName": native,
            "title": title,
            "enabled": true,
        });
        merge_extra(&mut body, config, &[]);
        Ok(body)
    }
}
