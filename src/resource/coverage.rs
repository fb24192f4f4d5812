//! Coverage stores and coverages (raster data)

use crate::error::{Error, Result};
use crate::geoserver::client::{merge_extra, CreateOutcome, DeleteOutcome, GeoServerClient};
use crate::geoserver::http::Payload;
use crate::geoserver::paths::{Operation, ResourceConfig, ResourceKind};
use serde_json::{json, Value};

/// Store type used by file based creation when none is given
pub const DEFAULT_STORE_TYPE: &str = "imagepyramid";

pub struct CoverageStoreManager<'a> {
    client: &'a GeoServerClient,
}

impl<'a> CoverageStoreManager<'a> {
    const KIND: ResourceKind = ResourceKind::CoverageStore;

    pub fn new(client: &'a GeoServerClient) -> Self {
        Self { client }
    }

    pub async fn exists(&self, config: &ResourceConfig) -> Result<bool> {
        self.client.exists(Self::KIND, config).await
    }

    pub async fn get(&self, config: &ResourceConfig) -> Result<Value> {
        self.client.fetch(Self::KIND, config).await
    }

    /// Register a store from its JSON description (`type`, `url`, ...)
    pub async fn create(&self, config: &ResourceConfig) -> Result<CreateOutcome> {
        let body = self.body(config)?;
        self.client.create(Self::KIND, config, body).await
    }

    /// Register a store backed by a file or directory on the server.
    ///
    /// The path is PUT as plain text to `<store>/external.<store_type>`.
    pub async fn create_from_file(
        &self,
        config: &ResourceConfig,
        file: &str,
        store_type: Option<&str>,
    ) -> Result<CreateOutcome> {
        if file.trim().is_empty() {
            return Err(Error::validation("coverage store creation requires a file path"));
        }

        if self.exists(config).await? {
            tracing::debug!("coverage store '{}' already exists", config.display_name());
            return Ok(CreateOutcome::AlreadyPresent);
        }

        let url = format!(
            "{}/external.{}",
            self.client.url(Self::KIND, config, Operation::Delete)?,
            store_type.unwrap_or(DEFAULT_STORE_TYPE)
        );
        let response = self.client.http().put(&url, Payload::text(file)).await?;
        self.client
            .expect_status(response, 201, "create", Self::KIND, config)?;

        tracing::info!("created coverage store '{}' from {}", config.display_name(), file);
        Ok(CreateOutcome::Created)
    }

    pub async fn update(&self, config: &ResourceConfig) -> Result<()> {
        let body = self.body(config)?;
        self.client.update(Self::KIND, config, body, None).await
    }

    /// Delete the store and its coverages
    pub async fn delete(&self, config: &ResourceConfig) -> Result<DeleteOutcome> {
        self.client.delete(Self::KIND, config).await
    }

    fn body(&self, config: &ResourceConfig) -> Result<Value> {
        let name = self.client.name(Self::KIND, config)?;
        let workspace = self.client.paths().workspace(Self::KIND, config)?;
        let mut body = json!({
            "name": name,
            "type": config.extra_str("type").unwrap_or("ImagePyramid"),
            "enabled": true,
            "workspace": { "name": workspace },
        });
        merge_extra(&mut body, config, &[]);
        Ok(body)
    }
}

pub struct CoverageManager<'a> {
    client: &'a GeoServerClient,
}

impl<'a> CoverageManager<'a> {
    const KIND: ResourceKind = ResourceKind::Coverage;

    pub fn new(client: &'a GeoServerClient) -> Self {
        Self { client }
    }

    pub async fn exists(&self, config: &ResourceConfig) -> Result<bool> {
        self.client.exists(Self::KIND, config).await
    }

    pub async fn get(&self, config: &ResourceConfig) -> Result<Value> {
        self.client.fetch(Self::KIND, config).await
    }

    pub async fn create(&self, config: &ResourceConfig) -> Result<CreateOutcome> {
        let name = self.client.name(Self::KIND, config)?;
        let native = config.extra_str("nativeName").unwrap_or(&name).to_string();
        let title = config.extra_str("title").unwrap_or(&name).to_string();
        let mut body = json!({
            "name": name,
            "nativeName": native,
            "title": title,
            "enabled": true,
        });
        merge_extra(&mut body, config, &[]);
        self.client.create(Self::KIND, config, body).await
    }

    pub async fn update(&self, config: &ResourceConfig) -> Result<()> {
        let mut body = json!({ "name": self.client.name(Self::KIND, config)? });
        merge_extra(&mut body, config, &[]);
        self.client.update(Self::KIND, config, body, None).await
    }

    pub async fn delete(&self, config: &ResourceConfig) -> Result<DeleteOutcome> {
        self.client.delete(Self::KIND, config).await
    }
}
