//! Styles
//!
//! Styles live globally or inside a workspace. A layer-scoped style is a
//! workspace style (in the layer's workspace) that is also attached to the
//! layer's list of alternative styles. Creating a style registers its
//! metadata (name and SLD filename); the SLD itself is uploaded separately.

use super::layer::LayerManager;
use crate::error::{Error, Result};
use crate::geoserver::client::{CreateOutcome, DeleteOutcome, GeoServerClient};
use crate::geoserver::http::Payload;
use crate::geoserver::paths::{Operation, ResourceConfig, ResourceKind};
use serde_json::{json, Value};

/// Where a style is registered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyleScope {
    Global,
    Workspace(String),
    Layer { workspace: String, layer: String },
}

impl StyleScope {
    /// Kind of the style resource itself
    fn kind(&self) -> ResourceKind {
        match self {
            Self::Global => ResourceKind::Style,
            Self::Workspace(_) | Self::Layer { .. } => ResourceKind::WorkspaceStyle,
        }
    }

    fn config(&self, name: &str) -> ResourceConfig {
        let config = ResourceConfig::named(name);
        match self {
            Self::Global => config,
            Self::Workspace(workspace) => config.in_workspace(workspace),
            Self::Layer { workspace, layer } => config.in_workspace(workspace).on_layer(layer),
        }
    }
}

pub struct StyleManager<'a> {
    client: &'a GeoServerClient,
}

impl<'a> StyleManager<'a> {
    pub fn new(client: &'a GeoServerClient) -> Self {
        Self { client }
    }

    /// For the layer scope: whether the style is attached to the layer
    pub async fn exists(&self, scope: &StyleScope, name: &str) -> Result<bool> {
        require_name(name)?;
        let config = scope.config(name);

        match scope {
            StyleScope::Layer { .. } => self.attached_to_layer(&config, name).await,
            _ => self.client.exists(scope.kind(), &config).await,
        }
    }

    pub async fn get(&self, scope: &StyleScope, name: &str) -> Result<Value> {
        require_name(name)?;
        self.client.fetch(scope.kind(), &scope.config(name)).await
    }

    /// Register the style's metadata (`<name>.sld`); for the layer scope also
    /// attach it to the layer
    pub async fn create(&self, scope: &StyleScope, name: &str) -> Result<CreateOutcome> {
        require_name(name)?;
        let config = scope.config(name);
        let body = json!({ "name": name, "filename": format!("{}.sld", name) });
        let outcome = self.client.create(scope.kind(), &config, body).await?;

        match scope {
            StyleScope::Layer { workspace, layer } => {
                if self.attached_to_layer(&config, name).await? {
                    return Ok(CreateOutcome::AlreadyPresent);
                }
                self.attach_to_layer(workspace, layer, name).await?;
                Ok(CreateOutcome::Created)
            }
            _ => Ok(outcome),
        }
    }

    /// Replace the style's SLD body
    pub async fn upload(&self, scope: &StyleScope, name: &str, sld: &str) -> Result<()> {
        require_name(name)?;
        require_sld(sld)?;

        let config = scope.config(name);
        let url = self.client.url(scope.kind(), &config, Operation::Delete)?;
        let response = self.client.http().put(&url, Payload::sld(sld)).await?;
        self.client
            .expect_status(response, 200, "upload", scope.kind(), &config)?;

        tracing::info!("uploaded SLD for style '{}' ({} bytes)", name, sld.len());
        Ok(())
    }

    /// Register the style (if needed) and upload its SLD
    pub async fn create_with_content(&self, scope: &StyleScope, name: &str, sld: &str) -> Result<()> {
        require_name(name)?;
        require_sld(sld)?;

        self.create(scope, name).await?;
        self.upload(scope, name, sld).await
    }

    /// Delete a global or workspace style together with its SLD file
    pub async fn delete(&self, scope: &StyleScope, name: &str) -> Result<DeleteOutcome> {
        require_name(name)?;
        if let StyleScope::Layer { .. } = scope {
            return Err(Error::validation(
                "layer styles are removed through their workspace scope",
            ));
        }

        let config = scope.config(name);
        if !self.client.exists(scope.kind(), &config).await? {
            return Ok(DeleteOutcome::NotPresent);
        }

        let url = format!(
            "{}?purge=true",
            self.client.url(scope.kind(), &config, Operation::Delete)?
        );
        let response = self.client.http().delete(&url).await?;
        self.client
            .expect_status(response, 200, "delete", scope.kind(), &config)?;

        tracing::info!("deleted style '{}'", name);
        Ok(DeleteOutcome::Deleted)
    }

    async fn attached_to_layer(&self, config: &ResourceConfig, name: &str) -> Result<bool> {
        let url = format!(
            "{}.json",
            self.client
                .url(ResourceKind::LayerStyle, config, Operation::Create)?
        );
        let response = self.client.http().get(&url).await?;
        if !response.is(200) {
            return Ok(false);
        }

        Ok(style_names(&response.json()?)
            .iter()
            .any(|style| style == name || style.ends_with(&format!(":{}", name))))
    }

    async fn attach_to_layer(&self, workspace: &str, layer: &str, name: &str) -> Result<()> {
        let layer_config = ResourceConfig::named(layer).in_workspace(workspace);
        LayerManager::new(self.client)
            .add_style(&layer_config, &format!("{}:{}", workspace, name))
            .await
    }
}

/// Names from a `{ "styles": { "style": [ { "name": .. } ] } }` listing.
///
/// An empty listing comes back as `{ "styles": "" }`.
fn style_names(listing: &Value) -> Vec<String> {
    listing
        .get("styles")
        .and_then(|v| v.get("style"))
        .and_then(|v| v.as_array())
        .map(|styles| {
            styles
                .iter()
                .filter_map(|s| s.get("name").and_then(|n| n.as_str()))
                .map(|s| s.to_string())
                .collect()
        })
        .unwrap_or_default()
}

fn require_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::validation("style name is required"));
    }
    Ok(())
}

fn require_sld(sld: &str) -> Result<()> {
    if sld.trim().is_empty() {
        return Err(Error::validation("SLD body is required"));
    }
    Ok(())
}
