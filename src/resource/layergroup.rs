//! Layer groups
//!
//! Unlike most resources, creating a group that already exists is a
//! conflict rather than a no-op: the member list would silently differ.

use crate::error::{Error, Result};
use crate::geoserver::client::{DeleteOutcome, GeoServerClient};
use crate::geoserver::paths::{ResourceConfig, ResourceKind};
use serde_json::{json, Value};

const KIND: ResourceKind = ResourceKind::LayerGroup;

pub struct LayerGroupManager<'a> {
    client: &'a GeoServerClient,
}

impl<'a> LayerGroupManager<'a> {
    pub fn new(client: &'a GeoServerClient) -> Self {
        Self { client }
    }

    pub async fn exists(&self, config: &ResourceConfig) -> Result<bool> {
        self.client.exists(KIND, config).await
    }

    pub async fn get(&self, config: &ResourceConfig) -> Result<Value> {
        self.client.fetch(KIND, config).await
    }

    /// Create a group over `members` (layer names within the group's workspace)
    pub async fn create(&self, config: &ResourceConfig, members: &[String]) -> Result<()> {
        let body = self.body(config, members)?;
        self.client.create_strict(KIND, config, body).await
    }

    /// Replace the group's member list
    pub async fn update(&self, config: &ResourceConfig, members: &[String]) -> Result<()> {
        let body = self.body(config, members)?;
        self.client.update(KIND, config, body, None).await
    }

    pub async fn delete(&self, config: &ResourceConfig) -> Result<DeleteOutcome> {
        self.client.delete(KIND, config).await
    }

    fn body(&self, config: &ResourceConfig, members: &[String]) -> Result<Value> {
        if members.is_empty() {
            return Err(Error::validation(format!(
                "layer group '{}' needs at least one layer",
                config.display_name()
            )));
        }

        let name = self.client.name(KIND, config)?;
        let workspace = self.client.paths().workspace(KIND, config)?;
        let title = config.extra_str("title").unwrap_or(&name).to_string();
        Ok(group_body(&workspace, &name, &title, members))
    }
}

pub fn group_body(workspace: &str, name: &str, title: &str, members: &[String]) -> Value {
    let published: Vec<Value> = members
        .iter()
        .map(|member| json!({ "@type": "layer", "name": format!("{}:{}", workspace, member) }))
        .collect();

    json!({
        "name": name,
        "mode": "SINGLE",
        "title": title,
        "workspace": { "name": workspace },
        "publishables": { "published": published },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_body_qualifies_members() {
        let body = group_body("ws", "grp", "Group", &["a".to_string(), "c".to_string()]);
        assert_eq!(body["publishables"]["published"][0]["name"], "ws:a");
        assert_eq!(body["publishables"]["published"][1]["name"], "ws:c");
        assert_eq!(body["mode"], "SINGLE");
        assert_eq!(body["workspace"]["name"], "ws");
    }
}
