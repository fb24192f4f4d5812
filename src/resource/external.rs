//! External service layer groups
//!
//! An external service layer is one layer group on top of N cascaded
//! layers from a WMS or WMTS store. Every child is a pair on the server: the
//! service layer under the store and the published layer it produces. The
//! server refuses groups over missing layers and refuses to drop layers a
//! group still references, so children are created before the group and
//! removed after it.

use super::layergroup::LayerGroupManager;
use super::service::{ServiceKind, ServiceLayerManager};
use super::throttle;
use crate::error::{Error, Result};
use crate::geoserver::client::{DeleteOutcome, GeoServerClient};
use crate::geoserver::paths::{ResourceConfig, ResourceKind};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;

/// One external service layer group
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalServiceLayer {
    #[serde(default)]
    pub workspace: Option<String>,
    /// WMS/WMTS store the children are cascaded from
    pub store: String,
    /// Prefix for child names; defaults to the store name
    #[serde(default)]
    pub service_name: Option<String>,
    /// Layer group name
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    /// Native layer names on the remote service
    #[serde(default, deserialize_with = "deserialize_layer_names")]
    pub layer_names: Vec<String>,
}

/// A remote layer and the local name it is published under
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChildLayer {
    pub native: String,
    pub name: String,
}

impl ExternalServiceLayer {
    pub fn new(store: &str, name: &str, layer_names: &str) -> Self {
        Self {
            store: store.to_string(),
            name: name.to_string(),
            layer_names: parse_layer_names(layer_names),
            ..Default::default()
        }
    }

    pub fn in_workspace(mut self, workspace: &str) -> Self {
        self.workspace = Some(workspace.to_string());
        self
    }

    pub fn service_name(&self) -> &str {
        self.service_name.as_deref().unwrap_or(&self.store)
    }

    /// Children in declaration order, one per distinct derived name
    pub fn children(&self) -> Vec<ChildLayer> {
        let mut seen = HashSet::new();
        self.layer_names
            .iter()
            .map(|native| ChildLayer {
                native: native.clone(),
                name: sanitize(self.service_name(), native),
            })
            .filter(|child| seen.insert(child.name.clone()))
            .collect()
    }
}

/// `service_native` with every char outside `[A-Za-z0-9_-]` replaced by `_`
pub fn sanitize(service_name: &str, native_name: &str) -> String {
    format!("{}_{}", service_name, native_name)
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Split a comma-joined list of native layer names
pub fn parse_layer_names(joined: &str) -> Vec<String> {
    normalize_layer_names(joined.split(',').map(str::to_string))
}

fn normalize_layer_names(names: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .into_iter()
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty() && seen.insert(n.clone()))
        .collect()
}

fn deserialize_layer_names<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum LayerNames {
        Joined(String),
        List(Vec<String>),
    }

    Ok(match LayerNames::deserialize(deserializer)? {
        LayerNames::Joined(joined) => parse_layer_names(&joined),
        LayerNames::List(list) => normalize_layer_names(list),
    })
}

/// Layer pair address: workspace, store, child name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Pair {
    workspace: String,
    store: String,
    child: ChildLayer,
}

impl Pair {
    fn layer(&self) -> ResourceConfig {
        ResourceConfig::named(&self.child.name).in_workspace(&self.workspace)
    }

    fn service_layer(&self) -> ResourceConfig {
        ResourceConfig::named(&self.child.name)
            .in_workspace(&self.workspace)
            .in_store(&self.store)
            .with("nativeName", self.child.native.clone())
    }
}

/// Orchestrates external service layer groups for one protocol
pub struct ExternalLayerManager<'a> {
    client: &'a GeoServerClient,
    kind: ServiceKind,
}

impl<'a> ExternalLayerManager<'a> {
    pub fn new(client: &'a GeoServerClient, kind: ServiceKind) -> Self {
        Self { client, kind }
    }

    /// Whether the layer group exists
    pub async fn exists(&self, layer: &ExternalServiceLayer) -> Result<bool> {
        let group = self.group_config(layer)?;
        LayerGroupManager::new(self.client).exists(&group).await
    }

    /// Create every missing child, then the group over all of them.
    ///
    /// Returns the child layer names the group references.
    pub async fn create(&self, layer: &ExternalServiceLayer) -> Result<Vec<String>> {
        let group = self.group_config(layer)?;
        let groups = LayerGroupManager::new(self.client);

        if groups.exists(&group).await? {
            return Err(Error::Conflict {
                kind: ResourceKind::LayerGroup,
                name: layer.name.clone(),
            });
        }

        let members = self.ensure_children(layer).await?;
        groups.create(&group, &members).await?;

        tracing::info!(
            "created {} layer group '{}' with {} layers",
            self.kind,
            layer.name,
            members.len()
        );
        Ok(members)
    }

    /// Move an existing group from `previous` to `layer`.
    ///
    /// Children only `previous` referenced are removed after the group is
    /// updated; a failed removal is logged and skipped. Returns the names of
    /// the removed children.
    pub async fn update(
        &self,
        layer: &ExternalServiceLayer,
        previous: &ExternalServiceLayer,
    ) -> Result<Vec<String>> {
        let group = self.group_config(layer)?;
        let groups = LayerGroupManager::new(self.client);

        if !groups.exists(&group).await? {
            return Err(Error::Missing {
                kind: ResourceKind::LayerGroup,
                name: layer.name.clone(),
            });
        }

        let previous_workspace = self.workspace(previous)?;
        let removed: Vec<Pair> = removed_children(previous, layer)
            .into_iter()
            .map(|child| Pair {
                workspace: previous_workspace.clone(),
                store: previous.store.clone(),
                child,
            })
            .collect();
        let removed_names: Vec<String> = removed.iter().map(|p| p.child.name.clone()).collect();

        let members = self.ensure_children(layer).await?;
        groups.update(&group, &members).await?;

        self.delete_pairs(removed).await;
        Ok(removed_names)
    }

    /// Delete the group, then whichever of its children still exist
    pub async fn delete(&self, layer: &ExternalServiceLayer) -> Result<Vec<String>> {
        let group = self.group_config(layer)?;
        LayerGroupManager::new(self.client).delete(&group).await?;

        let pairs = self.pairs(layer)?;
        Ok(self.delete_pairs(pairs).await)
    }

    /// Tear down a whole service: its groups, their children, then the store.
    ///
    /// Returns the names of the child layers that were deleted.
    pub async fn delete_service(
        &self,
        store: &ResourceConfig,
        groups: &[ExternalServiceLayer],
    ) -> Result<Vec<String>> {
        let group_manager = LayerGroupManager::new(self.client);
        let mut seen = HashSet::new();
        let mut pairs = Vec::new();

        for layer in groups {
            group_manager.delete(&self.group_config(layer)?).await?;
            for pair in self.pairs(layer)? {
                if seen.insert(pair.clone()) {
                    pairs.push(pair);
                }
            }
        }

        let deleted = self.delete_pairs(pairs).await;

        let outcome = self.client.delete(self.kind.store_kind(), store).await?;
        if outcome == DeleteOutcome::NotPresent {
            tracing::debug!("{} store '{}' was already gone", self.kind, store.display_name());
        }
        Ok(deleted)
    }

    fn workspace(&self, layer: &ExternalServiceLayer) -> Result<String> {
        let config = ResourceConfig {
            workspace: layer.workspace.clone(),
            ..Default::default()
        };
        self.client
            .paths()
            .workspace(ResourceKind::LayerGroup, &config)
    }

    fn group_config(&self, layer: &ExternalServiceLayer) -> Result<ResourceConfig> {
        if layer.name.is_empty() {
            return Err(Error::validation(format!("{} layer group requires a name", self.kind)));
        }

        let mut config = ResourceConfig::named(&layer.name).in_workspace(self.workspace(layer)?);
        if let Some(title) = &layer.title {
            config = config.with("title", title.clone());
        }
        Ok(config)
    }

    fn pairs(&self, layer: &ExternalServiceLayer) -> Result<Vec<Pair>> {
        let workspace = self.workspace(layer)?;
        Ok(layer
            .children()
            .into_iter()
            .map(|child| Pair {
                workspace: workspace.clone(),
                store: layer.store.clone(),
                child,
            })
            .collect())
    }

    /// Create the children that are not fully there; fail on the first error
    async fn ensure_children(&self, layer: &ExternalServiceLayer) -> Result<Vec<String>> {
        if layer.store.is_empty() {
            return Err(Error::validation(format!(
                "{} layer group '{}' requires a store",
                self.kind, layer.name
            )));
        }
        if layer.layer_names.is_empty() {
            return Err(Error::validation(format!(
                "{} layer group '{}' requires at least one layer name",
                self.kind, layer.name
            )));
        }

        let pairs = self.pairs(layer)?;
        throttle::try_all(pairs, self.client.concurrency(), |pair| async move {
            if !self.pair_exists(&pair).await? {
                ServiceLayerManager::new(self.client, self.kind)
                    .create_unchecked(&pair.service_layer())
                    .await?;
            }
            Ok(pair.child.name)
        })
        .await
    }

    async fn pair_exists(&self, pair: &Pair) -> Result<bool> {
        Ok(self.client.exists(ResourceKind::Layer, &pair.layer()).await?
            && self
                .client
                .exists(self.kind.layer_kind(), &pair.service_layer())
                .await?)
    }

    /// Best effort: each pair is checked and whatever half exists is removed
    async fn delete_pairs(&self, pairs: Vec<Pair>) -> Vec<String> {
        let outcomes = throttle::settle_all(pairs, self.client.concurrency(), |pair| async move {
            match self.delete_pair(&pair).await {
                Ok(deleted) => Ok(deleted.then_some(pair.child.name)),
                Err(e) => {
                    tracing::warn!(
                        "failed to delete {} layer '{}': {}",
                        self.kind,
                        pair.child.name,
                        e
                    );
                    Err(e)
                }
            }
        })
        .await;

        outcomes
            .into_iter()
            .filter_map(|outcome| outcome.ok().flatten())
            .collect()
    }

    async fn delete_pair(&self, pair: &Pair) -> Result<bool> {
        let layer = pair.layer();
        let service_layer = pair.service_layer();
        let layer_present = self.client.exists(ResourceKind::Layer, &layer).await?;
        let service_present = self
            .client
            .exists(self.kind.layer_kind(), &service_layer)
            .await?;

        if !layer_present && !service_present {
            return Ok(false);
        }
        if layer_present {
            self.client
                .delete_present(ResourceKind::Layer, &layer)
                .await?;
        }
        if service_present {
            self.client
                .delete_present(self.kind.layer_kind(), &service_layer)
                .await?;
        }
        Ok(true)
    }
}

/// Children of `previous` that `next` no longer references
fn removed_children(previous: &ExternalServiceLayer, next: &ExternalServiceLayer) -> Vec<ChildLayer> {
    let keep: HashSet<String> = next.children().into_iter().map(|c| c.name).collect();
    previous
        .children()
        .into_iter()
        .filter(|child| !keep.contains(&child.name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_replaces_disallowed_chars() {
        assert_eq!(sanitize("ch", "blw.alpprodukte"), "ch_blw_alpprodukte");
        assert_eq!(sanitize("svc", "a b/c:d-e_f"), "svc_a_b_c_d-e_f");
        assert_eq!(sanitize("wms ch", "é"), "wms_ch__");
    }

    #[test]
    fn test_parse_layer_names_trims_and_dedupes() {
        assert_eq!(
            parse_layer_names(" a, b ,,a,c "),
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
        assert!(parse_layer_names("").is_empty());
    }

    #[test]
    fn test_children_use_service_name_prefix() {
        let mut layer = ExternalServiceLayer::new("ch", "grp", "blw.alpprodukte,bafu.karte");
        assert_eq!(
            layer.children(),
            vec![
                ChildLayer { native: "blw.alpprodukte".into(), name: "ch_blw_alpprodukte".into() },
                ChildLayer { native: "bafu.karte".into(), name: "ch_bafu_karte".into() },
            ]
        );

        layer.service_name = Some("other".into());
        assert_eq!(layer.children()[0].name, "other_blw_alpprodukte");
    }

    #[test]
    fn test_children_collapse_colliding_names() {
        let layer = ExternalServiceLayer::new("s", "grp", "a.b,a:b");
        assert_eq!(layer.children().len(), 1);
    }

    #[test]
    fn test_layer_names_accept_string_or_list() {
        let joined: ExternalServiceLayer = serde_json::from_str(
            r#"{"store":"ch","name":"grp","layerNames":"a,b"}"#,
        )
        .unwrap();
        let list: ExternalServiceLayer = serde_json::from_str(
            r#"{"store":"ch","name":"grp","layerNames":["a","b"]}"#,
        )
        .unwrap();
        assert_eq!(joined.layer_names, list.layer_names);
    }

    #[test]
    fn test_removed_children_are_set_difference() {
        let previous = ExternalServiceLayer::new("s", "grp", "a,b");
        let next = ExternalServiceLayer::new("s", "grp", "a,c");
        let removed = removed_children(&previous, &next);
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].name, "s_b");
        assert_eq!(removed[0].native, "b");
    }
}
