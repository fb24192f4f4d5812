//! REST path resolution
//!
//! Maps a [`ResourceKind`] plus a [`ResourceConfig`] onto the URL of either
//! the resource itself or the collection it is created in. Paths are built
//! from typed segments rather than positional format strings, so every kind
//! declares exactly which identifiers it needs.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Every resource type the REST API exposes to this client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Workspace,
    Datastore,
    FeatureType,
    Layer,
    LayerGroup,
    CoverageStore,
    Coverage,
    WmsStore,
    WmsLayer,
    WmtsStore,
    WmtsLayer,
    Style,
    WorkspaceStyle,
    LayerStyle,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 14] = [
        Self::Workspace,
        Self::Datastore,
        Self::FeatureType,
        Self::Layer,
        Self::LayerGroup,
        Self::CoverageStore,
        Self::Coverage,
        Self::WmsStore,
        Self::WmsLayer,
        Self::WmtsStore,
        Self::WmtsLayer,
        Self::Style,
        Self::WorkspaceStyle,
        Self::LayerStyle,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Workspace => "workspace",
            Self::Datastore => "datastore",
            Self::FeatureType => "featuretype",
            Self::Layer => "layer",
            Self::LayerGroup => "layergroup",
            Self::CoverageStore => "coveragestore",
            Self::Coverage => "coverage",
            Self::WmsStore => "wmsstore",
            Self::WmsLayer => "wmslayer",
            Self::WmtsStore => "wmtsstore",
            Self::WmtsLayer => "wmtslayer",
            Self::Style => "style",
            Self::WorkspaceStyle => "workspacestyle",
            Self::LayerStyle => "layerstyle",
        }
    }

    /// Key wrapping the resource in JSON request and response bodies
    pub fn envelope(&self) -> &'static str {
        match self {
            Self::Workspace => "workspace",
            Self::Datastore => "dataStore",
            Self::FeatureType => "featureType",
            Self::Layer => "layer",
            Self::LayerGroup => "layerGroup",
            Self::CoverageStore => "coverageStore",
            Self::Coverage => "coverage",
            Self::WmsStore => "wmsStore",
            Self::WmsLayer => "wmsLayer",
            Self::WmtsStore => "wmtsStore",
            Self::WmtsLayer => "wmtsLayer",
            Self::Style | Self::WorkspaceStyle | Self::LayerStyle => "style",
        }
    }

    /// Whether deleting this kind may cascade to children
    pub fn recurse_on_delete(&self) -> bool {
        matches!(
            self,
            Self::Workspace
                | Self::Datastore
                | Self::FeatureType
                | Self::CoverageStore
                | Self::Coverage
                | Self::WmsStore
                | Self::WmsLayer
                | Self::WmtsStore
                | Self::WmtsLayer
        )
    }

    fn collection(&self) -> &'static [Segment] {
        use Segment::*;
        match self {
            Self::Workspace => &[Lit("workspaces")],
            Self::Datastore => &[Lit("workspaces"), Workspace, Lit("datastores")],
            Self::FeatureType => &[
                Lit("workspaces"),
                Workspace,
                Lit("datastores"),
                Store,
                Lit("featuretypes"),
            ],
            Self::Layer => &[Lit("layers")],
            Self::LayerGroup => &[Lit("workspaces"), Workspace, Lit("layergroups")],
            Self::CoverageStore => &[Lit("workspaces"), Workspace, Lit("coveragestores")],
            Self::Coverage => &[
                Lit("workspaces"),
                Workspace,
                Lit("coveragestores"),
                Store,
                Lit("coverages"),
            ],
            Self::WmsStore => &[Lit("workspaces"), Workspace, Lit("wmsstores")],
            Self::WmsLayer => &[
                Lit("workspaces"),
                Workspace,
                Lit("wmsstores"),
                Store,
                Lit("wmslayers"),
            ],
            Self::WmtsStore => &[Lit("workspaces"), Workspace, Lit("wmtsstores")],
            Self::WmtsLayer => &[
                Lit("workspaces"),
                Workspace,
                Lit("wmtsstores"),
                Store,
                Lit("layers"),
            ],
            Self::Style => &[Lit("styles")],
            Self::WorkspaceStyle => &[Lit("workspaces"), Workspace, Lit("styles")],
            Self::LayerStyle => &[Lit("layers"), QualifiedLayer, Lit("styles")],
        }
    }

    fn item_is_qualified(&self) -> bool {
        matches!(self, Self::Layer)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.to_ascii_lowercase().replace(['-', '_'], "");
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| Error::validation(format!("unknown resource type '{}'", s)))
    }
}

/// What the URL is for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Single resource, JSON representation
    Get,
    /// Collection the resource is posted to
    Create,
    /// Single resource, no representation suffix
    Delete,
}

#[derive(Debug, Clone, Copy)]
enum Segment {
    Lit(&'static str),
    Workspace,
    Store,
    /// `{workspace}:{layer}`
    QualifiedLayer,
}

/// Per-call description of a remote resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace: Option<String>,
    #[serde(default, alias = "datastore", skip_serializing_if = "Option::is_none")]
    pub store: Option<String>,
    /// Owning layer, only meaningful for layer-scoped styles
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer: Option<String>,
    /// Type specific fields (`connectionParameters`, `url`, `title`, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ResourceConfig {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn in_workspace(mut self, workspace: impl Into<String>) -> Self {
        self.workspace = Some(workspace.into());
        self
    }

    pub fn in_store(mut self, store: impl Into<String>) -> Self {
        self.store = Some(store.into());
        self
    }

    pub fn on_layer(mut self, layer: impl Into<String>) -> Self {
        self.layer = Some(layer.into());
        self
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.extra.insert(key.to_string(), value.into());
        self
    }

    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(|v| v.as_str())
    }

    /// Name for messages, falls back to "-" when unset
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("-")
    }
}

/// Builds REST URLs from the base URL and the configured defaults
#[derive(Debug, Clone)]
pub struct PathResolver {
    base: String,
    default_workspace: Option<String>,
    default_datastore: Option<String>,
}

impl PathResolver {
    pub fn new(
        base: impl Into<String>,
        default_workspace: Option<String>,
        default_datastore: Option<String>,
    ) -> Self {
        Self {
            base: base.into().trim_end_matches('/').to_string(),
            default_workspace,
            default_datastore,
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Resolve the URL for `operation` on a resource of `kind`.
    ///
    /// A create without any config resolves to the bare collection.
    pub fn resolve(
        &self,
        kind: ResourceKind,
        config: Option<&ResourceConfig>,
        operation: Operation,
    ) -> Result<String> {
        let empty = ResourceConfig::default();
        let config = config.unwrap_or(&empty);

        let mut url = self.base.clone();
        for segment in kind.collection() {
            url.push('/');
            url.push_str(&self.segment(kind, *segment, config)?);
        }

        if operation == Operation::Create {
            return Ok(url);
        }

        let name = encode(&self.name(kind, config)?);
        url.push('/');
        if kind.item_is_qualified() {
            url.push_str(&encode(&self.workspace(kind, config)?));
            url.push(':');
        }
        url.push_str(&name);

        if operation == Operation::Get {
            url.push_str(".json");
        }

        Ok(url)
    }

    /// Effective workspace for a config
    pub fn workspace(&self, kind: ResourceKind, config: &ResourceConfig) -> Result<String> {
        non_empty(&config.workspace)
            .or_else(|| self.default_workspace.clone())
            .ok_or_else(|| Error::validation(format!("{} requires a workspace", kind)))
    }

    /// Effective store (datastore, coverage store, WMS/WMTS store) for a config
    pub fn store(&self, kind: ResourceKind, config: &ResourceConfig) -> Result<String> {
        non_empty(&config.store)
            .or_else(|| self.default_datastore.clone())
            .ok_or_else(|| Error::validation(format!("{} requires a store", kind)))
    }

    /// Effective resource name for a config
    pub fn name(&self, kind: ResourceKind, config: &ResourceConfig) -> Result<String> {
        let fallback = match kind {
            ResourceKind::Workspace => {
                non_empty(&config.workspace).or_else(|| self.default_workspace.clone())
            }
            ResourceKind::Datastore => self.default_datastore.clone(),
            _ => None,
        };

        non_empty(&config.name)
            .or(fallback)
            .ok_or_else(|| Error::validation(format!("{} requires a name", kind)))
    }

    fn segment(&self, kind: ResourceKind, segment: Segment, config: &ResourceConfig) -> Result<String> {
        Ok(match segment {
            Segment::Lit(s) => s.to_string(),
            Segment::Workspace => encode(&self.workspace(kind, config)?),
            Segment::Store => encode(&self.store(kind, config)?),
            Segment::QualifiedLayer => {
                let layer = config
                    .layer
                    .as_deref()
                    .ok_or_else(|| Error::validation(format!("{} requires a layer", kind)))?;
                format!("{}:{}", encode(&self.workspace(kind, config)?), encode(layer))
            }
        })
    }
}

fn encode(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

/// Empty strings count as unset
fn non_empty(value: &Option<String>) -> Option<String> {
    value.clone().filter(|v| !v.is_empty())
}
