//! GeoServer Client
//!
//! Main client for interacting with the REST API, combining the dispatcher,
//! the path resolver and the immutable configuration. The existence-checked
//! create/delete pattern every resource manager relies on lives here.

use super::http::{Dispatcher, Payload, RestResponse};
use super::paths::{Operation, PathResolver, ResourceConfig, ResourceKind};
use crate::config::RepositoryConfig;
use crate::error::{Error, Result};
use serde_json::{Map, Value};

/// Result of an existence-checked create
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    /// The server answered 201
    Created,
    /// Nothing was sent, the resource was already there
    AlreadyPresent,
}

/// Result of an existence-checked delete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// Nothing was sent, the resource was not there
    NotPresent,
}

/// Main GeoServer client
pub struct GeoServerClient {
    http: Dispatcher,
    paths: PathResolver,
    config: RepositoryConfig,
}

impl GeoServerClient {
    pub fn new(config: RepositoryConfig) -> Result<Self> {
        let conn = &config.geoserver_connection;
        let paths = PathResolver::new(
            conn.rest_url()?,
            conn.workspace.clone(),
            conn.datastore.clone(),
        );
        let http = Dispatcher::new(&conn.user, &conn.password, conn.timeout())?;

        Ok(Self { http, paths, config })
    }

    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    pub fn paths(&self) -> &PathResolver {
        &self.paths
    }

    pub fn http(&self) -> &Dispatcher {
        &self.http
    }

    /// Window for batch operations
    pub fn concurrency(&self) -> usize {
        self.config.geoserver_connection.concurrency()
    }

    pub fn url(&self, kind: ResourceKind, config: &ResourceConfig, operation: Operation) -> Result<String> {
        self.paths.resolve(kind, Some(config), operation)
    }

    /// Effective name of the resource a config describes
    pub fn name(&self, kind: ResourceKind, config: &ResourceConfig) -> Result<String> {
        self.paths.name(kind, config)
    }

    /// True only when the server answers exactly 200
    pub async fn exists(&self, kind: ResourceKind, config: &ResourceConfig) -> Result<bool> {
        let url = self.url(kind, config, Operation::Get)?;
        let response = self.http.get(&url).await?;
        Ok(response.is(200))
    }

    /// Fetch a resource and strip its envelope
    pub async fn fetch(&self, kind: ResourceKind, config: &ResourceConfig) -> Result<Value> {
        let url = self.url(kind, config, Operation::Get)?;
        let response = self.http.get(&url).await?;
        let response = self.expect_status(response, 200, "get", kind, config)?;

        let mut value = response.json()?;
        if let Some(inner) = value.get_mut(kind.envelope()) {
            return Ok(inner.take());
        }
        Ok(value)
    }

    /// Create unless present; "already there" is a success
    pub async fn create(
        &self,
        kind: ResourceKind,
        config: &ResourceConfig,
        body: Value,
    ) -> Result<CreateOutcome> {
        if self.exists(kind, config).await? {
            tracing::debug!("{} '{}' already exists", kind, config.display_name());
            return Ok(CreateOutcome::AlreadyPresent);
        }

        self.post_new(kind, config, body).await?;
        Ok(CreateOutcome::Created)
    }

    /// Create, failing with [`Error::Conflict`] when already present
    pub async fn create_strict(
        &self,
        kind: ResourceKind,
        config: &ResourceConfig,
        body: Value,
    ) -> Result<()> {
        if self.exists(kind, config).await? {
            return Err(Error::Conflict {
                kind,
                name: self.name(kind, config)?,
            });
        }

        self.post_new(kind, config, body).await
    }

    /// POST a wrapped body to the collection without checking first
    pub async fn post_new(&self, kind: ResourceKind, config: &ResourceConfig, body: Value) -> Result<()> {
        let url = self.url(kind, config, Operation::Create)?;
        let response = self.http.post(&url, Payload::Json(wrap(kind, body))).await?;
        self.expect_status(response, 201, "create", kind, config)?;

        tracing::info!("created {} '{}'", kind, config.display_name());
        Ok(())
    }

    /// Delete if present; "not there" is a success and sends nothing
    pub async fn delete(&self, kind: ResourceKind, config: &ResourceConfig) -> Result<DeleteOutcome> {
        if !self.exists(kind, config).await? {
            tracing::debug!("{} '{}' not found, nothing to delete", kind, config.display_name());
            return Ok(DeleteOutcome::NotPresent);
        }

        self.delete_present(kind, config).await?;
        Ok(DeleteOutcome::Deleted)
    }

    /// DELETE without an existence check
    pub async fn delete_present(&self, kind: ResourceKind, config: &ResourceConfig) -> Result<()> {
        let mut url = self.url(kind, config, Operation::Delete)?;
        if kind.recurse_on_delete() {
            url.push_str("?recurse=true");
        }

        let response = self.http.delete(&url).await?;
        self.expect_status(response, 200, "delete", kind, config)?;

        tracing::info!("deleted {} '{}'", kind, config.display_name());
        Ok(())
    }

    /// PUT a wrapped body to the resource, with an optional query string
    pub async fn update(
        &self,
        kind: ResourceKind,
        config: &ResourceConfig,
        body: Value,
        query: Option<&str>,
    ) -> Result<()> {
        let mut url = self.url(kind, config, Operation::Delete)?;
        if let Some(query) = query {
            url.push('?');
            url.push_str(query);
        }

        let response = self.http.put(&url, Payload::Json(wrap(kind, body))).await?;
        self.expect_status(response, 200, "update", kind, config)?;

        tracing::info!("updated {} '{}'", kind, config.display_name());
        Ok(())
    }

    /// Turn an unexpected status into [`Error::Remote`]
    pub fn expect_status(
        &self,
        response: RestResponse,
        status: u16,
        operation: &'static str,
        kind: ResourceKind,
        config: &ResourceConfig,
    ) -> Result<RestResponse> {
        if response.is(status) {
            return Ok(response);
        }

        Err(Error::Remote {
            operation,
            kind,
            name: self
                .name(kind, config)
                .unwrap_or_else(|_| config.display_name().to_string()),
            status: response.status,
            body: response.body,
        })
    }
}

/// Wrap a resource body in its envelope: `{ "<envelope>": body }`
pub fn wrap(kind: ResourceKind, body: Value) -> Value {
    let mut map = Map::new();
    map.insert(kind.envelope().to_string(), body);
    Value::Object(map)
}

/// Copy the type specific fields of a config into a body, without
/// overwriting what the body already sets
pub fn merge_extra(body: &mut Value, config: &ResourceConfig, skip: &[&str]) {
    if let Value::Object(map) = body {
        for (key, value) in &config.extra {
            if skip.contains(&key.as_str()) {
                continue;
            }
            map.entry(key.clone()).or_insert_with(|| value.clone());
        }
    }
}
