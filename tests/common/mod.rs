//! Shared fixtures for the wiremock-backed integration tests

#![allow(dead_code)]

use gsrest::{ConnectionConfig, Repository, RepositoryConfig};
use serde_json::json;
use wiremock::MockServer;

/// REST prefix every mocked path starts with
pub const REST: &str = "/geoserver/rest";

pub const USER: &str = "admin";
pub const PASSWORD: &str = "geoserver";

pub fn rest(path: &str) -> String {
    format!("{}{}", REST, path)
}

pub fn config_for(server: &MockServer) -> RepositoryConfig {
    let flat = json!({
        "host": "db",
        "port": 5432,
        "database": "gis",
        "user": "gis",
        "passwd": "secret",
        "dbtype": "postgis"
    });

    RepositoryConfig {
        geoserver_connection: ConnectionConfig {
            url: Some(format!("{}/geoserver", server.uri())),
            user: USER.to_string(),
            password: PASSWORD.to_string(),
            workspace: Some("geoportal".to_string()),
            datastore: Some("flat".to_string()),
            timeout: 2_000,
            concurrency: 3,
            ..Default::default()
        },
        database: [("flat".to_string(), flat.as_object().cloned().unwrap())]
            .into_iter()
            .collect(),
    }
}

pub fn repo(server: &MockServer) -> Repository {
    Repository::new(config_for(server)).expect("valid test configuration")
}

/// Method and path of every request the server saw, in arrival order
pub async fn request_log(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|r| format!("{} {}", r.method, r.url.path()))
        .collect()
}
