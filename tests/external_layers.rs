//! WMS/WMTS external service layer groups against a mocked GeoServer
//!
//! These tests pin down request ordering: children before the group on
//! create, the group before its children on delete.

mod common;

use common::{repo, request_log, rest};
use gsrest::{Error, ExternalServiceLayer, ResourceConfig, ResourceKind};
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount(server: &MockServer, verb: &str, url_path: &str, status: u16) {
    Mock::given(method(verb))
        .and(path(rest(url_path)))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

async fn mount_once(server: &MockServer, verb: &str, url_path: &str, status: u16) {
    Mock::given(method(verb))
        .and(path(rest(url_path)))
        .respond_with(ResponseTemplate::new(status))
        .expect(1)
        .mount(server)
        .await;
}

/// Layer and WMS layer of a child, both answering `status`
async fn mount_wms_pair(server: &MockServer, store: &str, name: &str, status: u16) {
    mount(server, "GET", &format!("/layers/geoportal:{}.json", name), status).await;
    mount(
        server,
        "GET",
        &format!("/workspaces/geoportal/wmsstores/{}/wmslayers/{}.json", store, name),
        status,
    )
    .await;
}

fn position(log: &[String], entry: &str) -> usize {
    log.iter()
        .position(|line| line == entry)
        .unwrap_or_else(|| panic!("no request '{}' in {:?}", entry, log))
}

fn published_names(body: &Value) -> Vec<String> {
    body["layerGroup"]["publishables"]["published"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap().to_string())
        .collect()
}

mod create_tests {
    use super::*;

    /// Missing children are created, then the group over all of them
    #[tokio::test]
    async fn test_create_builds_children_then_group() {
        let server = MockServer::start().await;

        mount(&server, "GET", "/workspaces/geoportal/layergroups/ch_group.json", 404).await;
        mount_wms_pair(&server, "ch", "ch_blw_alpprodukte", 200).await;
        mount_wms_pair(&server, "ch", "ch_bafu_karte", 404).await;

        Mock::given(method("POST"))
            .and(path(rest("/workspaces/geoportal/wmsstores/ch/wmslayers")))
            .and(body_partial_json(json!({
                "wmsLayer": { "name": "ch_bafu_karte", "nativeName": "bafu.karte", "enabled": true }
            })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(rest("/workspaces/geoportal/layergroups")))
            .and(body_partial_json(json!({
                "layerGroup": { "name": "ch_group", "workspace": { "name": "geoportal" } }
            })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let layer = ExternalServiceLayer::new("ch", "ch_group", "blw.alpprodukte,bafu.karte");
        let members = repo(&server).wms_external_layers().create(&layer).await.unwrap();
        assert_eq!(members, vec!["ch_blw_alpprodukte", "ch_bafu_karte"]);

        let log = request_log(&server).await;
        let child = position(&log, &format!("POST {}", rest("/workspaces/geoportal/wmsstores/ch/wmslayers")));
        let group = position(&log, &format!("POST {}", rest("/workspaces/geoportal/layergroups")));
        assert!(child < group);

        let requests = server.received_requests().await.unwrap();
        let group_body: Value = serde_json::from_slice(&requests[group].body).unwrap();
        assert_eq!(
            published_names(&group_body),
            vec!["geoportal:ch_blw_alpprodukte", "geoportal:ch_bafu_karte"]
        );
    }

    /// An existing group is a conflict and nothing gets created
    #[tokio::test]
    async fn test_create_existing_group_conflicts() {
        let server = MockServer::start().await;

        mount(&server, "GET", "/workspaces/geoportal/layergroups/ch_group.json", 200).await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let layer = ExternalServiceLayer::new("ch", "ch_group", "a");
        let err = repo(&server).wms_external_layers().create(&layer).await.unwrap_err();
        assert!(matches!(err, Error::Conflict { kind: ResourceKind::LayerGroup, .. }));
    }

    /// A failing child aborts before the group is posted
    #[tokio::test]
    async fn test_create_fails_fast_on_child_error() {
        let server = MockServer::start().await;

        mount(&server, "GET", "/workspaces/geoportal/layergroups/grp.json", 404).await;
        mount_wms_pair(&server, "svc", "svc_a", 404).await;
        mount(&server, "POST", "/workspaces/geoportal/wmsstores/svc/wmslayers", 500).await;
        Mock::given(method("POST"))
            .and(path(rest("/workspaces/geoportal/layergroups")))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let layer = ExternalServiceLayer::new("svc", "grp", "a");
        let err = repo(&server).wms_external_layers().create(&layer).await.unwrap_err();
        assert_eq!(err.status(), Some(500));
    }

    /// Layer names are required
    #[tokio::test]
    async fn test_create_without_layer_names() {
        let server = MockServer::start().await;

        mount(&server, "GET", "/workspaces/geoportal/layergroups/grp.json", 404).await;

        let layer = ExternalServiceLayer::new("svc", "grp", " , ");
        let err = repo(&server).wms_external_layers().create(&layer).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    /// WMTS uses its own store path, child collection and envelope
    #[tokio::test]
    async fn test_create_wmts_group() {
        let server = MockServer::start().await;

        mount(&server, "GET", "/workspaces/geoportal/layergroups/tiles.json", 404).await;
        mount(&server, "GET", "/layers/geoportal:osm_basemap.json", 404).await;
        Mock::given(method("POST"))
            .and(path(rest("/workspaces/geoportal/wmtsstores/osm/layers")))
            .and(body_partial_json(json!({
                "wmtsLayer": { "name": "osm_basemap", "nativeName": "basemap" }
            })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;
        mount_once(&server, "POST", "/workspaces/geoportal/layergroups", 201).await;

        let layer = ExternalServiceLayer::new("osm", "tiles", "basemap");
        let members = repo(&server).wmts_external_layers().create(&layer).await.unwrap();
        assert_eq!(members, vec!["osm_basemap"]);
    }
}

mod update_tests {
    use super::*;

    /// a,b -> a,c: c is ensured, the group lists a,c, only b is removed
    #[tokio::test]
    async fn test_update_diffs_layer_names() {
        let server = MockServer::start().await;

        mount(&server, "GET", "/workspaces/geoportal/layergroups/grp.json", 200).await;
        mount_wms_pair(&server, "svc", "svc_a", 200).await;
        mount_wms_pair(&server, "svc", "svc_b", 200).await;
        mount_wms_pair(&server, "svc", "svc_c", 404).await;

        Mock::given(method("POST"))
            .and(path(rest("/workspaces/geoportal/wmsstores/svc/wmslayers")))
            .and(body_partial_json(json!({ "wmsLayer": { "name": "svc_c", "nativeName": "c" } })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;
        mount_once(&server, "PUT", "/workspaces/geoportal/layergroups/grp", 200).await;
        mount_once(&server, "DELETE", "/layers/geoportal:svc_b", 200).await;
        Mock::given(method("DELETE"))
            .and(path(rest("/workspaces/geoportal/wmsstores/svc/wmslayers/svc_b")))
            .and(query_param("recurse", "true"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path(rest("/layers/geoportal:svc_a")))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let previous = ExternalServiceLayer::new("svc", "grp", "a,b");
        let next = ExternalServiceLayer::new("svc", "grp", "a,c");
        let removed = repo(&server)
            .wms_external_layers()
            .update(&next, &previous)
            .await
            .unwrap();
        assert_eq!(removed, vec!["svc_b"]);

        let log = request_log(&server).await;
        let put = position(&log, &format!("PUT {}", rest("/workspaces/geoportal/layergroups/grp")));
        let delete = position(&log, &format!("DELETE {}", rest("/layers/geoportal:svc_b")));
        assert!(put < delete);

        let requests = server.received_requests().await.unwrap();
        let group_body: Value = serde_json::from_slice(&requests[put].body).unwrap();
        assert_eq!(published_names(&group_body), vec!["geoportal:svc_a", "geoportal:svc_c"]);
    }

    /// Updating a group that is not there fails
    #[tokio::test]
    async fn test_update_requires_existing_group() {
        let server = MockServer::start().await;

        mount(&server, "GET", "/workspaces/geoportal/layergroups/grp.json", 404).await;

        let layer = ExternalServiceLayer::new("svc", "grp", "a");
        let err = repo(&server)
            .wms_external_layers()
            .update(&layer, &layer)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Missing { kind: ResourceKind::LayerGroup, .. }));
    }

    /// A failed removal is logged and the rest of the batch still runs
    #[tokio::test]
    async fn test_update_tolerates_failed_removal() {
        let server = MockServer::start().await;

        mount(&server, "GET", "/workspaces/geoportal/layergroups/grp.json", 200).await;
        mount_wms_pair(&server, "svc", "svc_a", 200).await;
        mount_wms_pair(&server, "svc", "svc_b", 200).await;
        mount_wms_pair(&server, "svc", "svc_d", 200).await;
        mount(&server, "PUT", "/workspaces/geoportal/layergroups/grp", 200).await;
        mount(&server, "DELETE", "/layers/geoportal:svc_b", 500).await;
        mount_once(&server, "DELETE", "/layers/geoportal:svc_d", 200).await;
        mount_once(&server, "DELETE", "/workspaces/geoportal/wmsstores/svc/wmslayers/svc_d", 200).await;

        let previous = ExternalServiceLayer::new("svc", "grp", "a,b,d");
        let next = ExternalServiceLayer::new("svc", "grp", "a");
        let removed = repo(&server)
            .wms_external_layers()
            .update(&next, &previous)
            .await
            .unwrap();
        assert_eq!(removed, vec!["svc_b", "svc_d"]);
    }
}

mod delete_tests {
    use super::*;

    /// The group goes first, then only the children that still exist
    #[tokio::test]
    async fn test_delete_group_then_existing_children() {
        let server = MockServer::start().await;

        mount(&server, "GET", "/workspaces/geoportal/layergroups/grp.json", 200).await;
        mount_once(&server, "DELETE", "/workspaces/geoportal/layergroups/grp", 200).await;
        mount_wms_pair(&server, "svc", "svc_a", 200).await;
        mount_wms_pair(&server, "svc", "svc_b", 404).await;
        mount_once(&server, "DELETE", "/layers/geoportal:svc_a", 200).await;
        mount_once(&server, "DELETE", "/workspaces/geoportal/wmsstores/svc/wmslayers/svc_a", 200).await;
        Mock::given(method("DELETE"))
            .and(path(rest("/layers/geoportal:svc_b")))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let layer = ExternalServiceLayer::new("svc", "grp", "a,b");
        let deleted = repo(&server).wms_external_layers().delete(&layer).await.unwrap();
        assert_eq!(deleted, vec!["svc_a"]);

        let log = request_log(&server).await;
        let group = position(&log, &format!("DELETE {}", rest("/workspaces/geoportal/layergroups/grp")));
        let child = position(&log, &format!("DELETE {}", rest("/layers/geoportal:svc_a")));
        assert!(group < child);
    }

    /// Two groups over three native layers: two group deletes, then only the
    /// existing pairs, then the store
    #[tokio::test]
    async fn test_delete_service_with_two_groups() {
        let server = MockServer::start().await;

        mount(&server, "GET", "/workspaces/geoportal/layergroups/g1.json", 200).await;
        mount(&server, "GET", "/workspaces/geoportal/layergroups/g2.json", 200).await;
        mount_once(&server, "DELETE", "/workspaces/geoportal/layergroups/g1", 200).await;
        mount_once(&server, "DELETE", "/workspaces/geoportal/layergroups/g2", 200).await;

        mount_wms_pair(&server, "svc", "svc_a", 200).await;
        mount_wms_pair(&server, "svc", "svc_b", 404).await;
        mount_wms_pair(&server, "svc", "svc_c", 200).await;
        for name in ["svc_a", "svc_c"] {
            mount_once(&server, "DELETE", &format!("/layers/geoportal:{}", name), 200).await;
            mount_once(
                &server,
                "DELETE",
                &format!("/workspaces/geoportal/wmsstores/svc/wmslayers/{}", name),
                200,
            )
            .await;
        }

        mount(&server, "GET", "/workspaces/geoportal/wmsstores/svc.json", 200).await;
        Mock::given(method("DELETE"))
            .and(path(rest("/workspaces/geoportal/wmsstores/svc")))
            .and(query_param("recurse", "true"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let groups = [
            ExternalServiceLayer::new("svc", "g1", "a,b"),
            ExternalServiceLayer::new("svc", "g2", "b,c"),
        ];
        let deleted = repo(&server)
            .wms_external_layers()
            .delete_service(&ResourceConfig::named("svc"), &groups)
            .await
            .unwrap();
        assert_eq!(deleted, vec!["svc_a", "svc_c"]);

        let log = request_log(&server).await;
        let deletes: Vec<&String> = log.iter().filter(|l| l.starts_with("DELETE")).collect();
        assert_eq!(deletes.len(), 7);
        assert_eq!(*deletes[0], format!("DELETE {}", rest("/workspaces/geoportal/layergroups/g1")));
        assert_eq!(*deletes[1], format!("DELETE {}", rest("/workspaces/geoportal/layergroups/g2")));
        assert_eq!(*deletes[6], format!("DELETE {}", rest("/workspaces/geoportal/wmsstores/svc")));
    }
}

mod send_tests {
    use super::*;
    use gsrest::{Repository, RepositoryConfig};

    fn assert_send<T: Send>(_: &T) {}

    /// Composite operations can be spawned onto a multi-threaded runtime
    #[test]
    fn test_composite_futures_are_send() {
        let repo = Repository::new(RepositoryConfig::default()).unwrap();
        let manager = repo.wms_external_layers();
        let layer = ExternalServiceLayer::new("svc", "grp", "a,c");
        let previous = ExternalServiceLayer::new("svc", "grp", "a,b");
        let store = ResourceConfig::named("svc");
        let groups = [layer.clone()];

        let create = manager.create(&layer);
        let update = manager.update(&layer, &previous);
        let delete = manager.delete(&layer);
        let delete_service = manager.delete_service(&store, &groups);

        assert_send(&create);
        assert_send(&update);
        assert_send(&delete);
        assert_send(&delete_service);
    }
}
