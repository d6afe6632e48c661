#![allow(clippy::unwrap_used)]
// Integration tests for `DizqueClient` using wiremock.

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dizque_api::{DizqueClient, Error, Fields, SettingsKind};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, DizqueClient) {
    let server = MockServer::start().await;
    let client = DizqueClient::with_client(&server.uri(), reqwest::Client::new()).unwrap();
    (server, client)
}

fn fields(value: serde_json::Value) -> Fields {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

// ── System ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_version() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/version"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "dizquetv": "1.5.0",
            "ffmpeg": "4.3.1",
            "nodejs": "v12.18.3"
        })))
        .mount(&server)
        .await;

    let version = client.version().await.unwrap();
    assert_eq!(version.dizquetv.as_deref(), Some("1.5.0"));
    assert_eq!(version.ffmpeg.as_deref(), Some("4.3.1"));
}

// ── Channels ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_channels_and_numbers() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/channels"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "_id": "a", "number": 1, "name": "One", "programs": [] },
            { "_id": "b", "number": 5, "name": "Five", "programs": [] }
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/channelNumbers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([1, 5])))
        .mount(&server)
        .await;

    let channels = client.list_channels().await.unwrap();
    assert_eq!(channels.len(), 2);
    assert_eq!(channels[1]["name"], json!("Five"));

    assert_eq!(client.channel_numbers().await.unwrap(), vec![1, 5]);
}

#[tokio::test]
async fn test_get_channel_not_found() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/channel/42"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Channel not found"))
        .mount(&server)
        .await;

    let result = client.get_channel(42).await;
    match result {
        Err(ref e @ Error::NotFound { ref path }) => {
            assert_eq!(path, "/api/channel/42");
            assert!(e.is_not_found());
            assert_eq!(e.status(), Some(404));
        }
        other => panic!("expected NotFound, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_get_channel_info() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/channel/description/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "Cartoons",
            "number": 3,
            "icon": "http://tv.local/images/dizquetv.png"
        })))
        .mount(&server)
        .await;

    let info = client.get_channel_info(3).await.unwrap();
    assert_eq!(info.name, "Cartoons");
    assert_eq!(info.number, 3);
}

#[tokio::test]
async fn test_channel_writes_send_bodies() {
    let (server, client) = setup().await;

    let channel = fields(json!({ "number": 9, "name": "Nine", "programs": [] }));

    Mock::given(method("PUT"))
        .and(path("/api/channel"))
        .and(body_json(json!({ "number": 9, "name": "Nine", "programs": [] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "number": 9 })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/channel"))
        .respond_with(ResponseTemplate::new(200).set_body_string(""))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api/channel"))
        .and(body_json(json!({ "number": 9 })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client.add_channel(&channel).await.unwrap();
    client.update_channel(&channel).await.unwrap();
    client.delete_channel(9).await.unwrap();
}

// ── Settings ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_settings_round_trip_per_kind() {
    let (server, client) = setup().await;

    for kind in SettingsKind::ALL {
        let endpoint = format!("/api/{}", kind.endpoint());

        Mock::given(method("GET"))
            .and(path(endpoint.clone()))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "_id": kind.endpoint() })),
            )
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path(endpoint.clone()))
            .and(body_json(json!({ "_id": kind.endpoint() })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
    }

    for kind in SettingsKind::ALL {
        let settings = client.get_settings(kind).await.unwrap();
        assert_eq!(settings["_id"], json!(kind.endpoint()));
        client.reset_settings(kind, kind.endpoint()).await.unwrap();
    }
}

#[tokio::test]
async fn test_update_settings_puts_full_bundle() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/hdhr-settings"))
        .and(body_json(json!({ "_id": "h1", "tunerCount": 4, "autoDiscovery": false })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let bundle = fields(json!({ "_id": "h1", "tunerCount": 4, "autoDiscovery": false }));
    client
        .update_settings(SettingsKind::Hdhr, &bundle)
        .await
        .unwrap();
}

// ── Plex servers ────────────────────────────────────────────────────

#[tokio::test]
async fn test_plex_server_status_variants() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/plex-servers/status"))
        .and(body_json(json!({ "name": "Home" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": 1 })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/plex-servers/status"))
        .and(body_json(json!({ "name": "Away" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": -1 })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/plex-servers/foreignstatus"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    assert!(client.plex_server_status("Home").await.unwrap());
    assert!(!client.plex_server_status("Away").await.unwrap());
    assert!(!client.plex_server_foreign_status("Home").await.unwrap());
}

#[tokio::test]
async fn test_delete_plex_server_by_name() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/plex-servers"))
        .and(body_json(json!({ "name": "Home" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client.delete_plex_server("Home").await.unwrap();
}

// ── Guide ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_xmltv_xml_and_last_refresh() {
    let (server, client) = setup().await;

    let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<tv generator-info-name="dizquetv">
  <channel id="1"><display-name>One</display-name></channel>
  <programme start="20240101000000 +0000" stop="20240101010000 +0000" channel="1">
    <title lang="en">Heat</title>
  </programme>
</tv>"#;

    Mock::given(method("GET"))
        .and(path("/api/xmltv.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(xml))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/xmltv-last-refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!("2024-01-01T00:00:00.000Z")))
        .mount(&server)
        .await;

    let tv = client.xmltv_xml().await.unwrap();
    assert_eq!(tv.name, "tv");
    let channel = tv.get_child("channel").unwrap();
    assert_eq!(channel.attributes.get("id").map(String::as_str), Some("1"));
    assert!(tv.get_child("programme").is_some());

    assert_eq!(
        client.xmltv_last_refresh().await.unwrap(),
        "2024-01-01T00:00:00.000Z"
    );
}

#[tokio::test]
async fn test_xmltv_xml_malformed() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/xmltv.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<tv><channel></tv>"))
        .mount(&server)
        .await;

    let result = client.xmltv_xml().await;
    assert!(matches!(result, Err(Error::Xml(_))), "got: {result:?}");
}

#[tokio::test]
async fn test_m3u() {
    let (server, client) = setup().await;

    let body = format!(
        "#EXTM3U url-tvg=\"{0}/api/xmltv.xml\"\n#EXTINF:0 tvg-id=\"1\" tvg-chno=\"1\" tvg-name=\"One\" group-title=\"dizqueTV\",One\n{0}/video?channel=1\n",
        server.uri()
    );

    Mock::given(method("GET"))
        .and(path("/api/channels.m3u"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let playlist = client.m3u().await.unwrap();
    assert_eq!(playlist.entries.len(), 1);
    assert_eq!(playlist.entries[0].title, "One");
    assert_eq!(
        playlist.channel(1).unwrap().uri,
        format!("{}/video?channel=1", server.uri())
    );
}

// ── Error tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_error_500_is_api_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let result = client.version().await;
    match result {
        Err(ref e @ Error::Api { status, ref message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "boom");
            assert!(e.is_transient());
        }
        other => panic!("expected Api 500 error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    // Nothing listens on port 1.
    let client = DizqueClient::with_client("http://127.0.0.1:1", reqwest::Client::new()).unwrap();
    let result = client.channel_numbers().await;

    match result {
        Err(ref e @ Error::Transport(_)) => assert!(e.is_transient()),
        other => panic!("expected transport error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_json_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/channelNumbers"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let result = client.channel_numbers().await;
    assert!(
        matches!(result, Err(Error::Deserialization { ref body, .. }) if body == "<html>"),
        "got: {result:?}"
    );
}
