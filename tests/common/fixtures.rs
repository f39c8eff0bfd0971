//! Mock provider and relay fixtures built on wiremock.
#![allow(dead_code)]

use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const USERNAME: &str = "john";
pub const PASSWORD: &str = "secret123";

/// Playlist URL pointing at `server`.
#[must_use]
pub fn playlist_url(server: &MockServer) -> String {
    format!(
        "{}/get.php?username={USERNAME}&password={PASSWORD}&type=m3u_plus",
        server.uri()
    )
}

/// Introspection endpoint the extractor derives for `server`.
#[must_use]
pub fn account_endpoint(server: &MockServer) -> String {
    format!(
        "{}/player_api.php?username={USERNAME}&password={PASSWORD}",
        server.uri()
    )
}

/// `player_api.php` answer for the sample account (expires 2025-01-01).
#[must_use]
pub fn account_body() -> Value {
    json!({
        "user_info": {
            "username": USERNAME,
            "password": PASSWORD,
            "message": "",
            "auth": 1,
            "status": "Active",
            "exp_date": "1735689600",
            "is_trial": "0",
            "active_cons": "0",
            "created_at": "1704067200",
            "max_connections": "2",
            "allowed_output_formats": ["m3u8", "ts"]
        },
        "server_info": {
            "url": "iptv.example.com",
            "port": "8080",
            "server_protocol": "http",
            "timezone": "UTC"
        }
    })
}

#[must_use]
pub fn categories_body() -> Value {
    json!([
        { "category_id": "1", "category_name": "Sports", "parent_id": 0 },
        { "category_id": "2", "category_name": "News", "parent_id": 0 },
        { "category_id": "3", "category_name": "Movies", "parent_id": 0 }
    ])
}

/// Mount the account and category endpoints on `server`.
pub async fn mount_provider(server: &MockServer, account: Value, categories: Value) {
    Mock::given(method("GET"))
        .and(path("/player_api.php"))
        .and(query_param("username", USERNAME))
        .and(query_param("password", PASSWORD))
        .and(query_param_is_missing("action"))
        .respond_with(ResponseTemplate::new(200).set_body_json(account))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/player_api.php"))
        .and(query_param("action", "get_live_categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(categories))
        .mount(server)
        .await;
}

/// Relay template on `relay` that receives the target as `?url=`.
#[must_use]
pub fn relay_template(relay: &MockServer, route: &str) -> String {
    format!("{}{route}?url={{url}}", relay.uri())
}

/// Config file body with the given relays and direct policy.
#[must_use]
pub fn config_toml(direct: &str, timeout_seconds: u64, proxies: &[(&str, String)]) -> String {
    let mut out = format!(
        "[general]\ntimeout_seconds = {timeout_seconds}\n\n[transport]\ndirect = \"{direct}\"\n"
    );
    for (name, template) in proxies {
        out.push_str(&format!(
            "\n[[proxies]]\nname = \"{name}\"\ntemplate = \"{template}\"\n"
        ));
    }
    out
}
