//! Wiremock helpers mimicking the GitHub REST endpoints the catalog uses

use pluginkit_catalog::GitHubCatalog;
use pluginkit_core::config::HttpConfig;
use pluginkit_core::{Catalog, CatalogSettings, Platform};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const OWNER: &str = "acme";
pub const TOPIC: &str = "pk-plugin";
pub const PREFIX: &str = "pk";

/// Catalog pointed at `server`, resolving for linux/amd64
pub fn github_catalog(server: &MockServer) -> GitHubCatalog {
    github_catalog_with(server, &[])
}

/// Like [`github_catalog`] with extra settings layered on top
pub fn github_catalog_with(server: &MockServer, extra: &[(&str, &str)]) -> GitHubCatalog {
    let mut settings = CatalogSettings::new();
    settings.insert("owner".into(), OWNER.into());
    settings.insert("topic".into(), TOPIC.into());
    settings.insert("prefix".into(), PREFIX.into());
    settings.insert("api_url".into(), server.uri());
    for (key, value) in extra {
        settings.insert(key.to_string(), value.to_string());
    }

    let mut catalog = GitHubCatalog::new(&HttpConfig::default())
        .unwrap()
        .with_platform(Platform::new("linux", "amd64"));
    catalog.setup(&settings).unwrap();
    catalog
}

/// `GET /repos/{owner}/{repo}`
pub async fn mock_repository(server: &MockServer, repo: &str, description: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/repos/{}/{}", OWNER, repo)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": repo,
            "description": description,
            "html_url": format!("https://github.com/{}/{}", OWNER, repo),
            "stargazers_count": 7,
        })))
        .mount(server)
        .await;
}

fn release_body(server: &MockServer, tag: &str, assets: &[&str]) -> serde_json::Value {
    let assets: Vec<_> = assets
        .iter()
        .map(|name| {
            json!({
                "name": name,
                "browser_download_url": format!("{}/downloads/{}", server.uri(), name),
                "size": 42,
            })
        })
        .collect();
    json!({
        "tag_name": tag,
        "prerelease": false,
        "published_at": "2026-01-02T03:04:05Z",
        "assets": assets,
    })
}

/// `GET /repos/{owner}/{repo}/releases/latest`
pub async fn mock_latest_release(server: &MockServer, repo: &str, tag: &str, assets: &[&str]) {
    Mock::given(method("GET"))
        .and(path(format!("/repos/{}/{}/releases/latest", OWNER, repo)))
        .respond_with(ResponseTemplate::new(200).set_body_json(release_body(server, tag, assets)))
        .mount(server)
        .await;
}

/// `GET /repos/{owner}/{repo}/releases/tags/{tag}`
pub async fn mock_tagged_release(server: &MockServer, repo: &str, tag: &str, assets: &[&str]) {
    Mock::given(method("GET"))
        .and(path(format!("/repos/{}/{}/releases/tags/{}", OWNER, repo, tag)))
        .respond_with(ResponseTemplate::new(200).set_body_json(release_body(server, tag, assets)))
        .mount(server)
        .await;
}

/// Any request under `route` answers with `status`
pub async fn mock_status(server: &MockServer, route: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(route.to_string()))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// `GET /downloads/{asset}`
pub async fn mock_asset_download(server: &MockServer, asset: &str, content: &[u8]) {
    Mock::given(method("GET"))
        .and(path(format!("/downloads/{}", asset)))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(content))
        .mount(server)
        .await;
}

/// `GET /search/repositories` listing `repos` as `(name, description)`
pub async fn mock_search(server: &MockServer, repos: &[(&str, &str)]) {
    let items: Vec<_> = repos
        .iter()
        .map(|(name, description)| {
            json!({
                "name": name,
                "description": description,
                "html_url": format!("https://github.com/{}/{}", OWNER, name),
                "stargazers_count": 3,
            })
        })
        .collect();
    Mock::given(method("GET"))
        .and(path("/search/repositories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_count": items.len(),
            "items": items,
        })))
        .mount(server)
        .await;
}
