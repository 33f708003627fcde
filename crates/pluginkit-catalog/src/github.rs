//! GitHub releases catalog
//!
//! Plugins are repositories owned by one account and tagged with a topic.
//! Each release carries one asset per platform, named after the repository.

use crate::assets::{filter_assets, find_asset, install_file_name, listing_runtime};
use async_trait::async_trait;
use pluginkit_core::catalog::{is_latest, required_setting, CRITERIA_QUERY};
use pluginkit_core::config::HttpConfig;
use pluginkit_core::types::validate_plugin_name;
use pluginkit_core::{
    CancellationToken, Catalog, CatalogSettings, Error, FetchedPlugin, Platform, PluginContent,
    PluginRecord, PluginStatus, Result, SearchCriteria,
};
use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

const DEFAULT_API_URL: &str = "https://api.github.com";
const SEARCH_PAGE_SIZE: &str = "100";

/// Repository information
#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    pub name: String,
    pub description: Option<String>,
    pub html_url: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
}

/// Release information
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    /// Release tag (e.g., "v1.2.0")
    pub tag_name: String,

    #[serde(default)]
    pub prerelease: bool,

    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,

    pub published_at: Option<String>,
}

/// Release asset
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseAsset {
    pub name: String,
    pub browser_download_url: String,
    #[serde(default)]
    pub size: u64,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<Repository>,
}

/// Catalog backed by GitHub repository releases
pub struct GitHubCatalog {
    client: reqwest::Client,
    api_url: String,
    owner: String,
    topic: String,
    prefix: String,
    token: Option<String>,
    platform: Platform,
}

impl GitHubCatalog {
    pub const ID: &'static str = "github";

    /// Create an unconfigured catalog; call [`Catalog::setup`] before use
    pub fn new(http: &HttpConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&http.user_agent)
            .timeout(Duration::from_secs(http.timeout_secs))
            .build()
            .map_err(|e| Error::validation(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_url: DEFAULT_API_URL.to_string(),
            owner: String::new(),
            topic: String::new(),
            prefix: String::new(),
            token: None,
            platform: Platform::current(),
        })
    }

    /// Resolve assets for `platform` instead of the host
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    fn ensure_configured(&self) -> Result<()> {
        if self.owner.is_empty() {
            return Err(Error::validation("github catalog used before setup"));
        }
        Ok(())
    }

    /// Plugin name without the `{prefix}-` repository prefix
    fn short_name<'a>(&self, repo: &'a str) -> &'a str {
        repo.strip_prefix(&self.prefix)
            .and_then(|rest| rest.strip_prefix('-'))
            .unwrap_or(repo)
    }

    async fn send(
        &self,
        cancel: &CancellationToken,
        url: &str,
        subject: &str,
        accept: &str,
    ) -> Result<reqwest::Response> {
        let mut request = self.client.get(url).header(ACCEPT, accept);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        debug!("GET {}", url);
        let response = cancellable(cancel, request.send())
            .await?
            .map_err(|e| Error::upstream(format!("request to {} failed: {}", url, e)))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(Error::not_found(subject));
        }
        if !status.is_success() {
            return Err(Error::upstream(format!("{} returned {}", url, status)));
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        cancel: &CancellationToken,
        url: &str,
        subject: &str,
    ) -> Result<T> {
        let response = self
            .send(cancel, url, subject, "application/vnd.github+json")
            .await?;
        cancellable(cancel, response.json::<T>())
            .await?
            .map_err(|e| Error::upstream(format!("invalid response from {}: {}", url, e)))
    }

    /// Repository metadata
    pub async fn get_repository(
        &self,
        cancel: &CancellationToken,
        repo: &str,
    ) -> Result<Repository> {
        let url = format!("{}/repos/{}/{}", self.api_url, self.owner, repo);
        self.get_json(cancel, &url, repo).await
    }

    /// Latest release, or the release tagged `version`
    pub async fn get_release(
        &self,
        cancel: &CancellationToken,
        repo: &str,
        version: &str,
    ) -> Result<Release> {
        let url = if is_latest(version) {
            format!("{}/repos/{}/{}/releases/latest", self.api_url, self.owner, repo)
        } else {
            format!(
                "{}/repos/{}/{}/releases/tags/{}",
                self.api_url, self.owner, repo, version
            )
        };
        let subject = if is_latest(version) {
            repo.to_string()
        } else {
            format!("{}@{}", repo, version)
        };
        self.get_json(cancel, &url, &subject).await
    }

    async fn download(
        &self,
        cancel: &CancellationToken,
        asset: &ReleaseAsset,
    ) -> Result<bytes::Bytes> {
        info!("Downloading {} ({} bytes)", asset.name, asset.size);
        let response = self
            .send(
                cancel,
                &asset.browser_download_url,
                &asset.name,
                "application/octet-stream",
            )
            .await?;
        cancellable(cancel, response.bytes()).await?.map_err(|e| {
            Error::upstream(format!("download of {} failed: {}", asset.name, e))
        })
    }
}

#[async_trait]
impl Catalog for GitHubCatalog {
    fn id(&self) -> &str {
        Self::ID
    }

    fn setup(&mut self, settings: &CatalogSettings) -> Result<()> {
        self.owner = required_setting(settings, "owner")?.to_string();
        self.topic = required_setting(settings, "topic")?.to_string();
        self.prefix = required_setting(settings, "prefix")?.to_string();
        self.token = settings
            .get("token")
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        if let Some(api_url) = settings.get("api_url").filter(|u| !u.trim().is_empty()) {
            Url::parse(api_url)
                .map_err(|e| Error::validation(format!("invalid api_url {}: {}", api_url, e)))?;
            self.api_url = api_url.trim_end_matches('/').to_string();
        }

        debug!(
            "GitHub catalog configured for {} (topic {}, prefix {})",
            self.owner, self.topic, self.prefix
        );
        Ok(())
    }

    async fn fetch(
        &self,
        cancel: &CancellationToken,
        name: &str,
        version: &str,
    ) -> Result<FetchedPlugin> {
        self.ensure_configured()?;
        validate_plugin_name(name)?;

        let repository = self.get_repository(cancel, name).await?;
        let release = self.get_release(cancel, name, version).await?;

        let names: Vec<String> = release.assets.iter().map(|a| a.name.clone()).collect();
        let resolved = find_asset(
            &self.prefix,
            name,
            &release.tag_name,
            &self.platform.os,
            &self.platform.arch,
            &names,
        )?;
        let asset = release
            .assets
            .iter()
            .find(|a| a.name == resolved.name)
            .ok_or_else(|| Error::upstream(format!("asset {} vanished", resolved.name)))?;

        let content = self.download(cancel, asset).await?;

        let mut record = PluginRecord::new(name);
        record.file_name = install_file_name(name, &asset.name);
        record.version = release.tag_name.clone();
        record.description = repository.description.unwrap_or_default();
        record.store_id = Self::ID.to_string();
        record.runtime_id = resolved.runtime.to_string();
        record.status = Some(PluginStatus::Available);
        record.metadata.insert("asset".into(), asset.name.clone());
        if let Some(url) = repository.html_url {
            record.metadata.insert("repository".into(), url);
        }
        if let Some(published) = release.published_at {
            record.metadata.insert("published_at".into(), published);
        }

        Ok(FetchedPlugin {
            record,
            content: PluginContent::Bytes(content),
        })
    }

    async fn search(
        &self,
        cancel: &CancellationToken,
        criteria: &SearchCriteria,
    ) -> Result<Vec<PluginRecord>> {
        self.ensure_configured()?;

        let mut query = format!("topic:{} user:{} fork:false", self.topic, self.owner);
        if let Some(text) = criteria.get(CRITERIA_QUERY).filter(|t| !t.trim().is_empty()) {
            query.push(' ');
            query.push_str(text.trim());
        }

        let mut url = Url::parse(&format!("{}/search/repositories", self.api_url))
            .map_err(|e| Error::validation(format!("invalid api_url {}: {}", self.api_url, e)))?;
        url.query_pairs_mut()
            .append_pair("q", &query)
            .append_pair("per_page", SEARCH_PAGE_SIZE);

        let response: SearchResponse = self.get_json(cancel, url.as_str(), &query).await?;

        let mut records = Vec::new();
        for repo in response.items {
            let release = match self.get_release(cancel, &repo.name, "latest").await {
                Ok(release) => release,
                Err(Error::Cancelled) => return Err(Error::Cancelled),
                Err(e) => {
                    warn!("Skipping {}: {}", repo.name, e);
                    continue;
                }
            };

            let names: Vec<String> = release.assets.iter().map(|a| a.name.clone()).collect();
            let version = release.tag_name.trim_start_matches('v');
            let listed = filter_assets(&self.prefix, self.short_name(&repo.name), version, &names);
            if listed.is_empty() {
                debug!("Skipping {}: no assets follow the naming convention", repo.name);
                continue;
            }

            let mut record = PluginRecord::new(&repo.name);
            record.version = release.tag_name.clone();
            record.description = repo.description.unwrap_or_default();
            record.store_id = Self::ID.to_string();
            record.runtime_id = listing_runtime(&listed).to_string();
            record.status = Some(PluginStatus::Available);
            record
                .metadata
                .insert("stars".into(), repo.stargazers_count.to_string());
            if let Some(url) = repo.html_url {
                record.metadata.insert("repository".into(), url);
            }
            records.push(record);
        }

        Ok(records)
    }
}

/// Race `future` against cancellation
async fn cancellable<F: Future>(cancel: &CancellationToken, future: F) -> Result<F::Output> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Error::Cancelled),
        output = future => Ok(output),
    }
}
