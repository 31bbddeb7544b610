//! Minimal GitHub API client used by `clone-org`: list an organization's
//! repositories with pagination. Authenticates with `GITHUB_TOKEN` when set.

use anyhow::{bail, Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "https://api.github.com";
const PER_PAGE: u32 = 100;

/// One repository as returned by the GitHub API.
#[derive(Debug, Clone, Deserialize)]
pub struct Repo {
    pub name: String,
    #[serde(default)]
    pub clone_url: String,
    #[serde(default)]
    pub ssh_url: String,
    #[serde(default)]
    pub default_branch: String,
}

impl Repo {
    /// The URL to clone from: SSH when available, HTTPS otherwise.
    pub fn preferred_url(&self) -> Option<&str> {
        if !self.ssh_url.is_empty() {
            Some(&self.ssh_url)
        } else if !self.clone_url.is_empty() {
            Some(&self.clone_url)
        } else {
            None
        }
    }
}

pub struct GithubClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl GithubClient {
    pub fn new(token: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            token,
        }
    }

    /// Override the API base URL (tests, GitHub Enterprise).
    pub fn with_base_url(mut self, base: impl Into<String>) -> Self {
        let mut base = base.into();
        while base.ends_with('/') {
            base.pop();
        }
        self.base_url = base;
        self
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert(USER_AGENT, HeaderValue::from_static("kubeaudit"));
        if let Some(token) = &self.token {
            let value = HeaderValue::from_str(&format!("token {token}"))
                .context("invalid GITHUB_TOKEN")?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }

    /// List every repository of an organization, following pagination.
    pub async fn list_org_repos(&self, org: &str) -> Result<Vec<Repo>> {
        let mut all = Vec::new();
        let mut page = 1u32;
        loop {
            let url = format!("{}/orgs/{org}/repos", self.base_url);
            let resp = self
                .http
                .get(&url)
                .headers(self.headers()?)
                .query(&[("per_page", PER_PAGE), ("page", page)])
                .send()
                .await
                .with_context(|| format!("request {url} failed"))?;

            if !resp.status().is_success() {
                bail!("github api /orgs/{org}/repos: {}", resp.status());
            }
            let repos: Vec<Repo> = resp.json().await.context("decode repository list")?;
            if repos.is_empty() {
                break;
            }
            all.extend(repos);
            page += 1;
        }
        Ok(all)
    }
}
