//! CI workflow dispatch over the GitHub Actions API.
//!
//! The request is fully built here (URL, headers, JSON body); the
//! `WorkflowApi` trait is the boundary tests replace to observe calls
//! without any network.

use reqwest::blocking::Client;
use serde_json::{json, Value};

pub const GITHUB_API: &str = "https://api.github.com";

/// Environment variable holding the CI bearer token.
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

pub fn token_from_env() -> Option<String> {
    std::env::var(TOKEN_ENV).ok().filter(|t| !t.is_empty())
}

/// A fully-bound workflow dispatch request.
#[derive(Debug, Clone)]
pub struct DispatchRequest {
    pub owner: String,
    pub repo: String,
    pub workflow_id: String,
    pub git_ref: String,
    pub inputs: Option<Value>,
    pub token: String,
}

impl DispatchRequest {
    pub fn url(&self, api_base: &str) -> String {
        format!(
            "{}/repos/{}/{}/actions/workflows/{}/dispatches",
            api_base, self.owner, self.repo, self.workflow_id
        )
    }

    pub fn body(&self) -> Value {
        let mut body = json!({ "ref": self.git_ref });
        if let Some(inputs) = &self.inputs {
            body["inputs"] = inputs.clone();
        }
        body
    }
}

/// Trait seam for the CI provider's dispatch endpoint.
///
/// Ok carries the HTTP status of a completed exchange; Err carries a
/// transport-level failure message. The dispatcher turns both into a
/// TriggerResult - nothing here is allowed to propagate further.
pub trait WorkflowApi {
    fn dispatch(&self, request: &DispatchRequest) -> std::result::Result<u16, String>;
}

/// reqwest-backed implementation against the real API.
pub struct GithubWorkflowApi {
    client: Client,
    api_base: String,
}

impl GithubWorkflowApi {
    pub fn new() -> Self {
        Self::with_base(GITHUB_API)
    }

    /// Point at a different API base (self-hosted or a test server).
    pub fn with_base(api_base: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_base: api_base.into(),
        }
    }
}

impl Default for GithubWorkflowApi {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkflowApi for GithubWorkflowApi {
    fn dispatch(&self, request: &DispatchRequest) -> std::result::Result<u16, String> {
        let response = self
            .client
            .post(request.url(&self.api_base))
            .header("Accept", "application/vnd.github.v3+json")
            .header("Authorization", format!("Bearer {}", request.token))
            .header("User-Agent", concat!("switchman/", env!("CARGO_PKG_VERSION")))
            .json(&request.body())
            .send()
            .map_err(|e| format!("HTTP request failed: {}", e))?;

        Ok(response.status().as_u16())
    }
}
