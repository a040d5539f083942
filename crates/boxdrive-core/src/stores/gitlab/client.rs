//! Thin typed client for the GitLab repository-files and tree APIs.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Percent-encoding set for a file path travelling as one URL segment:
/// everything but unreserved characters, so `/` becomes `%2F`.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Payload for the create-file (POST) and update-file (PUT) endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct CreateFile {
    /// Target branch.
    pub branch: String,
    /// Commit message for the resulting commit.
    pub commit_message: String,
    /// Base64-encoded file content.
    pub content: String,
    /// Content transfer encoding; always `base64` here.
    pub encoding: &'static str,
}

/// Parameters for the delete-file endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteFile {
    /// Target branch.
    pub branch: String,
    /// Commit message for the resulting commit.
    pub commit_message: String,
}

/// Response body of the get-file endpoint (fields we read).
#[derive(Debug, Deserialize)]
pub struct File {
    /// Base64-encoded file content.
    pub content: String,
}

/// Metadata returned by a HEAD on a file, sourced from response headers.
#[derive(Debug, Clone)]
pub struct FileHead {
    /// File size in bytes (`x-gitlab-size`).
    pub size: u64,
    /// SHA-256 of the content (`x-gitlab-content-sha256`).
    pub content_sha256: String,
}

/// Query parameters for the repository-tree endpoint.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TreeParams {
    /// Branch to read.
    #[serde(rename = "ref")]
    pub r#ref: String,
    /// Subtree path to scope the walk to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Whether to walk recursively.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recursive: Option<bool>,
    /// 1-based page number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// Page size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
}

/// Kind of a tree entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeItemType {
    /// A file.
    Blob,
    /// A directory.
    Tree,
}

/// One entry of a repository tree page.
#[derive(Debug, Clone, Deserialize)]
pub struct TreeItem {
    /// Entry name (last path component).
    pub name: String,
    /// Entry kind.
    #[serde(rename = "type")]
    pub item_type: TreeItemType,
    /// Full path from the repository root.
    pub path: String,
}

/// One page of a repository tree plus pagination metadata.
#[derive(Debug, Clone)]
pub struct Tree {
    /// Entries on this page.
    pub items: Vec<TreeItem>,
    /// Total number of pages (`x-total-pages`; 0 for an empty tree).
    pub total_pages: u32,
}

/// Client for one GitLab project, sharing a single pooled HTTP client.
#[derive(Debug)]
pub struct GitlabClient {
    client: reqwest::Client,
    repo_id: u64,
    api_url: String,
}

impl GitlabClient {
    /// Build a client for `repo_id` authenticating with a bearer token.
    pub fn new(repo_id: u64, access_token: &str, api_url: &str) -> StoreResult<Self> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {access_token}")).map_err(|_| {
            StoreError::Remote {
                status: 0,
                message: "access token contains invalid header characters".to_owned(),
            }
        })?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let client = reqwest::Client::builder().default_headers(headers).build()?;
        Ok(Self {
            client,
            repo_id,
            api_url: api_url.trim_end_matches('/').to_owned(),
        })
    }

    /// URL of the repository-files endpoint for one file path.
    fn file_url(&self, file_path: &str) -> String {
        let encoded = utf8_percent_encode(file_path, PATH_SEGMENT);
        format!(
            "{}/projects/{}/repository/files/{}",
            self.api_url, self.repo_id, encoded
        )
    }

    /// URL of the repository-tree endpoint.
    fn tree_url(&self) -> String {
        format!("{}/projects/{}/repository/tree", self.api_url, self.repo_id)
    }

    /// Create a file (POST). The caller inspects the status.
    pub async fn create_file(
        &self,
        file_path: &str,
        body: &CreateFile,
    ) -> StoreResult<reqwest::Response> {
        let resp = self
            .client
            .post(self.file_url(file_path))
            .json(body)
            .send()
            .await?;
        Ok(resp)
    }

    /// Update an existing file (PUT). The caller inspects the status.
    pub async fn update_file(
        &self,
        file_path: &str,
        body: &CreateFile,
    ) -> StoreResult<reqwest::Response> {
        let resp = self
            .client
            .put(self.file_url(file_path))
            .json(body)
            .send()
            .await?;
        Ok(resp)
    }

    /// Delete a file (DELETE). The caller inspects the status.
    pub async fn delete_file(
        &self,
        file_path: &str,
        params: &DeleteFile,
    ) -> StoreResult<reqwest::Response> {
        let resp = self
            .client
            .delete(self.file_url(file_path))
            .query(params)
            .send()
            .await?;
        Ok(resp)
    }

    /// Fetch a file's content envelope (GET). The caller inspects the status.
    pub async fn get_file(&self, file_path: &str, r#ref: &str) -> StoreResult<reqwest::Response> {
        let resp = self
            .client
            .get(self.file_url(file_path))
            .query(&[("ref", r#ref)])
            .send()
            .await?;
        Ok(resp)
    }

    /// HEAD a file, returning its metadata headers.
    ///
    /// Returns `Ok(None)` when the file does not exist on the branch.
    pub async fn head_file(&self, file_path: &str, r#ref: &str) -> StoreResult<Option<FileHead>> {
        let resp = self
            .client
            .head(self.file_url(file_path))
            .query(&[("ref", r#ref)])
            .send()
            .await?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(remote_error(resp).await);
        }

        let size = header_value(&resp, "x-gitlab-size")?
            .parse::<u64>()
            .map_err(|_| StoreError::Remote {
                status: 200,
                message: "x-gitlab-size header is not an integer".to_owned(),
            })?;
        let content_sha256 = header_value(&resp, "x-gitlab-content-sha256")?.to_owned();
        Ok(Some(FileHead {
            size,
            content_sha256,
        }))
    }

    /// Fetch one page of the repository tree.
    pub async fn get_tree(&self, params: &TreeParams) -> StoreResult<Tree> {
        let resp = self
            .client
            .get(self.tree_url())
            .query(params)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(remote_error(resp).await);
        }

        // Absent pagination headers mean an empty tree.
        let total_pages = resp
            .headers()
            .get("x-total-pages")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(0);

        let items: Vec<TreeItem> = resp.json().await?;
        Ok(Tree { items, total_pages })
    }
}

/// Extract a required header as a string slice.
fn header_value<'a>(resp: &'a reqwest::Response, name: &str) -> StoreResult<&'a str> {
    resp.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| StoreError::Remote {
            status: resp.status().as_u16(),
            message: format!("missing {name} header in response"),
        })
}

/// Turn an unexpected remote response into a `StoreError`.
pub async fn remote_error(resp: reqwest::Response) -> StoreError {
    let status = resp.status().as_u16();
    let message = resp.text().await.unwrap_or_default();
    StoreError::Remote { status, message }
}
