//! Google Drive API v3.

use crate::http::ApiClient;
use async_trait::async_trait;
use relay_runtime::{DriveCapability, DriveFile, DriveQuery, FOLDER_MIME_TYPE, PermissionRequest};
use serde::Deserialize;
use serde_json::json;
use std::path::Path;
use tracing::debug;

const FILE_FIELDS: &str = "id,name,mimeType,size,parents,modifiedTime,webViewLink";

// ============================================================================
// API types
// ============================================================================

#[derive(Debug, Deserialize)]
struct FileListResponse {
    #[serde(default)]
    files: Vec<RawFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFile {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    mime_type: String,
    /// Drive reports sizes as decimal strings.
    #[serde(default)]
    size: Option<String>,
    #[serde(default)]
    parents: Vec<String>,
    #[serde(default)]
    modified_time: Option<String>,
    #[serde(default)]
    web_view_link: Option<String>,
}

impl From<RawFile> for DriveFile {
    fn from(raw: RawFile) -> Self {
        DriveFile {
            id: raw.id,
            name: raw.name,
            mime_type: raw.mime_type,
            size: raw.size.and_then(|s| s.parse().ok()),
            parents: raw.parents,
            modified_time: raw.modified_time,
            web_view_link: raw.web_view_link,
        }
    }
}

/// Quote a value for the Drive query language.
fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// Render a listing filter as a Drive `q` expression. Trashed files are
/// always excluded.
pub fn build_query(query: &DriveQuery) -> String {
    let mut clauses = Vec::new();
    if let Some(name) = &query.name_equals {
        clauses.push(format!("name = {}", quote(name)));
    }
    if let Some(name) = &query.name_contains {
        clauses.push(format!("name contains {}", quote(name)));
    }
    if let Some(mime) = &query.mime_type {
        clauses.push(format!("mimeType = {}", quote(mime)));
    }
    clauses.push("trashed = false".to_string());
    clauses.join(" and ")
}

fn permission_body(request: &PermissionRequest) -> serde_json::Value {
    match request.kind.as_str() {
        "anyone" => json!({ "type": "anyone", "role": request.role }),
        "domain" => {
            let domain = request
                .email
                .rsplit_once('@')
                .map_or(request.email.as_str(), |(_, d)| d);
            json!({ "type": "domain", "role": request.role, "domain": domain })
        }
        kind => json!({ "type": kind, "role": request.role, "emailAddress": request.email }),
    }
}

fn multipart_related(boundary: &str, metadata: &serde_json::Value, content_type: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(data.len() + 512);
    body.extend_from_slice(
        format!(
            "--{b}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{meta}\r\n--{b}\r\nContent-Type: {ct}\r\n\r\n",
            b = boundary,
            meta = metadata,
            ct = content_type
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());
    body
}

// ============================================================================
// Client
// ============================================================================

pub struct DriveClient {
    api: ApiClient,
    base_url: String,
    upload_url: String,
}

impl DriveClient {
    pub fn new(api: ApiClient, base_url: impl Into<String>, upload_url: impl Into<String>) -> Self {
        Self {
            api,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            upload_url: upload_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn file_url(&self, id: &str) -> String {
        format!("{}/files/{}", self.base_url, id)
    }
}

#[async_trait]
impl DriveCapability for DriveClient {
    async fn list(&self, query: &DriveQuery) -> anyhow::Result<Vec<DriveFile>> {
        let q = build_query(query);
        debug!(q = %q, limit = query.limit, "listing drive files");
        let list: FileListResponse = self
            .api
            .json(self.api.get(&format!("{}/files", self.base_url)).query(&[
                ("q", q),
                ("pageSize", query.limit.to_string()),
                ("fields", format!("files({})", FILE_FIELDS)),
            ]))
            .await?;
        Ok(list.files.into_iter().map(DriveFile::from).collect())
    }

    async fn get(&self, id: &str) -> anyhow::Result<DriveFile> {
        let raw: RawFile = self
            .api
            .json(self.api.get(&self.file_url(id)).query(&[("fields", FILE_FIELDS)]))
            .await?;
        Ok(raw.into())
    }

    async fn download(&self, id: &str, dest: &Path) -> anyhow::Result<u64> {
        let resp = self
            .api
            .send(self.api.get(&self.file_url(id)).query(&[("alt", "media")]))
            .await?;
        let bytes = resp.bytes().await?;
        tokio::fs::write(dest, &bytes).await?;
        Ok(bytes.len() as u64)
    }

    async fn upload(
        &self,
        path: &Path,
        folder_id: Option<&str>,
        mime_type: Option<&str>,
    ) -> anyhow::Result<DriveFile> {
        let data = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| anyhow::anyhow!("{} has no file name", path.display()))?;
        let content_type = mime_type.map(str::to_string).unwrap_or_else(|| {
            mime_guess::from_path(path)
                .first_or_octet_stream()
                .to_string()
        });

        let mut metadata = json!({ "name": name });
        if let Some(folder) = folder_id {
            metadata["parents"] = json!([folder]);
        }

        let boundary = format!("relay-{}", uuid::Uuid::new_v4().simple());
        let body = multipart_related(&boundary, &metadata, &content_type, &data);

        let raw: RawFile = self
            .api
            .json(
                self.api
                    .post(&format!("{}/files", self.upload_url))
                    .query(&[("uploadType", "multipart"), ("fields", FILE_FIELDS)])
                    .header(
                        reqwest::header::CONTENT_TYPE,
                        format!("multipart/related; boundary={}", boundary),
                    )
                    .body(body),
            )
            .await?;
        Ok(raw.into())
    }

    async fn delete(&self, id: &str) -> anyhow::Result<()> {
        self.api.execute(self.api.delete(&self.file_url(id))).await?;
        Ok(())
    }

    async fn create_folder(&self, name: &str, parent_id: Option<&str>) -> anyhow::Result<DriveFile> {
        let mut metadata = json!({ "name": name, "mimeType": FOLDER_MIME_TYPE });
        if let Some(parent) = parent_id {
            metadata["parents"] = json!([parent]);
        }
        let raw: RawFile = self
            .api
            .json(
                self.api
                    .post(&format!("{}/files", self.base_url))
                    .query(&[("fields", FILE_FIELDS)])
                    .json(&metadata),
            )
            .await?;
        Ok(raw.into())
    }

    async fn update_parents(
        &self,
        id: &str,
        add_parent: &str,
        remove_parents: &[String],
    ) -> anyhow::Result<DriveFile> {
        let raw: RawFile = self
            .api
            .json(
                self.api
                    .patch(&self.file_url(id))
                    .query(&[
                        ("addParents", add_parent.to_string()),
                        ("removeParents", remove_parents.join(",")),
                        ("fields", FILE_FIELDS.to_string()),
                    ])
                    .json(&json!({})),
            )
            .await?;
        Ok(raw.into())
    }

    async fn create_permission(&self, id: &str, request: &PermissionRequest) -> anyhow::Result<()> {
        self.api
            .execute(
                self.api
                    .post(&format!("{}/permissions", self.file_url(id)))
                    .json(&permission_body(request)),
            )
            .await?;
        Ok(())
    }
}
