//! Drive actions. None of them touch the execution context.

use crate::capability::{DriveCapability, DriveFile, DriveQuery, PermissionRequest};
use crate::context::ContextUpdate;
use crate::dispatcher::StepOutcome;
use crate::resolver::NameResolver;
use anyhow::Context;
use relay_core::{ActionStep, DispatchError, DriveActionKind, DriveConfig, Params, Service};
use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

const SHARE_ROLES: &[&str] = &["reader", "commenter", "writer"];
const SHARE_TYPES: &[&str] = &["user", "group", "domain", "anyone"];

#[derive(Debug, Clone, PartialEq)]
pub enum DriveAction {
    ListFiles {
        name_contains: Option<String>,
        mime_type: Option<String>,
        count: usize,
    },
    GetFileInfo {
        file_id: String,
    },
    /// `file` is an id or an exact file name.
    DownloadFile {
        file: String,
        destination: Option<PathBuf>,
    },
    UploadFile {
        path: PathBuf,
        folder: Option<String>,
        mime_type: Option<String>,
    },
    DeleteFile {
        file_id: String,
    },
    CreateFolder {
        name: String,
        parent: Option<String>,
    },
    MoveFile {
        file_id: String,
        folder: String,
    },
    ShareFile {
        file_id: String,
        permission: PermissionRequest,
    },
}

impl DriveAction {
    pub fn parse(step: &ActionStep, config: &DriveConfig) -> Result<Self, DispatchError> {
        let kind = DriveActionKind::parse(&step.action).ok_or_else(|| {
            DispatchError::UnsupportedAction {
                service: Service::Drive,
                action: step.action.clone(),
            }
        })?;
        let name = kind.name();
        let p = &step.parameters;

        let action = match kind {
            DriveActionKind::ListFiles => DriveAction::ListFiles {
                name_contains: p.string_any(&["name", "name_contains", "query"]),
                mime_type: p.string("mime_type"),
                count: p
                    .count(name, &["count", "page_size", "max_results"])?
                    .unwrap_or(config.default_list_count),
            },
            DriveActionKind::GetFileInfo => DriveAction::GetFileInfo {
                file_id: file_id(p, name)?,
            },
            DriveActionKind::DownloadFile => DriveAction::DownloadFile {
                file: file_id(p, name)?,
                destination: p.string_any(&["destination", "path"]).map(PathBuf::from),
            },
            DriveActionKind::UploadFile => DriveAction::UploadFile {
                path: p
                    .string_any(&["path", "file_path"])
                    .map(PathBuf::from)
                    .ok_or_else(|| DispatchError::missing_parameter(name, "path"))?,
                folder: p.string_any(&["folder", "folder_id"]),
                mime_type: p.string("mime_type"),
            },
            DriveActionKind::DeleteFile => DriveAction::DeleteFile {
                file_id: file_id(p, name)?,
            },
            DriveActionKind::CreateFolder => DriveAction::CreateFolder {
                name: p.require_string(name, "name")?,
                parent: p.string_any(&["parent", "parent_id"]),
            },
            DriveActionKind::MoveFile => DriveAction::MoveFile {
                file_id: file_id(p, name)?,
                folder: p
                    .string_any(&["folder", "folder_id"])
                    .ok_or_else(|| DispatchError::missing_parameter(name, "folder"))?,
            },
            DriveActionKind::ShareFile => {
                let role = p.string("role").unwrap_or_else(|| "reader".to_string());
                let kind = p.string("type").unwrap_or_else(|| "user".to_string());
                one_of(name, "role", &role, SHARE_ROLES)?;
                one_of(name, "type", &kind, SHARE_TYPES)?;
                DriveAction::ShareFile {
                    file_id: file_id(p, name)?,
                    permission: PermissionRequest {
                        email: p.require_string(name, "email")?,
                        role,
                        kind,
                    },
                }
            }
        };
        Ok(action)
    }
}

fn file_id(p: &Params, action: &str) -> Result<String, DispatchError> {
    p.literal_id("file_id")
        .or_else(|| p.literal_id("id"))
        .ok_or_else(|| DispatchError::missing_parameter(action, "file_id"))
}

fn one_of(action: &str, key: &str, value: &str, allowed: &[&str]) -> Result<(), DispatchError> {
    if allowed.contains(&value) {
        return Ok(());
    }
    Err(DispatchError::invalid_parameter(
        action,
        key,
        format!("expected one of {}, got '{}'", allowed.join(", "), value),
    ))
}

/// Final component of a remote file name, so a download stays inside the
/// download directory whatever the name contains.
fn local_file_name(remote: &str) -> Option<&OsStr> {
    match Path::new(remote).components().next_back()? {
        Component::Normal(name) => Some(name),
        _ => None,
    }
}

fn describe(file: &DriveFile) -> String {
    match file.size {
        Some(size) => format!("- {} ({}, {} bytes) [{}]", file.name, file.mime_type, size, file.id),
        None => format!("- {} ({}) [{}]", file.name, file.mime_type, file.id),
    }
}

/// Runs drive actions against one capability.
pub struct DriveExecutor<'a> {
    pub drive: &'a dyn DriveCapability,
    pub resolver: &'a mut NameResolver,
    pub config: &'a DriveConfig,
}

impl DriveExecutor<'_> {
    pub async fn run(&mut self, action: DriveAction) -> Result<StepOutcome, DispatchError> {
        let outcome = StepOutcome::new(ContextUpdate::Keep);

        match action {
            DriveAction::ListFiles {
                name_contains,
                mime_type,
                count,
            } => {
                let query = DriveQuery {
                    name_contains,
                    mime_type,
                    limit: count,
                    ..Default::default()
                };
                let files = self.drive.list(&query).await?;
                Ok(outcome
                    .line(format!("Found {} files", files.len()))
                    .lines(files.iter().map(describe)))
            }

            DriveAction::GetFileInfo { file_id } => {
                let file = self.drive.get(&file_id).await?;
                let mut outcome = outcome
                    .line(format!("Name: {}", file.name))
                    .line(format!("ID: {}", file.id))
                    .line(format!("Type: {}", file.mime_type));
                if let Some(size) = file.size {
                    outcome = outcome.line(format!("Size: {} bytes", size));
                }
                if let Some(modified) = &file.modified_time {
                    outcome = outcome.line(format!("Modified: {}", modified));
                }
                if let Some(link) = &file.web_view_link {
                    outcome = outcome.line(format!("Link: {}", link));
                }
                Ok(outcome)
            }

            DriveAction::DownloadFile { file, destination } => {
                let id = self.resolver.file(self.drive, &file).await?;
                let dest = match destination {
                    Some(dest) => dest,
                    None => {
                        let meta = self.drive.get(&id).await?;
                        let local = local_file_name(&meta.name).ok_or_else(|| {
                            DispatchError::invalid_parameter(
                                "download_file",
                                "file_id",
                                format!("remote name '{}' is not a usable file name", meta.name),
                            )
                        })?;
                        std::fs::create_dir_all(&self.config.download_dir).with_context(|| {
                            format!("creating {}", self.config.download_dir.display())
                        })?;
                        self.config.download_dir.join(local)
                    }
                };
                let bytes = self.drive.download(&id, &dest).await?;
                Ok(outcome.line(format!("Downloaded {} bytes to {}", bytes, dest.display())))
            }

            DriveAction::UploadFile {
                path,
                folder,
                mime_type,
            } => {
                if !path.is_file() {
                    return Err(DispatchError::invalid_parameter(
                        "upload_file",
                        "path",
                        format!("{} is not a readable file", path.display()),
                    ));
                }
                let folder_id = match folder {
                    Some(folder) => Some(self.resolver.folder(self.drive, &folder).await?),
                    None => None,
                };
                let uploaded = self
                    .drive
                    .upload(&path, folder_id.as_deref(), mime_type.as_deref())
                    .await?;
                Ok(outcome.line(format!("Uploaded '{}' ({})", uploaded.name, uploaded.id)))
            }

            DriveAction::DeleteFile { file_id } => {
                self.drive.delete(&file_id).await?;
                self.resolver.forget(&file_id);
                Ok(outcome.line(format!("Deleted {}", file_id)))
            }

            DriveAction::CreateFolder { name, parent } => {
                let parent_id = match parent {
                    Some(parent) => Some(self.resolver.folder(self.drive, &parent).await?),
                    None => None,
                };
                let folder = self.drive.create_folder(&name, parent_id.as_deref()).await?;
                self.resolver.register_folder(&name, &folder.id);
                debug!(name = %name, id = %folder.id, "registered new folder");
                Ok(outcome.line(format!("Folder '{}' created ({})", name, folder.id)))
            }

            DriveAction::MoveFile { file_id, folder } => {
                let folder_id = self.resolver.folder(self.drive, &folder).await?;
                let current = self.drive.get(&file_id).await?;
                let moved = self
                    .drive
                    .update_parents(&file_id, &folder_id, &current.parents)
                    .await?;
                Ok(outcome.line(format!("Moved '{}' to {}", moved.name, folder)))
            }

            DriveAction::ShareFile {
                file_id,
                permission,
            } => {
                self.drive.create_permission(&file_id, &permission).await?;
                Ok(outcome.line(format!(
                    "Shared {} with {} as {}",
                    file_id, permission.email, permission.role
                )))
            }
        }
    }
}
