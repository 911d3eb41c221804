//! Name-to-ID resolution for labels, folders and files.
//!
//! Labels are matched case-insensitively and never cached: the label list is
//! fetched on every resolution. Folders are matched case-sensitively, the way
//! Drive filters names, and cached by name for the lifetime of the resolver.
//! Folder lookups are filtered by the backend; the account's folders are
//! never listed wholesale.
//! The cache is memoization only; a stale entry surfaces as a backend error
//! on the call that uses it.

use crate::capability::{DriveCapability, DriveFile, DriveQuery, Label, MailCapability};
use relay_core::{DispatchError, EntityKind};
use std::collections::HashMap;
use tracing::debug;

/// Upper bound on same-named folders fetched for a single resolution.
const FOLDER_MATCH_LIMIT: usize = 10;

/// Folder name to id cache.
#[derive(Debug, Clone, Default)]
pub struct ResolverCache {
    folders: HashMap<String, String>,
}

impl ResolverCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn folder(&self, name: &str) -> Option<&str> {
        self.folders.get(name).map(String::as_str)
    }

    pub fn remember_folder(&mut self, name: &str, id: &str) {
        self.folders.insert(name.to_string(), id.to_string());
    }

    /// Evict every entry pointing at `id`. Returns the number evicted.
    pub fn forget_id(&mut self, id: &str) -> usize {
        let before = self.folders.len();
        self.folders.retain(|_, cached| cached != id);
        before - self.folders.len()
    }

    pub fn len(&self) -> usize {
        self.folders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }
}

/// Match a label id or name against the current label list.
pub fn match_label(labels: &[Label], identifier: &str) -> Result<String, DispatchError> {
    if labels.iter().any(|l| l.id == identifier) {
        return Ok(identifier.to_string());
    }
    let wanted = identifier.to_lowercase();
    labels
        .iter()
        .find(|l| l.name.to_lowercase() == wanted)
        .map(|l| l.id.clone())
        .ok_or_else(|| DispatchError::not_found(EntityKind::Label, identifier))
}

/// Match a folder id or exact name against a folder listing.
pub fn match_folder(folders: &[DriveFile], identifier: &str) -> Option<String> {
    if folders.iter().any(|f| f.id == identifier) {
        return Some(identifier.to_string());
    }
    folders
        .iter()
        .find(|f| f.name == identifier)
        .map(|f| f.id.clone())
}

/// Heuristic: Drive ids contain `-` or `_`; values with neither are names.
pub fn looks_like_file_name(value: &str) -> bool {
    !value.contains('-') && !value.contains('_')
}

/// Resolves human-readable names to backend ids.
#[derive(Debug, Default)]
pub struct NameResolver {
    cache: ResolverCache,
}

impl NameResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cache(cache: ResolverCache) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &ResolverCache {
        &self.cache
    }

    /// Resolve a label id or name. Always consults the backend.
    pub async fn label(
        &self,
        mail: &dyn MailCapability,
        identifier: &str,
    ) -> Result<String, DispatchError> {
        let labels = mail.list_labels().await?;
        let id = match_label(&labels, identifier)?;
        debug!(identifier, id = %id, "resolved label");
        Ok(id)
    }

    /// Resolve a folder id or name, consulting the cache first.
    pub async fn folder(
        &mut self,
        drive: &dyn DriveCapability,
        identifier: &str,
    ) -> Result<String, DispatchError> {
        if let Some(id) = self.cache.folder(identifier) {
            debug!(identifier, id, "folder cache hit");
            return Ok(id.to_string());
        }

        let named = drive
            .list(&DriveQuery::folder_named(identifier, FOLDER_MATCH_LIMIT))
            .await?;
        if let Some(id) = match_folder(&named, identifier) {
            if id != identifier {
                self.cache.remember_folder(identifier, &id);
            }
            debug!(identifier, id = %id, "resolved folder");
            return Ok(id);
        }

        // Not a folder name; accept it as an id only if it names a folder.
        match drive.get(identifier).await {
            Ok(file) if file.is_folder() => {
                debug!(identifier, "identifier is a folder id");
                Ok(file.id)
            }
            Ok(file) => {
                debug!(identifier, mime_type = %file.mime_type, "identifier is not a folder");
                Err(DispatchError::not_found(EntityKind::Folder, identifier))
            }
            Err(e) => {
                debug!(identifier, error = %e, "folder lookup by id failed");
                Err(DispatchError::not_found(EntityKind::Folder, identifier))
            }
        }
    }

    /// Resolve a file id or exact file name. First match wins.
    pub async fn file(
        &self,
        drive: &dyn DriveCapability,
        identifier: &str,
    ) -> Result<String, DispatchError> {
        if !looks_like_file_name(identifier) {
            return Ok(identifier.to_string());
        }

        let matches = drive.list(&DriveQuery::named(identifier, 10)).await?;
        if matches.len() > 1 {
            debug!(identifier, count = matches.len(), "ambiguous file name, using first match");
        }
        matches
            .into_iter()
            .next()
            .map(|f| f.id)
            .ok_or_else(|| DispatchError::not_found(EntityKind::File, identifier))
    }

    /// Record a folder created in this session.
    pub fn register_folder(&mut self, name: &str, id: &str) {
        self.cache.remember_folder(name, id);
    }

    /// Drop cached names pointing at a deleted id.
    pub fn forget(&mut self, id: &str) {
        let evicted = self.cache.forget_id(id);
        if evicted > 0 {
            debug!(id, evicted, "evicted deleted folder from cache");
        }
    }
}
