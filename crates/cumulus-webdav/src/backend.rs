//! Dead property storage for one user's files.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use cumulus_core::result::AppResult;
use cumulus_database::repositories::PropertyRepository;
use cumulus_entity::property::PropertyChange;

/// Live properties that are never looked up in, or written to, the store.
pub const IGNORED_PROPERTIES: [&str; 9] = [
    "{DAV:}getcontentlength",
    "{DAV:}getcontenttype",
    "{DAV:}getetag",
    "{DAV:}quota-used-bytes",
    "{DAV:}quota-available-bytes",
    "{http://owncloud.org/ns}permissions",
    "{http://owncloud.org/ns}downloadURL",
    "{http://owncloud.org/ns}dDC",
    "{http://owncloud.org/ns}size",
];

/// Whether a property is served live and never stored.
pub fn is_ignored(name: &str) -> bool {
    IGNORED_PROPERTIES.contains(&name)
}

/// Property store for a single user, created per request.
///
/// Holds the complete property set of every path it has loaded. Writes
/// drop the affected entries.
#[derive(Debug)]
pub struct CustomPropertiesBackend {
    repo: Arc<PropertyRepository>,
    user_id: String,
    cache: HashMap<String, HashMap<String, String>>,
}

impl CustomPropertiesBackend {
    /// Creates a backend for `user_id`.
    pub fn new(repo: Arc<PropertyRepository>, user_id: impl Into<String>) -> Self {
        Self {
            repo,
            user_id: user_id.into(),
            cache: HashMap::new(),
        }
    }

    /// Stored values of the requested properties that exist. Ignored
    /// properties are skipped; when nothing else was asked for the store
    /// is not consulted.
    pub async fn prop_find(&mut self, path: &str, requested: &[String]) -> AppResult<Vec<(String, String)>> {
        let wanted: Vec<&String> = requested.iter().filter(|name| !is_ignored(name)).collect();
        if wanted.is_empty() {
            return Ok(Vec::new());
        }

        let stored = self.load(path).await?;
        Ok(wanted
            .into_iter()
            .filter_map(|name| stored.get(name).map(|value| (name.clone(), value.clone())))
            .collect())
    }

    /// Every stored property of a path, ordered by name.
    pub async fn all_properties(&mut self, path: &str) -> AppResult<Vec<(String, String)>> {
        let mut all: Vec<(String, String)> = self
            .load(path)
            .await?
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        all.sort();
        Ok(all)
    }

    /// Apply changes atomically: `None` removes, `Some` inserts or updates.
    pub async fn prop_patch(&mut self, path: &str, changes: &[PropertyChange]) -> AppResult<()> {
        if changes.is_empty() {
            return Ok(());
        }
        self.repo.apply_changes(&self.user_id, path, changes).await?;
        self.cache.remove(path);
        debug!(user_id = %self.user_id, path = %path, count = changes.len(), "Properties patched");
        Ok(())
    }

    /// Drop every property of a path.
    pub async fn delete(&mut self, path: &str) -> AppResult<()> {
        let removed = self.repo.delete_for_path(&self.user_id, path).await?;
        self.cache.remove(path);
        debug!(user_id = %self.user_id, path = %path, removed, "Properties deleted");
        Ok(())
    }

    /// Re-key the properties of `source` to `destination`.
    pub async fn move_path(&mut self, source: &str, destination: &str) -> AppResult<()> {
        let moved = self.repo.move_path(&self.user_id, source, destination).await?;
        self.cache.remove(source);
        self.cache.remove(destination);
        debug!(
            user_id = %self.user_id,
            source = %source,
            destination = %destination,
            moved,
            "Properties moved"
        );
        Ok(())
    }

    async fn load(&mut self, path: &str) -> AppResult<&HashMap<String, String>> {
        if !self.cache.contains_key(path) {
            let rows = self.repo.find_for_path(&self.user_id, path).await?;
            let properties = rows.into_iter().map(|p| (p.name, p.value)).collect();
            self.cache.insert(path.to_string(), properties);
        }
        Ok(self.cache.entry(path.to_string()).or_default())
    }
}
