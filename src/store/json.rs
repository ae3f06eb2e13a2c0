use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path as FsPath, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::StoreError;
use crate::store::{RouteStore, SavedModel, SavedRoute, StoreResult};

const LIBRARY_FILE: &str = "library.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct Library {
    #[serde(default)]
    routes: Vec<SavedRoute>,
    #[serde(default)]
    models: Vec<SavedModel>,
}

/// Route library kept in a single JSON file
pub struct JsonFileStore {
    file: PathBuf,
    /// Serialises read-modify-write cycles
    lock: Mutex<()>,
}

impl JsonFileStore {
    /// Store the library under `dir`
    pub fn new(dir: impl AsRef<FsPath>) -> Self {
        Self {
            file: dir.as_ref().join(LIBRARY_FILE),
            lock: Mutex::new(()),
        }
    }

    /// Store the library in the user data directory
    pub fn default_location() -> Option<Self> {
        dirs::data_dir().map(|p| Self::new(p.join("route-sim")))
    }

    pub fn file(&self) -> &FsPath {
        &self.file
    }

    async fn read(&self) -> StoreResult<Library> {
        match tokio::fs::read(&self.file).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Library::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, library: &Library) -> StoreResult<()> {
        if let Some(parent) = self.file.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec_pretty(library)?;
        // Write then rename so a crash never leaves a half-written library
        let tmp = self.file.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.file).await?;
        Ok(())
    }
}

#[async_trait]
impl RouteStore for JsonFileStore {
    async fn save_route(&self, route: SavedRoute) -> StoreResult<()> {
        let _guard = self.lock.lock().await;
        let mut library = self.read().await?;

        let name = route.name();
        let before = library.routes.len();
        library.routes.retain(|r| r.name() != name);
        if library.routes.len() != before {
            debug!("Replacing saved route {}", name);
        }
        library.routes.push(route);

        self.write(&library).await?;
        info!("Saved route {}", name);
        Ok(())
    }

    async fn load_route(&self, name: &str) -> StoreResult<SavedRoute> {
        let library = self.read().await?;
        library
            .routes
            .into_iter()
            .find(|r| r.name() == name)
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    async fn list_routes(&self) -> StoreResult<Vec<SavedRoute>> {
        Ok(self.read().await?.routes)
    }

    async fn delete_route(&self, name: &str) -> StoreResult<bool> {
        let _guard = self.lock.lock().await;
        let mut library = self.read().await?;

        let before = library.routes.len();
        library.routes.retain(|r| r.name() != name);
        let removed = library.routes.len() != before;
        if removed {
            self.write(&library).await?;
        }
        Ok(removed)
    }

    async fn save_model(&self, model: SavedModel) -> StoreResult<()> {
        let _guard = self.lock.lock().await;
        let mut library = self.read().await?;

        library.models.retain(|m| m.url != model.url);
        library.models.push(model);
        self.write(&library).await
    }

    async fn list_models(&self) -> StoreResult<Vec<SavedModel>> {
        Ok(self.read().await?.models)
    }
}
