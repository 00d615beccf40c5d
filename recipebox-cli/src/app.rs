//! Wiring between configuration and the core services.

use std::sync::Arc;

use recipebox_core::{
    AuthService, AuthUser, CatalogClient, FavoritesSynchronizer, FileStore, ProfileManager,
    RecipeRecordManager, SessionGate,
};
use recipebox_core::remote::Firebase;

use crate::config::Config;

pub type Backend = Firebase<FileStore>;

pub fn catalog_client(config: &Config) -> CatalogClient {
    CatalogClient::new(
        config.catalog.base_url(),
        config.catalog.api_key.clone().unwrap_or_default(),
    )
}

/// Everything a command may need, built once per invocation.
pub struct App {
    store: FileStore,
    backend: Arc<Backend>,
    catalog: CatalogClient,
}

impl App {
    pub fn new(config: &Config) -> Result<Self, Box<dyn std::error::Error>> {
        let store = FileStore::new(&config.data_dir.value);
        let backend = Arc::new(Firebase::new(config.firebase_config()?, store.clone()));

        Ok(Self {
            store,
            backend,
            catalog: catalog_client(config),
        })
    }

    pub fn catalog(&self) -> &CatalogClient {
        &self.catalog
    }

    pub fn session(&self) -> SessionGate<Backend, FileStore> {
        SessionGate::new(self.backend.clone(), self.store.clone())
    }

    pub fn favorites(&self) -> FavoritesSynchronizer<Backend, Backend> {
        FavoritesSynchronizer::new(self.backend.clone(), self.backend.clone())
    }

    pub fn profiles(&self) -> ProfileManager<Backend, Backend, Backend> {
        ProfileManager::new(
            self.backend.clone(),
            self.backend.clone(),
            self.backend.clone(),
        )
    }

    pub fn recipes(&self) -> RecipeRecordManager<Backend, Backend, Backend> {
        RecipeRecordManager::new(
            self.backend.clone(),
            self.backend.clone(),
            self.backend.clone(),
        )
    }

    /// The signed-in account, or an error telling the user to log in.
    pub fn require_user(&self) -> Result<AuthUser, AppError> {
        self.backend.current_user().ok_or(AppError::NotSignedIn)
    }
}

#[derive(Debug)]
pub enum AppError {
    NotSignedIn,
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::NotSignedIn => write!(f, "Not signed in. Run 'recipes auth login' first."),
        }
    }
}

impl std::error::Error for AppError {}
