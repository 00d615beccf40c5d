//! Profile manager.
//!
//! A profile is the `users/{uid}` document: display name, email, avatar URL
//! and creation time. Reading a profile never writes; callers that want a
//! profile to exist use [`ProfileManager::get_or_create`].
//!
//! Avatar changes are two writes in sequence: the image upload, then the
//! document update. If the second fails the uploaded object stays behind.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use thiserror::Error;

use crate::models::{image_content_type, AuthUser, Profile, ProfileDocument, DEFAULT_NAME};
use crate::remote::{paths, AuthService, BlobStore, DocumentStore, RemoteError};
use crate::validate::{RegistrationForm, ValidationError};

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("Failed to load profile data: {0}")]
    Load(#[source] RemoteError),

    #[error("Failed to create profile: {0}")]
    Create(#[source] RemoteError),

    #[error("{}", avatar_message(.0))]
    Avatar(#[source] RemoteError),

    #[error("Failed to update profile: {0}")]
    Update(#[source] RemoteError),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The backend's message, unchanged.
    #[error("{0}")]
    Registration(RemoteError),
}

/// User-facing text for a failed avatar change.
pub fn avatar_message(err: &RemoteError) -> String {
    match err.code() {
        Some("storage/unauthorized") => "You don't have permission to upload images".to_string(),
        Some("storage/canceled") => "Upload was canceled".to_string(),
        Some("storage/quota-exceeded") => "Storage quota exceeded".to_string(),
        Some(_) => format!("Error: {}", err),
        None => "Failed to update profile image".to_string(),
    }
}

/// Appends a `t` query parameter so clients refetch a replaced image.
fn with_cache_buster(url: &str, millis: i64) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{}{}t={}", url, separator, millis)
}

pub struct ProfileManager<A, D, B> {
    auth: Arc<A>,
    documents: Arc<D>,
    blobs: Arc<B>,
}

impl<A, D, B> ProfileManager<A, D, B>
where
    A: AuthService,
    D: DocumentStore,
    B: BlobStore,
{
    pub fn new(auth: Arc<A>, documents: Arc<D>, blobs: Arc<B>) -> Self {
        Self {
            auth,
            documents,
            blobs,
        }
    }

    /// Email of `uid` according to the auth service, when it is the
    /// signed-in account.
    fn auth_email(&self, uid: &str) -> Option<String> {
        self.auth
            .current_user()
            .filter(|u| u.uid == uid)
            .and_then(|u| u.email)
    }

    /// Reads the profile of `user_id`. Missing fields take their defaults.
    pub async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, ProfileError> {
        let Some(data) = self
            .documents
            .get(&paths::profile(user_id))
            .await
            .map_err(ProfileError::Load)?
        else {
            return Ok(None);
        };

        let doc: ProfileDocument = serde_json::from_value(data)
            .map_err(|e| ProfileError::Load(RemoteError::Decode(e.to_string())))?;
        Ok(Some(Profile::from_document(user_id, self.auth_email(user_id), doc)))
    }

    /// Writes the default profile of `user`, named after its display name.
    pub async fn create_default_profile(&self, user: &AuthUser) -> Result<Profile, ProfileError> {
        let name = user
            .display_name
            .clone()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| DEFAULT_NAME.to_string());
        let doc = ProfileDocument::initial(user, name);

        let data = serde_json::to_value(&doc)
            .map_err(|e| ProfileError::Create(RemoteError::Decode(e.to_string())))?;
        self.documents
            .set(&paths::profile(&user.uid), data)
            .await
            .map_err(ProfileError::Create)?;

        tracing::info!("Created default profile for {}", user.uid);
        Ok(Profile::from_document(&user.uid, user.email.clone(), doc))
    }

    /// The stored profile, creating the default one first if there is none.
    pub async fn get_or_create(&self, user: &AuthUser) -> Result<Profile, ProfileError> {
        match self.get_profile(&user.uid).await? {
            Some(profile) => Ok(profile),
            None => self.create_default_profile(user).await,
        }
    }

    /// Uploads a new avatar and points the profile at it. Returns the
    /// stored URL.
    pub async fn update_avatar(
        &self,
        user_id: &str,
        bytes: Vec<u8>,
        extension: &str,
    ) -> Result<String, ProfileError> {
        let millis = Utc::now().timestamp_millis();
        let path = paths::avatar(user_id, millis, extension);
        tracing::debug!("Uploading avatar to {}", path);

        self.blobs
            .upload(&path, bytes, image_content_type(extension))
            .await
            .map_err(ProfileError::Avatar)?;
        let url = self
            .blobs
            .download_url(&path)
            .await
            .map_err(ProfileError::Avatar)?;
        let url = with_cache_buster(&url, Utc::now().timestamp_millis());

        self.documents
            .update(&paths::profile(user_id), json!({ "profileImage": url }))
            .await
            .map_err(ProfileError::Avatar)?;
        Ok(url)
    }

    /// Saves the display name, then the password when one is given.
    pub async fn update_profile(
        &self,
        user_id: &str,
        name: &str,
        password: Option<&str>,
    ) -> Result<(), ProfileError> {
        self.documents
            .update(&paths::profile(user_id), json!({ "name": name }))
            .await
            .map_err(ProfileError::Update)?;

        if let Some(password) = password.filter(|p| !p.is_empty()) {
            self.auth
                .update_password(password)
                .await
                .map_err(ProfileError::Update)?;
        }
        Ok(())
    }

    /// Creates an account and its initial profile document. The new
    /// account is not recorded as a signed-in session.
    pub async fn register(&self, form: &RegistrationForm) -> Result<AuthUser, ProfileError> {
        form.validate()?;

        let user = self
            .auth
            .sign_up(&form.email, &form.password)
            .await
            .map_err(ProfileError::Registration)?;

        let doc = ProfileDocument::initial(&user, DEFAULT_NAME);
        let data = serde_json::to_value(&doc)
            .map_err(|e| ProfileError::Registration(RemoteError::Decode(e.to_string())))?;
        self.documents
            .set(&paths::profile(&user.uid), data)
            .await
            .map_err(ProfileError::Registration)?;

        tracing::info!("Registered {}", user.uid);
        Ok(user)
    }
}

/// State of the profile screen. Visible fields change only after every
/// remote write behind them has succeeded.
pub struct ProfileView<'a, A, D, B> {
    manager: &'a ProfileManager<A, D, B>,
    profile: Profile,
}

impl<'a, A, D, B> ProfileView<'a, A, D, B>
where
    A: AuthService,
    D: DocumentStore,
    B: BlobStore,
{
    pub async fn load(
        manager: &'a ProfileManager<A, D, B>,
        user: &AuthUser,
    ) -> Result<ProfileView<'a, A, D, B>, ProfileError> {
        let profile = manager.get_or_create(user).await?;
        Ok(Self { manager, profile })
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub async fn change_avatar(
        &mut self,
        bytes: Vec<u8>,
        extension: &str,
    ) -> Result<&str, ProfileError> {
        let url = self
            .manager
            .update_avatar(&self.profile.uid, bytes, extension)
            .await?;
        self.profile.profile_image = url;
        Ok(&self.profile.profile_image)
    }

    pub async fn save_changes(
        &mut self,
        name: &str,
        password: Option<&str>,
    ) -> Result<(), ProfileError> {
        self.manager
            .update_profile(&self.profile.uid, name, password)
            .await?;
        self.profile.name = name.to_string();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PLACEHOLDER_AVATAR;
    use crate::remote::{FailOp, MemoryBackend};

    type Manager = ProfileManager<MemoryBackend, MemoryBackend, MemoryBackend>;

    fn manager() -> (Arc<MemoryBackend>, Manager) {
        let backend = Arc::new(MemoryBackend::new());
        let manager = ProfileManager::new(backend.clone(), backend.clone(), backend.clone());
        (backend, manager)
    }

    fn storage_error(code: &str) -> RemoteError {
        RemoteError::Storage {
            code: code.to_string(),
            message: format!("Firebase Storage: ({})", code),
        }
    }

    #[tokio::test]
    async fn test_get_profile_missing() {
        let (_, manager) = manager();
        assert!(manager.get_profile("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_or_create_persists_one_default() {
        let (backend, manager) = manager();
        let user = backend.signed_in_as("cook@example.com", "secret1");

        let first = manager.get_or_create(&user).await.unwrap();
        assert_eq!(first.name, "User");
        assert_eq!(first.profile_image, PLACEHOLDER_AVATAR);
        assert_eq!(first.email.as_deref(), Some("cook@example.com"));
        assert_eq!(backend.document_writes(), 1);

        let second = manager.get_or_create(&user).await.unwrap();
        assert_eq!(second, first);
        assert_eq!(backend.document_writes(), 1);
    }

    #[tokio::test]
    async fn test_default_profile_uses_display_name() {
        let (_, manager) = manager();
        let user = AuthUser::new("u1", Some("a@b.co".to_string())).with_display_name("Ada");
        let profile = manager.create_default_profile(&user).await.unwrap();
        assert_eq!(profile.name, "Ada");
    }

    #[tokio::test]
    async fn test_get_profile_fills_defaults() {
        let (backend, manager) = manager();
        DocumentStore::set(backend.as_ref(), "users/u1", json!({"name": ""}))
            .await
            .unwrap();

        let profile = manager.get_profile("u1").await.unwrap().unwrap();
        assert_eq!(profile.name, DEFAULT_NAME);
        assert_eq!(profile.profile_image, PLACEHOLDER_AVATAR);
    }

    #[tokio::test]
    async fn test_update_avatar_uploads_then_updates_document() {
        let (backend, manager) = manager();
        let user = backend.signed_in_as("cook@example.com", "secret1");
        manager.get_or_create(&user).await.unwrap();

        let url = manager
            .update_avatar(&user.uid, vec![1, 2, 3], "png")
            .await
            .unwrap();

        let blob_paths = backend.blob_paths();
        assert_eq!(blob_paths.len(), 1);
        let path = &blob_paths[0];
        assert!(path.starts_with(&format!("profileImages/{}/profile-", user.uid)));
        assert!(path.ends_with(".png"));
        assert_eq!(backend.blob(path).unwrap().1, "image/png");

        assert!(url.starts_with(&format!("memory://{}?t=", path)));
        let stored = backend.document(&paths::profile(&user.uid)).unwrap();
        assert_eq!(stored["profileImage"], json!(url));
    }

    #[test]
    fn test_cache_buster_separator() {
        assert_eq!(with_cache_buster("https://x/a.jpg", 5), "https://x/a.jpg?t=5");
        assert_eq!(
            with_cache_buster("https://x/a.jpg?alt=media&token=k", 5),
            "https://x/a.jpg?alt=media&token=k&t=5"
        );
    }

    #[test]
    fn test_avatar_messages() {
        assert_eq!(
            avatar_message(&storage_error("storage/unauthorized")),
            "You don't have permission to upload images"
        );
        assert_eq!(
            avatar_message(&storage_error("storage/canceled")),
            "Upload was canceled"
        );
        assert_eq!(
            avatar_message(&storage_error("storage/quota-exceeded")),
            "Storage quota exceeded"
        );
        assert_eq!(
            avatar_message(&storage_error("storage/unknown")),
            "Error: Firebase Storage: (storage/unknown)"
        );
        assert_eq!(
            avatar_message(&RemoteError::Http("offline".into())),
            "Failed to update profile image"
        );
    }

    #[tokio::test]
    async fn test_failed_document_update_keeps_visible_avatar() {
        let (backend, manager) = manager();
        let user = backend.signed_in_as("cook@example.com", "secret1");
        let mut view = ProfileView::load(&manager, &user).await.unwrap();
        let before = view.profile().profile_image.clone();

        backend.fail(FailOp::DocumentWrite, RemoteError::Backend("unavailable".into()));
        let err = view.change_avatar(vec![9], "jpg").await.unwrap_err();

        assert_eq!(err.to_string(), "Failed to update profile image");
        assert_eq!(view.profile().profile_image, before);
        // The uploaded object is not cleaned up.
        assert_eq!(backend.blob_paths().len(), 1);
    }

    #[tokio::test]
    async fn test_view_change_avatar_success() {
        let (backend, manager) = manager();
        let user = backend.signed_in_as("cook@example.com", "secret1");
        let mut view = ProfileView::load(&manager, &user).await.unwrap();

        let url = view.change_avatar(vec![9], "jpg").await.unwrap().to_string();
        assert_eq!(view.profile().profile_image, url);
    }

    #[tokio::test]
    async fn test_upload_denied_message() {
        let (backend, manager) = manager();
        let user = backend.signed_in_as("cook@example.com", "secret1");
        manager.get_or_create(&user).await.unwrap();
        backend.fail(FailOp::Upload, storage_error("storage/unauthorized"));

        let err = manager
            .update_avatar(&user.uid, vec![1], "jpg")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "You don't have permission to upload images");
        assert!(backend.blob_paths().is_empty());
    }

    #[tokio::test]
    async fn test_save_changes_updates_name_and_password() {
        let (backend, manager) = manager();
        let user = backend.signed_in_as("cook@example.com", "secret1");
        let mut view = ProfileView::load(&manager, &user).await.unwrap();

        view.save_changes("Ada", Some("newsecret")).await.unwrap();
        assert_eq!(view.profile().name, "Ada");
        assert_eq!(
            backend.document(&paths::profile(&user.uid)).unwrap()["name"],
            "Ada"
        );

        backend.sign_out().await.unwrap();
        assert!(backend.sign_in("cook@example.com", "newsecret").await.is_ok());
    }

    #[tokio::test]
    async fn test_save_changes_skips_empty_password() {
        let (backend, manager) = manager();
        let user = backend.signed_in_as("cook@example.com", "secret1");
        let mut view = ProfileView::load(&manager, &user).await.unwrap();
        backend.fail(FailOp::UpdatePassword, RemoteError::Backend("unexpected".into()));

        view.save_changes("Ada", Some("")).await.unwrap();
        assert_eq!(view.profile().name, "Ada");
    }

    #[tokio::test]
    async fn test_failed_password_change_reports_combined_error() {
        let (backend, manager) = manager();
        let user = backend.signed_in_as("cook@example.com", "secret1");
        let mut view = ProfileView::load(&manager, &user).await.unwrap();

        let err = view.save_changes("Ada", Some("123")).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to update profile: Firebase: Password should be at least 6 characters (auth/weak-password)."
        );
        assert_ne!(view.profile().name, "Ada");
    }

    #[tokio::test]
    async fn test_register_writes_initial_profile() {
        let (backend, manager) = manager();
        let form = RegistrationForm::new("new@example.com", "secret1", "secret1");

        let user = manager.register(&form).await.unwrap();
        let stored = backend.document(&paths::profile(&user.uid)).unwrap();
        assert_eq!(stored["name"], "User");
        assert_eq!(stored["email"], "new@example.com");
        assert_eq!(stored["profileImage"], PLACEHOLDER_AVATAR);
        assert!(stored.get("createdAt").is_some());
    }

    #[tokio::test]
    async fn test_register_validates_before_sign_up() {
        let (backend, manager) = manager();
        let form = RegistrationForm::new("new@example.com", "secret1", "secret2");

        let err = manager.register(&form).await.unwrap_err();
        assert_eq!(err.to_string(), "Passwords do not match.");
        assert!(backend.current_user().is_none());
        assert_eq!(backend.document_writes(), 0);
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let (backend, manager) = manager();
        backend.add_account("new@example.com", "secret1");
        let form = RegistrationForm::new("new@example.com", "secret1", "secret1");

        let err = manager.register(&form).await.unwrap_err();
        assert_eq!(err.to_string(), "Firebase: Error (auth/email-already-in-use).");
    }
}
