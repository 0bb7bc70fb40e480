//! API key lifecycle: generation, listing and deactivation.

use uuid::Uuid;

use crate::{
    error::AppError,
    models::api_key::{ApiKey, DEFAULT_DAILY_LIMIT, GenerateKeyResponse, NewApiKey},
    store::RecordStore,
};

/// Prefix carried by every generated key value.
pub const API_KEY_PREFIX: &str = "api_";

/// Generate a fresh key value.
///
/// # Output
///
/// `api_` followed by 64 hex characters (32 random bytes)
pub fn generate_key_value() -> String {
    let bytes: [u8; 32] = rand::random();
    format!("{API_KEY_PREFIX}{}", hex::encode(bytes))
}

/// Create a new active key for `user_id` with the default daily limit.
///
/// The key value is returned in full; it is also visible later through
/// [`list_keys`], since callers identify themselves with the raw value.
pub async fn generate_key(
    store: &dyn RecordStore,
    user_id: Uuid,
    key_name: &str,
) -> Result<GenerateKeyResponse, AppError> {
    let key_name = key_name.trim();
    if key_name.is_empty() {
        return Err(AppError::InvalidRequest("keyName is required".to_string()));
    }

    let key = store
        .create_api_key(NewApiKey {
            user_id,
            key_name: key_name.to_string(),
            key_value: generate_key_value(),
            daily_limit: DEFAULT_DAILY_LIMIT,
        })
        .await?;

    tracing::info!(user_id = %user_id, key_id = %key.id, "api key generated");

    Ok(GenerateKeyResponse {
        api_key: key.key_value,
        key_name: key.key_name,
    })
}

/// All keys owned by `user_id`, active or not, newest first.
pub async fn list_keys(store: &dyn RecordStore, user_id: Uuid) -> Result<Vec<ApiKey>, AppError> {
    Ok(store.list_api_keys(user_id).await?)
}

/// Deactivate (soft delete) a key owned by `user_id`.
///
/// # Errors
///
/// - `ApiKeyNotFound`: no key with that id, or it belongs to another user
pub async fn deactivate_key(
    store: &dyn RecordStore,
    user_id: Uuid,
    key_id: Uuid,
) -> Result<(), AppError> {
    if !store.deactivate_api_key(key_id, user_id).await? {
        return Err(AppError::ApiKeyNotFound);
    }

    tracing::info!(user_id = %user_id, key_id = %key_id, "api key deactivated");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;

    #[test]
    fn key_value_is_prefixed_hex() {
        let value = generate_key_value();
        let hex_part = value.strip_prefix(API_KEY_PREFIX).unwrap();
        assert_eq!(hex_part.len(), 64);
        assert!(hex_part.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(value, generate_key_value());
    }

    #[tokio::test]
    async fn generated_key_is_listed_for_owner_only() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();

        let generated = generate_key(&store, owner, "laptop").await.unwrap();
        assert_eq!(generated.key_name, "laptop");

        let keys = list_keys(&store, owner).await.unwrap();
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].key_value, generated.api_key);
        assert_eq!(keys[0].daily_limit, DEFAULT_DAILY_LIMIT);

        assert!(list_keys(&store, Uuid::new_v4()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn blank_key_name_is_rejected() {
        let store = MemoryStore::new();
        let result = generate_key(&store, Uuid::new_v4(), "  ").await;
        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn deactivating_someone_elses_key_is_not_found() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        generate_key(&store, owner, "laptop").await.unwrap();
        let key = &list_keys(&store, owner).await.unwrap()[0];

        let result = deactivate_key(&store, Uuid::new_v4(), key.id).await;
        assert!(matches!(result, Err(AppError::ApiKeyNotFound)));

        deactivate_key(&store, owner, key.id).await.unwrap();
        assert!(!list_keys(&store, owner).await.unwrap()[0].is_active);
    }
}
