//! User registration and login.

use crate::{
    error::AppError,
    models::user::{LoginRequest, LoginResponse, NewUser, RegisterRequest, User},
    services::credentials::CredentialService,
    store::{RecordStore, StoreError},
};

/// Register a new user.
///
/// # Process
///
/// 1. Validate username, email and password are present
/// 2. Hash the password with bcrypt
/// 3. Insert the user; unique violations become `DuplicateUser`
///
/// # Errors
///
/// - `InvalidRequest`: a field is empty or the email is malformed
/// - `DuplicateUser`: username or email already registered
/// - `Store` / `PasswordHash`: internal failures
pub async fn register(
    store: &dyn RecordStore,
    credentials: &CredentialService,
    request: RegisterRequest,
) -> Result<User, AppError> {
    let username = request.username.trim();
    let email = request.email.trim();

    if username.is_empty() || email.is_empty() || request.password.is_empty() {
        return Err(AppError::InvalidRequest(
            "username, email and password are required".to_string(),
        ));
    }
    if !email.contains('@') {
        return Err(AppError::InvalidRequest("email is invalid".to_string()));
    }

    let password_hash = credentials.hash_password(&request.password)?;

    let user = store
        .create_user(NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash,
        })
        .await
        .map_err(|e| match e {
            StoreError::Duplicate(_) => AppError::DuplicateUser,
            other => AppError::Store(other),
        })?;

    tracing::info!(user_id = %user.id, "user registered");

    Ok(user)
}

/// Check a username/password pair and issue a bearer token.
///
/// Unknown users and wrong passwords produce the same `InvalidCredentials`
/// error so the response does not reveal which usernames exist.
pub async fn login(
    store: &dyn RecordStore,
    credentials: &CredentialService,
    request: LoginRequest,
) -> Result<LoginResponse, AppError> {
    let user = store
        .find_user_by_username(request.username.trim())
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !credentials.verify_password(&request.password, &user.password_hash)? {
        return Err(AppError::InvalidCredentials);
    }

    let token = credentials.issue_token(user.id, &user.username)?;

    Ok(LoginResponse {
        token,
        user_id: user.id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;

    fn creds() -> CredentialService {
        CredentialService::new("test-secret", 24, 4)
    }

    fn register_request(username: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn registered_user_can_log_in() {
        let store = MemoryStore::new();
        let creds = creds();
        let user = register(&store, &creds, register_request("alice", "a@x.io", "pw"))
            .await
            .unwrap();
        assert_ne!(user.password_hash, "pw");

        let response = login(
            &store,
            &creds,
            LoginRequest {
                username: "alice".to_string(),
                password: "pw".to_string(),
            },
        )
        .await
        .unwrap();

        assert_eq!(response.user_id, user.id);
        assert_eq!(creds.verify_token(&response.token).unwrap().sub, user.id);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_look_the_same() {
        let store = MemoryStore::new();
        let creds = creds();
        register(&store, &creds, register_request("alice", "a@x.io", "pw"))
            .await
            .unwrap();

        for (username, password) in [("alice", "nope"), ("nobody", "pw")] {
            let result = login(
                &store,
                &creds,
                LoginRequest {
                    username: username.to_string(),
                    password: password.to_string(),
                },
            )
            .await;
            assert!(matches!(result, Err(AppError::InvalidCredentials)));
        }
    }

    #[tokio::test]
    async fn duplicate_registration_is_rejected() {
        let store = MemoryStore::new();
        let creds = creds();
        register(&store, &creds, register_request("alice", "a@x.io", "pw"))
            .await
            .unwrap();

        let result = register(&store, &creds, register_request("alice", "b@x.io", "pw")).await;
        assert!(matches!(result, Err(AppError::DuplicateUser)));
    }

    #[tokio::test]
    async fn incomplete_registration_is_rejected() {
        let store = MemoryStore::new();
        let creds = creds();

        let missing = register(&store, &creds, register_request("alice", "", "pw")).await;
        assert!(matches!(missing, Err(AppError::InvalidRequest(_))));

        let bad_email = register(&store, &creds, register_request("alice", "nope", "pw")).await;
        assert!(matches!(bad_email, Err(AppError::InvalidRequest(_))));
    }
}
