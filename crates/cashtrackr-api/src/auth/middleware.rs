// Authentication extractor
// Decision: Bearer session tokens in the Authorization header only
// Decision: A valid token whose user no longer exists still passes; downstream stages decide
//
// The first extractor that authenticates a request stores the result in the
// request extensions, so later guard stages reuse it instead of reloading the user.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderMap},
};
use cashtrackr_storage::{StorageBackend, UserRepository};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use super::jwt::JwtService;
use crate::config::JwtConfig;
use crate::error::{ApiError, INTERNAL_ERROR_MESSAGE};

pub const MISSING_TOKEN_MESSAGE: &str = "No Autorizado";
pub const INVALID_TOKEN_MESSAGE: &str = "Token no valido";

/// The authenticated user, projected to public fields
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CurrentUser {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// Result of the authentication stage
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// None when the token was valid but its user is gone
    pub user: Option<CurrentUser>,
}

impl AuthUser {
    /// The user, or 401 when the token pointed to no one
    pub fn require(&self) -> Result<&CurrentUser, ApiError> {
        self.user
            .as_ref()
            .ok_or_else(|| ApiError::unauthorized(MISSING_TOKEN_MESSAGE))
    }
}

/// Auth state shared across routes
#[derive(Clone)]
pub struct AuthState {
    pub jwt_service: Arc<JwtService>,
    pub db: Arc<StorageBackend>,
}

impl AuthState {
    pub fn new(config: JwtConfig, db: Arc<StorageBackend>) -> Self {
        Self {
            jwt_service: Arc::new(JwtService::new(config)),
            db,
        }
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(auth_user) = parts.extensions.get::<AuthUser>() {
            return Ok(auth_user.clone());
        }

        let auth_state = AuthState::from_ref(state);
        let auth_user =
            authenticate(&parts.headers, &auth_state.jwt_service, auth_state.db.as_ref()).await?;
        parts.extensions.insert(auth_user.clone());
        Ok(auth_user)
    }
}

/// Pull the token out of `Authorization: Bearer <token>`
fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| ApiError::unauthorized(MISSING_TOKEN_MESSAGE))?;

    let value = value
        .to_str()
        .map_err(|_| ApiError::unauthorized(INVALID_TOKEN_MESSAGE))?;

    match value.split_once(' ') {
        Some(("Bearer", token)) if !token.trim().is_empty() => Ok(token.trim()),
        _ => Err(ApiError::unauthorized(INVALID_TOKEN_MESSAGE)),
    }
}

/// Authentication stage: header, signature and expiry, then the user lookup
pub async fn authenticate(
    headers: &HeaderMap,
    jwt_service: &JwtService,
    users: &dyn UserRepository,
) -> Result<AuthUser, ApiError> {
    let token = bearer_token(headers)?;

    let claims = jwt_service.validate_session_token(token).map_err(|e| {
        tracing::debug!("Session token rejected: {:#}", e);
        ApiError::unauthorized(INVALID_TOKEN_MESSAGE)
    })?;

    let user = users
        .get_user(claims.id)
        .await
        .map_err(|e| ApiError::from_failure("Failed to load session user", e, INTERNAL_ERROR_MESSAGE))?
        .map(|row| CurrentUser {
            id: row.id,
            name: row.name,
            email: row.email,
        });

    if user.is_none() {
        tracing::debug!(user_id = claims.id, "Session token refers to a missing user");
    }

    Ok(AuthUser { user })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use cashtrackr_storage::{password::hash_password, CreateUserRow, InMemoryDatabase};
    use std::time::Duration;

    fn jwt() -> JwtService {
        JwtService::new(JwtConfig {
            secret: "middleware-test-secret".to_string(),
            lifetime: Duration::from_secs(3600),
        })
    }

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    fn unauthorized_message(result: Result<AuthUser, ApiError>) -> String {
        match result {
            Err(ApiError::Unauthorized(message)) => message,
            other => panic!("expected 401, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_header() {
        let db = InMemoryDatabase::new();
        let result = authenticate(&HeaderMap::new(), &jwt(), &db).await;
        assert_eq!(unauthorized_message(result), MISSING_TOKEN_MESSAGE);
    }

    #[tokio::test]
    async fn test_malformed_header() {
        let db = InMemoryDatabase::new();
        for value in ["Bearer", "Bearer ", "Basic abc", "token-only"] {
            let result = authenticate(&headers(value), &jwt(), &db).await;
            assert_eq!(unauthorized_message(result), INVALID_TOKEN_MESSAGE, "{}", value);
        }
    }

    #[tokio::test]
    async fn test_bad_signature_is_401() {
        let db = InMemoryDatabase::new();
        let result = authenticate(&headers("Bearer abc.def.ghi"), &jwt(), &db).await;
        assert_eq!(unauthorized_message(result), INVALID_TOKEN_MESSAGE);
    }

    #[tokio::test]
    async fn test_valid_token_loads_user() {
        let db = InMemoryDatabase::new();
        let row = db
            .create_user(CreateUserRow {
                name: "Juan".to_string(),
                email: "juan@example.com".to_string(),
                password: hash_password("12345678").unwrap(),
                token: None,
            })
            .await
            .unwrap();

        let service = jwt();
        let token = service.generate_session_token(row.id).unwrap();
        let auth = authenticate(&headers(&format!("Bearer {}", token)), &service, &db)
            .await
            .unwrap();

        let user = auth.require().unwrap();
        assert_eq!(user.id, row.id);
        assert_eq!(user.email, "juan@example.com");
    }

    #[tokio::test]
    async fn test_valid_token_for_missing_user() {
        let db = InMemoryDatabase::new();
        let service = jwt();
        let token = service.generate_session_token(999).unwrap();

        let auth = authenticate(&headers(&format!("Bearer {}", token)), &service, &db)
            .await
            .unwrap();
        assert!(auth.user.is_none());
        assert!(auth.require().is_err());
    }
}
