// Account HTTP routes
// Decision: All account endpoints live under /api/auth/* and share the auth rate limit
// Decision: Confirmation and reset codes travel only by email; tests read them from the mailer

use axum::{
    body::Bytes,
    extract::{FromRef, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use cashtrackr_storage::{
    password::{hash_password, verify_password},
    CreateUserRow, UpdateUser, UserRepository, UserRow,
};
use std::sync::Arc;

use super::middleware::{AuthState, AuthUser, CurrentUser, INVALID_TOKEN_MESSAGE, MISSING_TOKEN_MESSAGE};
use super::token::generate_unused_token;
use crate::api::common::{ErrorResponse, MessageResponse};
use crate::api::validation::{
    parse_json_object, CheckPasswordInput, CreateAccountInput, EmailInput, FieldCheck,
    LoginInput, NewPasswordInput, TokenInput, UpdatePasswordInput, UpdateProfileInput, Validated,
    ValidatedInput, CONFIRMATION_TOKEN_LENGTH,
};
use crate::email::{EmailRecipient, Mailer};
use crate::error::{ApiError, INTERNAL_ERROR_MESSAGE};

/// Message for failures while creating an account
pub const ACCOUNT_CREATE_FAILED_MESSAGE: &str = "Hubo un Error";
pub const DUPLICATE_EMAIL_MESSAGE: &str = "El usuario cono ese email ya esta registrado";
pub const USER_NOT_FOUND_MESSAGE: &str = "El usuario no encontrado";
pub const UNCONFIRMED_MESSAGE: &str = "La cuenta no ha sido confirmado";
pub const WRONG_PASSWORD_MESSAGE: &str = "Password Incorrecto";
pub const EMAIL_TAKEN_MESSAGE: &str = "Este correo ya está registrado por otro usuario.";

/// State for account routes
#[derive(Clone)]
pub struct AccountState {
    pub auth: AuthState,
    pub mailer: Arc<dyn Mailer>,
}

impl FromRef<AccountState> for AuthState {
    fn from_ref(input: &AccountState) -> Self {
        input.auth.clone()
    }
}

/// Create account routes
pub fn routes(state: AccountState) -> Router {
    Router::new()
        // Public routes
        .route("/api/auth/create-account", post(create_account))
        .route("/api/auth/confirm-account", post(confirm_account))
        .route("/api/auth/login", post(login))
        .route("/api/auth/forgot-password", post(forgot_password))
        .route("/api/auth/validate-token", post(validate_token))
        .route("/api/auth/reset-password/:token", post(reset_password))
        // Protected routes
        .route("/api/auth/user", get(get_user).put(update_user))
        .route("/api/auth/update-password", post(update_password))
        .route("/api/auth/check-password", post(check_password))
        .with_state(state)
}

fn internal_failure(context: &'static str) -> impl FnOnce(anyhow::Error) -> ApiError {
    move |e| ApiError::from_failure(context, e, INTERNAL_ERROR_MESSAGE)
}

/// Load the full row of the authenticated user
async fn load_session_user(state: &AccountState, user: &CurrentUser) -> Result<UserRow, ApiError> {
    state
        .auth
        .db
        .get_user(user.id)
        .await
        .map_err(internal_failure("Failed to load user"))?
        .ok_or_else(|| ApiError::unauthorized(MISSING_TOKEN_MESSAGE))
}

fn check_password_matches(password: &str, user: &UserRow) -> Result<(), ApiError> {
    let valid = verify_password(password, &user.password).map_err(|e| {
        ApiError::from_failure("Password verification error", e, INTERNAL_ERROR_MESSAGE)
    })?;

    if valid {
        Ok(())
    } else {
        Err(ApiError::unauthorized(WRONG_PASSWORD_MESSAGE))
    }
}

/// POST /api/auth/create-account - Register and email a confirmation code
#[utoipa::path(
    post,
    path = "/api/auth/create-account",
    request_body = CreateAccountInput,
    responses(
        (status = 201, description = "Account created, confirmation code sent", body = MessageResponse),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Email already registered", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn create_account(
    State(state): State<AccountState>,
    Validated(input): Validated<CreateAccountInput>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let failed = |context: &'static str| {
        move |e: anyhow::Error| ApiError::from_failure(context, e, ACCOUNT_CREATE_FAILED_MESSAGE)
    };

    let existing = state
        .auth
        .db
        .get_user_by_email(&input.email)
        .await
        .map_err(failed("Database error during registration"))?;
    if existing.is_some() {
        return Err(ApiError::conflict(DUPLICATE_EMAIL_MESSAGE));
    }

    let password = hash_password(&input.password).map_err(failed("Password hashing error"))?;
    let token = generate_unused_token(state.auth.db.as_ref())
        .await
        .map_err(failed("Failed to generate confirmation code"))?;

    let user = state
        .auth
        .db
        .create_user(CreateUserRow {
            name: input.name,
            email: input.email,
            password,
            token: Some(token.clone()),
        })
        .await
        .map_err(failed("User creation error"))?;

    state
        .mailer
        .send_confirmation_email(&EmailRecipient {
            name: user.name.clone(),
            email: user.email.clone(),
            token,
        })
        .await
        .map_err(failed("Failed to send confirmation email"))?;

    tracing::info!(user_id = user.id, "Account created");
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Cuenta Creada Correctamente")),
    ))
}

/// POST /api/auth/confirm-account - Confirm an account with its emailed code
#[utoipa::path(
    post,
    path = "/api/auth/confirm-account",
    request_body = TokenInput,
    responses(
        (status = 200, description = "Account confirmed", body = String),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Unknown code", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn confirm_account(
    State(state): State<AccountState>,
    Validated(input): Validated<TokenInput>,
) -> Result<Json<&'static str>, ApiError> {
    let user = state
        .auth
        .db
        .get_user_by_token(&input.token)
        .await
        .map_err(internal_failure("Failed to look up confirmation token"))?
        .ok_or_else(|| ApiError::unauthorized(INVALID_TOKEN_MESSAGE))?;

    state
        .auth
        .db
        .update_user(
            user.id,
            UpdateUser {
                confirm: Some(true),
                token: Some(None),
                ..Default::default()
            },
        )
        .await
        .map_err(internal_failure("Failed to confirm account"))?;

    tracing::info!(user_id = user.id, "Account confirmed");
    Ok(Json("Cuenta Confirmada Correctamente"))
}

/// POST /api/auth/login - Exchange credentials for a session token
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginInput,
    responses(
        (status = 200, description = "Session token", body = String),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Wrong password", body = ErrorResponse),
        (status = 403, description = "Account not confirmed", body = ErrorResponse),
        (status = 404, description = "Unknown email", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AccountState>,
    Validated(input): Validated<LoginInput>,
) -> Result<Json<String>, ApiError> {
    let user = state
        .auth
        .db
        .get_user_by_email(&input.email)
        .await
        .map_err(internal_failure("Database error during login"))?
        .ok_or_else(|| ApiError::not_found(USER_NOT_FOUND_MESSAGE))?;

    // Unconfirmed accounts are refused whatever the password
    if !user.confirm {
        return Err(ApiError::forbidden(UNCONFIRMED_MESSAGE));
    }

    check_password_matches(&input.password, &user)?;

    let token = state
        .auth
        .jwt_service
        .generate_session_token(user.id)
        .map_err(internal_failure("Failed to issue session token"))?;

    tracing::debug!(user_id = user.id, "Login succeeded");
    Ok(Json(token))
}

/// POST /api/auth/forgot-password - Email a password reset code
#[utoipa::path(
    post,
    path = "/api/auth/forgot-password",
    request_body = EmailInput,
    responses(
        (status = 200, description = "Reset code sent", body = String),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Unknown email", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn forgot_password(
    State(state): State<AccountState>,
    Validated(input): Validated<EmailInput>,
) -> Result<Json<&'static str>, ApiError> {
    let user = state
        .auth
        .db
        .get_user_by_email(&input.email)
        .await
        .map_err(internal_failure("Database error during password reset"))?
        .ok_or_else(|| ApiError::not_found(USER_NOT_FOUND_MESSAGE))?;

    let token = generate_unused_token(state.auth.db.as_ref())
        .await
        .map_err(internal_failure("Failed to generate reset code"))?;
    state
        .auth
        .db
        .update_user(
            user.id,
            UpdateUser {
                token: Some(Some(token.clone())),
                ..Default::default()
            },
        )
        .await
        .map_err(internal_failure("Failed to store reset token"))?;

    state
        .mailer
        .send_password_reset_token(&EmailRecipient {
            name: user.name,
            email: user.email,
            token,
        })
        .await
        .map_err(internal_failure("Failed to send password reset email"))?;

    Ok(Json("Revisa tu email para reestablecer tu password"))
}

/// POST /api/auth/validate-token - Check a reset code without using it
#[utoipa::path(
    post,
    path = "/api/auth/validate-token",
    request_body = TokenInput,
    responses(
        (status = 200, description = "Code is valid", body = String),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Unknown code", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn validate_token(
    State(state): State<AccountState>,
    Validated(input): Validated<TokenInput>,
) -> Result<Json<&'static str>, ApiError> {
    state
        .auth
        .db
        .get_user_by_token(&input.token)
        .await
        .map_err(internal_failure("Failed to look up reset token"))?
        .ok_or_else(|| ApiError::unauthorized(INVALID_TOKEN_MESSAGE))?;

    Ok(Json("Token Valido"))
}

/// POST /api/auth/reset-password/{token} - Set a new password with a reset code
#[utoipa::path(
    post,
    path = "/api/auth/reset-password/{token}",
    params(
        ("token" = String, Path, description = "6-digit reset code")
    ),
    request_body = NewPasswordInput,
    responses(
        (status = 200, description = "Password changed", body = String),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Unknown code", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn reset_password(
    State(state): State<AccountState>,
    Path(token): Path<String>,
    body: Bytes,
) -> Result<Json<&'static str>, ApiError> {
    // Path and body rules are reported together
    let body = parse_json_object(&body)?;
    let mut errors = Vec::new();
    FieldCheck::param("token", &token)
        .bail()
        .exact_length(
            CONFIRMATION_TOKEN_LENGTH,
            crate::api::validation::INVALID_TOKEN_MESSAGE,
        )
        .finish(&mut errors);
    let input = match NewPasswordInput::validate(&body) {
        Ok(input) if errors.is_empty() => input,
        Ok(_) => return Err(ApiError::Validation(errors)),
        Err(body_errors) => {
            errors.extend(body_errors);
            return Err(ApiError::Validation(errors));
        }
    };

    let user = state
        .auth
        .db
        .get_user_by_token(&token)
        .await
        .map_err(internal_failure("Failed to look up reset token"))?
        .ok_or_else(|| ApiError::unauthorized(INVALID_TOKEN_MESSAGE))?;

    let password =
        hash_password(&input.password).map_err(internal_failure("Password hashing error"))?;

    state
        .auth
        .db
        .update_user(
            user.id,
            UpdateUser {
                password: Some(password),
                token: Some(None),
                ..Default::default()
            },
        )
        .await
        .map_err(internal_failure("Failed to reset password"))?;

    tracing::info!(user_id = user.id, "Password reset");
    Ok(Json("El password se ha reestablecido correctamente"))
}

/// GET /api/auth/user - Current user, or null when the token's user is gone
#[utoipa::path(
    get,
    path = "/api/auth/user",
    responses(
        (status = 200, description = "Current user", body = Option<CurrentUser>),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn get_user(auth: AuthUser) -> Json<Option<CurrentUser>> {
    Json(auth.user)
}

/// PUT /api/auth/user - Change name and email
#[utoipa::path(
    put,
    path = "/api/auth/user",
    request_body = UpdateProfileInput,
    responses(
        (status = 200, description = "Profile updated", body = MessageResponse),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 409, description = "Email used by another user", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn update_user(
    State(state): State<AccountState>,
    auth: AuthUser,
    Validated(input): Validated<UpdateProfileInput>,
) -> Result<Json<MessageResponse>, ApiError> {
    let user = auth.require()?;

    let holder = state
        .auth
        .db
        .get_user_by_email(&input.email)
        .await
        .map_err(internal_failure("Database error during profile update"))?;
    if matches!(holder, Some(ref other) if other.id != user.id) {
        return Err(ApiError::conflict(EMAIL_TAKEN_MESSAGE));
    }

    state
        .auth
        .db
        .update_user(
            user.id,
            UpdateUser {
                name: Some(input.name),
                email: Some(input.email),
                ..Default::default()
            },
        )
        .await
        .map_err(internal_failure("Failed to update profile"))?
        .ok_or_else(|| ApiError::unauthorized(MISSING_TOKEN_MESSAGE))?;

    Ok(Json(MessageResponse::new("Usuario actualizado correctamente")))
}

/// POST /api/auth/update-password - Change password after checking the current one
#[utoipa::path(
    post,
    path = "/api/auth/update-password",
    request_body = UpdatePasswordInput,
    responses(
        (status = 200, description = "Password changed", body = String),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Not authenticated or wrong current password", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn update_password(
    State(state): State<AccountState>,
    auth: AuthUser,
    Validated(input): Validated<UpdatePasswordInput>,
) -> Result<Json<&'static str>, ApiError> {
    let user = load_session_user(&state, auth.require()?).await?;
    check_password_matches(&input.current_password, &user)?;

    let password =
        hash_password(&input.password).map_err(internal_failure("Password hashing error"))?;
    state
        .auth
        .db
        .update_user(
            user.id,
            UpdateUser {
                password: Some(password),
                ..Default::default()
            },
        )
        .await
        .map_err(internal_failure("Failed to update password"))?;

    tracing::info!(user_id = user.id, "Password changed");
    Ok(Json("Password Modifico correctamente"))
}

/// POST /api/auth/check-password - Verify the current password
#[utoipa::path(
    post,
    path = "/api/auth/check-password",
    request_body = CheckPasswordInput,
    responses(
        (status = 200, description = "Password matches", body = String),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Not authenticated or wrong password", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn check_password(
    State(state): State<AccountState>,
    auth: AuthUser,
    Validated(input): Validated<CheckPasswordInput>,
) -> Result<Json<&'static str>, ApiError> {
    let user = load_session_user(&state, auth.require()?).await?;
    check_password_matches(&input.password, &user)?;

    Ok(Json("Password Correcto"))
}
