use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;

use super::ApiError;
use super::ApiSuccess;
use super::SignInResponseData;
use crate::domain::user::ports::AuthServicePort;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

/// Echo the authenticated user with a freshly issued short-lived token.
pub async fn check_token<S: AuthServicePort>(
    State(state): State<AppState<S>>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
) -> Result<ApiSuccess<SignInResponseData>, ApiError> {
    state
        .auth_service
        .reissue_token(user)
        .await
        .map_err(ApiError::from)
        .map(|ref result| ApiSuccess::new(StatusCode::OK, result.into()))
}
