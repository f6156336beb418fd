use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use super::create_user::CreateUserRequest;
use super::ApiError;
use super::ApiSuccess;
use super::SignInResponseData;
use crate::domain::user::ports::AuthServicePort;
use crate::inbound::http::router::AppState;

pub async fn register<S: AuthServicePort>(
    State(state): State<AppState<S>>,
    Json(body): Json<CreateUserRequest>,
) -> Result<ApiSuccess<SignInResponseData>, ApiError> {
    state
        .auth_service
        .register(body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|ref result| ApiSuccess::new(StatusCode::CREATED, result.into()))
}
