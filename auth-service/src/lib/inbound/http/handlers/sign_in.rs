use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::SignInResponseData;
use crate::domain::user::models::Credentials;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::ports::AuthServicePort;
use crate::inbound::http::router::AppState;
use crate::user::errors::AuthError;

pub async fn sign_in<S: AuthServicePort>(
    State(state): State<AppState<S>>,
    Json(body): Json<SignInRequestBody>,
) -> Result<ApiSuccess<SignInResponseData>, ApiError> {
    // A malformed email cannot belong to anyone; answer like any other miss
    let email = EmailAddress::new(body.email)
        .map_err(|_| ApiError::from(AuthError::InvalidCredentials))?;

    state
        .auth_service
        .sign_in(Credentials {
            email,
            password: body.password,
        })
        .await
        .map_err(ApiError::from)
        .map(|ref result| ApiSuccess::new(StatusCode::OK, result.into()))
}

#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct SignInRequestBody {
    email: String,
    password: String,
}
