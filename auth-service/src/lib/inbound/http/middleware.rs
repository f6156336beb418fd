use auth::Authenticator;
use auth::JwtError;
use axum::extract::Request;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;

use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::AuthServicePort;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;
use crate::user::errors::AuthError;

/// Extension type carrying the resolved user into protected handlers
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

/// Result of running the guard over one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    Authorized(User),
    Rejected(Rejection),
}

/// Why the guard refused a request. Every variant maps to 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// No `Authorization: Bearer <token>` header
    MissingToken,
    /// Bad signature, unparsable token, or a subject that is not a user id
    InvalidToken,
    TokenExpired,
    /// Subject does not resolve to a stored user
    UnknownUser,
    InactiveUser,
}

impl Rejection {
    /// Message shown to the client.
    pub fn message(&self) -> &'static str {
        match self {
            Rejection::MissingToken => "Token not found in request",
            Rejection::TokenExpired => "Token expired",
            Rejection::InvalidToken => "Invalid token",
            Rejection::UnknownUser | Rejection::InactiveUser => "User is not authorized",
        }
    }
}

impl From<Rejection> for ApiError {
    fn from(rejection: Rejection) -> Self {
        ApiError::Unauthorized(rejection.message().to_string())
    }
}

/// Middleware that runs the guard and either attaches the user or rejects with 401
pub async fn authenticate<S: AuthServicePort>(
    State(state): State<AppState<S>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let authorization = req.headers().get(AUTHORIZATION).cloned();

    match guard(
        state.auth_service.as_ref(),
        &state.authenticator,
        authorization.as_ref(),
    )
    .await
    {
        GuardOutcome::Authorized(user) => {
            tracing::debug!(user_id = %user.id, "Request authorized");
            req.extensions_mut().insert(AuthenticatedUser(user));
            Ok(next.run(req).await)
        }
        GuardOutcome::Rejected(rejection) => {
            tracing::warn!(
                reason = ?rejection,
                method = %req.method(),
                uri = %req.uri(),
                "Request rejected by auth guard"
            );
            Err(rejection.into())
        }
    }
}

/// Decide whether a request carrying `authorization` may proceed.
///
/// Steps, each with its own failure exit: extract the bearer token, verify
/// it, resolve the subject to a user, require the user to be active.
pub async fn guard<S: AuthServicePort>(
    auth_service: &S,
    authenticator: &Authenticator,
    authorization: Option<&HeaderValue>,
) -> GuardOutcome {
    let Some(token) = authorization.and_then(extract_bearer_token) else {
        return GuardOutcome::Rejected(Rejection::MissingToken);
    };

    let claims = match authenticator.validate_token(token) {
        Ok(claims) => claims,
        Err(JwtError::Expired) => return GuardOutcome::Rejected(Rejection::TokenExpired),
        Err(e) => {
            tracing::debug!(error = %e, "Token verification failed");
            return GuardOutcome::Rejected(Rejection::InvalidToken);
        }
    };

    let Ok(user_id) = UserId::from_string(&claims.sub) else {
        return GuardOutcome::Rejected(Rejection::InvalidToken);
    };

    let user = match auth_service.find_user_by_id(&user_id).await {
        Ok(user) => user,
        Err(AuthError::NotFound(_)) => return GuardOutcome::Rejected(Rejection::UnknownUser),
        Err(e) => {
            tracing::error!(user_id = %user_id, error = %e, "User lookup failed in auth guard");
            return GuardOutcome::Rejected(Rejection::UnknownUser);
        }
    };

    if !user.is_active {
        return GuardOutcome::Rejected(Rejection::InactiveUser);
    }

    GuardOutcome::Authorized(user)
}

/// Token from an `Authorization: Bearer <token>` value; any other shape is `None`.
fn extract_bearer_token(value: &HeaderValue) -> Option<&str> {
    let token = value.to_str().ok()?.strip_prefix("Bearer ")?;

    if token.is_empty() || token.contains(char::is_whitespace) {
        return None;
    }

    Some(token)
}
