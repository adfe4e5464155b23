use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};

use crate::auth::Session;
use crate::models::User;
use crate::state::AppState;

/// The logged-in account behind the request. Anonymous callers are sent to
/// the login page with `next` pointing back at the requested path.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user: User,
    pub session: Session,
}

pub fn login_redirect(path: &str) -> Redirect {
    Redirect::to(&format!("/login?next={}", path))
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        let path = parts.uri.path().to_string();
        let Some(user_id) = session.data().user_id else {
            return Err(login_redirect(&path).into_response());
        };

        match state.users.find_by_id(user_id).await {
            Ok(Some(user)) if user.is_active => Ok(Self { user, session }),
            Ok(_) => {
                tracing::warn!(%user_id, "session refers to a missing or inactive user");
                session.logout();
                Err(login_redirect(&path).into_response())
            }
            Err(e) => Err(e.into_response()),
        }
    }
}
