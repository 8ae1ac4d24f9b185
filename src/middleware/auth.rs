use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::RequestPartsExt;
use axum_extra::TypedHeader;
use headers::Authorization;
use headers::authorization::Bearer;

use crate::{QuillError, router::QuillState};

/// Extracts the username from a valid `Authorization: Bearer <session>` header.
///
/// A missing or malformed header is `TokenInvalid`; an expired session is
/// `TokenExpired`. Both render as 401.
#[derive(Debug, Clone)]
pub struct RequireSession(pub String);

impl FromRequestParts<QuillState> for RequireSession {
    type Rejection = QuillError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &QuillState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| QuillError::TokenInvalid)?;
        let username = state.users.verify_session(bearer.token())?;
        Ok(Self(username))
    }
}
