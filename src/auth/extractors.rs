use std::convert::Infallible;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

/// Token taken from the `Authorization` header, if any.
///
/// Absence is not rejected here: the service decides what a missing token
/// means. A header without the `Bearer` scheme, or one that is not ASCII, is
/// passed through and fails verification as an invalid token.
pub struct BearerToken(pub Option<String>);

impl BearerToken {
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .map(|h| String::from_utf8_lossy(h.as_bytes()).into_owned())
            .map(|auth| {
                auth.strip_prefix("Bearer ")
                    .or_else(|| auth.strip_prefix("bearer "))
                    .unwrap_or(&auth)
                    .trim()
                    .to_string()
            })
            .filter(|t| !t.is_empty());

        Ok(BearerToken(token))
    }
}
