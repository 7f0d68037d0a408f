use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::error::AppError;

/// Header carrying the authenticated account id.
pub const ACCOUNT_HEADER: &str = "x-account-id";

/// The account that owns every automation touched by the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountOwner(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for AccountOwner
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(ACCOUNT_HEADER)
            .and_then(|header| header.to_str().ok())
            .ok_or_else(|| {
                AppError::Unauthorized("Missing account header".to_string()).into_response()
            })?;

        let owner = Uuid::parse_str(header.trim()).map_err(|_| {
            AppError::Unauthorized("Invalid account header".to_string()).into_response()
        })?;

        Ok(AccountOwner(owner))
    }
}
