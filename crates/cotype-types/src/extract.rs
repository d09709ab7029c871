//! Axum extractors for Cotype-specific types.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::acl::Principal;
use crate::error::Error;

// Auth //
//******//
/// Principal of the request, inserted into the request extensions by the
/// auth middleware.
#[derive(Clone, Debug)]
pub struct Auth(pub Principal);

impl<S> FromRequestParts<S> for Auth
where
	S: Send + Sync,
{
	type Rejection = Error;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		if let Some(auth) = parts.extensions.get::<Auth>().cloned() {
			Ok(auth)
		} else {
			Err(Error::Unauthorized)
		}
	}
}

// vim: ts=4
