//! Custom middlewares

use axum::{
	body::Body,
	extract::State,
	http::{Request, header, response::Response},
	middleware::Next,
};

use cotype_types::extract::Auth;

use crate::prelude::*;

/// Resolves the bearer token of the request to a principal and stores it as
/// [`Auth`] in the request extensions. Requests without a valid token are
/// rejected with `Error::Unauthorized`.
pub async fn require_auth(
	State(app): State<App>,
	mut req: Request<Body>,
	next: Next,
) -> CtResult<Response<Body>> {
	let auth_header = req
		.headers()
		.get(header::AUTHORIZATION)
		.and_then(|h| h.to_str().ok())
		.ok_or(Error::Unauthorized)?;

	let token = auth_header.strip_prefix("Bearer ").map(str::trim).ok_or(Error::Unauthorized)?;
	if token.is_empty() {
		return Err(Error::Unauthorized);
	}

	let principal = app.principal_resolver.resolve(token).await?;
	debug!(principal = %principal.id, "Authenticated request");
	req.extensions_mut().insert(Auth(principal));

	Ok(next.run(req).await)
}

// vim: ts=4
