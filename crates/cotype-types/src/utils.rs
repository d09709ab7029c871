//! Utility functions

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngExt;
use sha2::{Digest, Sha256};

use crate::prelude::*;

pub const ID_LENGTH: usize = 24;
pub const SAFE: [char; 62] = [
	'0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i',
	'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z', 'A', 'B',
	'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S', 'T', 'U',
	'V', 'W', 'X', 'Y', 'Z',
];

pub fn random_id() -> String {
	let mut rng = rand::rng();
	let mut result = String::with_capacity(ID_LENGTH);

	for _ in 0..ID_LENGTH {
		result.push(SAFE[rng.random_range(0..SAFE.len())]);
	}
	result
}

/// Hash of a session token as it is stored. Tokens themselves are never persisted.
pub fn hash_token(token: &str) -> Box<str> {
	let mut hasher = Sha256::new();
	hasher.update(token.as_bytes());
	URL_SAFE_NO_PAD.encode(hasher.finalize()).into()
}

/// A value counts as missing when it is absent, null, `false`, `0` or an empty string
pub fn is_missing(value: Option<&serde_json::Value>) -> bool {
	match value {
		None | Some(serde_json::Value::Null | serde_json::Value::Bool(false)) => true,
		Some(serde_json::Value::String(s)) => s.is_empty(),
		Some(serde_json::Value::Number(n)) => n.as_f64() == Some(0.0),
		Some(_) => false,
	}
}

/// Collects the labels of the required keys missing from `data`, in the given order.
///
/// `required` lists `(key, label)` pairs; the label is what gets reported.
pub fn missing_fields<'a>(data: &Data, required: &[(&str, &'a str)]) -> Vec<&'a str> {
	required
		.iter()
		.filter(|(key, _)| is_missing(data.get(*key)))
		.map(|(_, label)| *label)
		.collect()
}

/// Joins items as a natural-language list: `a`, `a and b`, `a, b and c`
pub fn join_natural<S: AsRef<str>>(items: &[S]) -> String {
	match items {
		[] => String::new(),
		[single] => single.as_ref().to_string(),
		[init @ .., last] => {
			let head = init.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(", ");
			format!("{} and {}", head, last.as_ref())
		}
	}
}

/// Joins URL segments with exactly one slash between them
pub fn url_join(base: &str, path: &str) -> String {
	if base.is_empty() {
		return path.to_string();
	}
	format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_join_natural() {
		assert_eq!(join_natural::<&str>(&[]), "");
		assert_eq!(join_natural(&["email"]), "email");
		assert_eq!(join_natural(&["email", "role"]), "email and role");
		assert_eq!(join_natural(&["email", "role", "password"]), "email, role and password");
	}

	#[test]
	fn test_missing_fields_keeps_order() {
		let mut data = Data::new();
		data.insert("email".into(), json!(""));
		data.insert("role".into(), json!("1"));
		data.insert("flag".into(), json!(false));

		let missing = missing_fields(
			&data,
			&[("email", "email"), ("role", "role"), ("newPassword", "password"), ("flag", "flag")],
		);
		assert_eq!(missing, vec!["email", "password", "flag"]);
	}

	#[test]
	fn test_random_id() {
		let id = random_id();
		assert_eq!(id.len(), ID_LENGTH);
		assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
		assert_ne!(id, random_id());
	}

	#[test]
	fn test_hash_token_is_stable() {
		assert_eq!(hash_token("secret"), hash_token("secret"));
		assert_ne!(hash_token("secret"), hash_token("other"));
		assert!(!hash_token("secret").contains('='));
	}

	#[test]
	fn test_url_join() {
		assert_eq!(url_join("/media", "abc"), "/media/abc");
		assert_eq!(url_join("https://cdn.example.com/", "/abc"), "https://cdn.example.com/abc");
		assert_eq!(url_join("", "abc"), "abc");
	}
}

// vim: ts=4
