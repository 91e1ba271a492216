use serde::Serialize;
use serde_json::Value;

pub const POST_TITLE: &str = "First post";
pub const POST_CONTENT: &str = "A post written by the API smoke test.";
pub const COMMENT_CONTENT: &str = "A comment written by the API smoke test.";

#[derive(Debug, Serialize)]
pub struct SignupRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub username: &'a str,
    pub bio: &'a str,
}

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct PostRequest<'a> {
    /// Forwarded exactly as signup returned it.
    pub user_id: &'a Value,
    pub title: &'a str,
    pub content: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRequest<'a> {
    pub user_id: &'a Value,
    pub content: &'a str,
}

/// Looks up `key` at the top level and then inside a `data` envelope.
/// A `null` value counts as missing.
pub fn extract_field<'a>(body: &'a Value, key: &str) -> Option<&'a Value> {
    let present = |v: &'a Value| v.get(key).filter(|f| !f.is_null());
    present(body).or_else(|| body.get("data").and_then(present))
}

/// A bare array, or an envelope whose `data` is an array.
pub fn as_list(body: &Value) -> Option<&Vec<Value>> {
    body.as_array()
        .or_else(|| body.get("data").and_then(Value::as_array))
}

/// Renders an id for use in a path: numbers as-is, strings without quotes.
pub fn id_segment(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
