use crate::client::{ApiClient, ApiResponse};
use crate::common::{field, render_json, step_end, step_header, str_of_date_local};
use crate::config::{Config, BIO};
use crate::data::*;
use crate::error::SmokeError;
use crate::report::{Report, StepOutcome, Verdict};

use reqwest::StatusCode;
use serde_json::Value;
use tracing::info;

pub const LIVENESS: &str = "Server liveness check";
pub const LIST_USERS: &str = "List users";
pub const SIGNUP: &str = "User signup";
pub const LOGIN: &str = "User login";
pub const CREATE_POST: &str = "Create post";
pub const LIST_POSTS: &str = "List posts";
pub const FETCH_USER: &str = "Fetch created user";
pub const FETCH_POST: &str = "Fetch created post";
pub const CREATE_COMMENT: &str = "Create comment";
pub const LIST_COMMENTS: &str = "List comments";

/// Runs the calls against one server, in order, one at a time.
pub struct Smoke {
    client: ApiClient,
    config: Config,
}

impl Smoke {
    pub fn new(config: Config) -> Result<Self, SmokeError> {
        Ok(Self {
            client: ApiClient::new(&config)?,
            config,
        })
    }

    /// Only an unreachable server is an error; every other problem ends up in
    /// the report and the run carries on.
    pub async fn run(&self) -> Result<Report, SmokeError> {
        println!(
            "=== API smoke test started {} against {} ===\n",
            str_of_date_local(chrono::Local::now()),
            self.client.base_url()
        );
        info!(email = %self.config.email, strict = self.config.strict, "starting smoke run");

        let mut report = Report::default();

        report.push(self.liveness().await?);
        report.push(self.list_users().await);

        let (outcome, user_id) = self.signup().await;
        report.push(outcome);

        report.push(self.login().await);

        let post_id = match &user_id {
            Some(user_id) => {
                let (outcome, post_id) = self.create_post(user_id).await;
                report.push(outcome);
                post_id
            }
            None => {
                report.push(skipped(5, CREATE_POST, "signup returned no user id"));
                None
            }
        };

        report.push(self.list(6, LIST_POSTS, "posts", "/posts").await);

        if self.config.extended {
            self.extended(&mut report, user_id.as_ref(), post_id.as_ref())
                .await;
        }

        println!("=== Smoke test finished ===");
        report.print_summary();
        Ok(report)
    }

    async fn liveness(&self) -> Result<StepOutcome, SmokeError> {
        step_header(1, LIVENESS);
        match self.client.get("/").await {
            Ok(resp) => {
                field("status", resp.status.as_u16());
                field("body", &resp.text);
                step_end();

                let verdict = if resp.status != StatusCode::OK {
                    Verdict::Unexpected(format!("expected 200, got {}", resp.status.as_u16()))
                } else if resp.text.trim().is_empty() {
                    Verdict::Unexpected("empty body".to_string())
                } else {
                    Verdict::Passed
                };
                Ok(outcome(1, LIVENESS, &resp, verdict))
            }
            Err(e) => {
                field("error", &e);
                step_end();
                Err(SmokeError::Unreachable {
                    url: self.client.url("/"),
                    reason: e.to_string(),
                })
            }
        }
    }

    async fn list_users(&self) -> StepOutcome {
        step_header(2, LIST_USERS);
        let resp = match self.client.get("/users").await {
            Ok(resp) => resp,
            Err(e) => return errored(2, LIST_USERS, &e),
        };

        field("status", resp.status.as_u16());
        match resp.json() {
            Some(body) => field("body", render_json(&body)),
            None => field("body", &resp.text),
        }
        step_end();

        let verdict = if resp.status.is_success() {
            Verdict::Passed
        } else {
            Verdict::Unexpected(format!("expected 2xx, got {}", resp.status.as_u16()))
        };
        outcome(2, LIST_USERS, &resp, verdict)
    }

    async fn signup(&self) -> (StepOutcome, Option<Value>) {
        let body = SignupRequest {
            email: &self.config.email,
            password: &self.config.password,
            username: &self.config.username,
            bio: BIO,
        };
        step_header(3, SIGNUP);
        let resp = self.client.post_json("/users/signup", &body).await;
        self.created(3, SIGNUP, "created user", resp, StatusCode::CREATED, "id")
    }

    async fn login(&self) -> StepOutcome {
        let body = LoginRequest {
            email: &self.config.email,
            password: &self.config.password,
        };
        step_header(4, LOGIN);
        let resp = self.client.post_json("/users/login", &body).await;
        let (outcome, token) =
            self.created(4, LOGIN, "login result", resp, StatusCode::OK, "token");
        if token.is_some() {
            info!("login returned a token");
        }
        outcome
    }

    async fn create_post(&self, user_id: &Value) -> (StepOutcome, Option<Value>) {
        let body = PostRequest {
            user_id,
            title: POST_TITLE,
            content: POST_CONTENT,
        };
        step_header(5, CREATE_POST);
        let resp = self.client.post_json("/posts", &body).await;
        self.created(5, CREATE_POST, "created post", resp, StatusCode::CREATED, "id")
    }

    async fn extended(
        &self,
        report: &mut Report,
        user_id: Option<&Value>,
        post_id: Option<&Value>,
    ) {
        match user_id {
            Some(user_id) => {
                step_header(7, FETCH_USER);
                let resp = self.client.get(&format!("/users/{}", id_segment(user_id))).await;
                let (outcome, _) = self.created(7, FETCH_USER, "user", resp, StatusCode::OK, "id");
                report.push(outcome);
            }
            None => report.push(skipped(7, FETCH_USER, "no user id")),
        }

        let Some(post_id) = post_id else {
            report.push(skipped(8, FETCH_POST, "no post id"));
            report.push(skipped(9, CREATE_COMMENT, "no post id"));
            report.push(skipped(10, LIST_COMMENTS, "no post id"));
            return;
        };
        let post_path = format!("/posts/{}", id_segment(post_id));

        step_header(8, FETCH_POST);
        let resp = self.client.get(&post_path).await;
        let (outcome, _) = self.created(8, FETCH_POST, "post", resp, StatusCode::OK, "id");
        report.push(outcome);

        let comments_path = format!("{}/comments", post_path);
        match user_id {
            Some(user_id) => {
                let body = CommentRequest {
                    user_id,
                    content: COMMENT_CONTENT,
                };
                step_header(9, CREATE_COMMENT);
                let resp = self.client.post_json(&comments_path, &body).await;
                let (outcome, _) = self.created(
                    9,
                    CREATE_COMMENT,
                    "created comment",
                    resp,
                    StatusCode::CREATED,
                    "id",
                );
                report.push(outcome);
            }
            None => report.push(skipped(9, CREATE_COMMENT, "no user id")),
        }

        report.push(self.list(10, LIST_COMMENTS, "comments", &comments_path).await);
    }

    /// Prints a reply that should carry `key` and hands back its value.
    fn created(
        &self,
        number: u8,
        name: &'static str,
        label: &str,
        resp: Result<ApiResponse, SmokeError>,
        expected: StatusCode,
        key: &str,
    ) -> (StepOutcome, Option<Value>) {
        let resp = match resp {
            Ok(resp) => resp,
            Err(e) => return (errored(number, name, &e), None),
        };

        field("status", resp.status.as_u16());
        if resp.status == expected {
            match resp.json() {
                Some(body) => field(label, render_json(&body)),
                None => field(label, &resp.text),
            }
        } else {
            field("body", &resp.text);
        }
        step_end();

        let (verdict, value) = field_verdict(&resp, expected, key);
        (outcome(number, name, &resp, verdict), value)
    }

    async fn list(&self, number: u8, name: &'static str, noun: &str, path: &str) -> StepOutcome {
        step_header(number, name);
        let resp = match self.client.get(path).await {
            Ok(resp) => resp,
            Err(e) => return errored(number, name, &e),
        };

        field("status", resp.status.as_u16());
        let body = resp.json();
        match body.as_ref().and_then(as_list) {
            Some(items) if resp.status == StatusCode::OK => {
                field(&format!("{} count", noun), items.len());
                if let Some(first) = items.first() {
                    field(&format!("first of {}", noun), render_json(first));
                }
            }
            _ => field("body", &resp.text),
        }
        step_end();

        outcome(number, name, &resp, list_verdict(&resp))
    }
}

/// 200/201-style check: the status matches and the reply holds a non-null `key`.
pub fn field_verdict(
    resp: &ApiResponse,
    expected: StatusCode,
    key: &str,
) -> (Verdict, Option<Value>) {
    if resp.status != expected {
        let verdict = Verdict::Unexpected(format!(
            "expected {}, got {}",
            expected.as_u16(),
            resp.status.as_u16()
        ));
        return (verdict, None);
    }

    match resp.json().as_ref().and_then(|body| extract_field(body, key).cloned()) {
        Some(value) => (Verdict::Passed, Some(value)),
        None => (Verdict::Unexpected(format!("reply has no '{}'", key)), None),
    }
}

/// A 200 whose body is a list of at least one element.
pub fn list_verdict(resp: &ApiResponse) -> Verdict {
    if resp.status != StatusCode::OK {
        return Verdict::Unexpected(format!("expected 200, got {}", resp.status.as_u16()));
    }
    match resp.json().as_ref().and_then(as_list).map(Vec::len) {
        Some(0) => Verdict::Unexpected("list is empty".to_string()),
        Some(_) => Verdict::Passed,
        None => Verdict::Unexpected("reply is not a list".to_string()),
    }
}

fn outcome(number: u8, name: &'static str, resp: &ApiResponse, verdict: Verdict) -> StepOutcome {
    StepOutcome {
        number,
        name,
        status: Some(resp.status.as_u16()),
        verdict,
    }
}

fn errored(number: u8, name: &'static str, e: &SmokeError) -> StepOutcome {
    field("error", e);
    step_end();
    StepOutcome {
        number,
        name,
        status: None,
        verdict: Verdict::Errored(e.to_string()),
    }
}

fn skipped(number: u8, name: &'static str, reason: &str) -> StepOutcome {
    StepOutcome {
        number,
        name,
        status: None,
        verdict: Verdict::Skipped(reason.to_string()),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn resp(status: u16, text: &str) -> ApiResponse {
        ApiResponse {
            status: StatusCode::from_u16(status).unwrap(),
            text: text.to_string(),
        }
    }

    #[test]
    fn created_user_needs_an_id() {
        let (verdict, id) = field_verdict(&resp(201, r#"{"id":1}"#), StatusCode::CREATED, "id");
        assert_eq!(verdict, Verdict::Passed);
        assert_eq!(id, Some(serde_json::json!(1)));

        let (verdict, id) =
            field_verdict(&resp(201, r#"{"email":"a@b.io"}"#), StatusCode::CREATED, "id");
        assert!(matches!(verdict, Verdict::Unexpected(_)));
        assert!(id.is_none());
    }

    #[test]
    fn wrong_status_is_unexpected() {
        let (verdict, id) = field_verdict(
            &resp(409, r#"{"error":"email already used"}"#),
            StatusCode::CREATED,
            "id",
        );
        assert_eq!(verdict, Verdict::Unexpected("expected 201, got 409".to_string()));
        assert!(id.is_none());
    }

    #[test]
    fn enveloped_post_id() {
        let body = r#"{"success":true,"message":"ok","data":{"id":4,"title":"t"}}"#;
        let (verdict, id) = field_verdict(&resp(201, body), StatusCode::CREATED, "id");
        assert_eq!(verdict, Verdict::Passed);
        assert_eq!(id, Some(serde_json::json!(4)));
    }

    #[test]
    fn login_without_token() {
        let (verdict, _) = field_verdict(
            &resp(200, r#"{"id":1,"email":"a@b.io"}"#),
            StatusCode::OK,
            "token",
        );
        assert_eq!(verdict, Verdict::Unexpected("reply has no 'token'".to_string()));
    }

    #[test]
    fn post_lists() {
        assert_eq!(list_verdict(&resp(200, r#"[{"id":1}]"#)), Verdict::Passed);
        assert_eq!(
            list_verdict(&resp(200, r#"{"success":true,"data":[{"id":1}]}"#)),
            Verdict::Passed
        );
        assert_eq!(
            list_verdict(&resp(200, "[]")),
            Verdict::Unexpected("list is empty".to_string())
        );
        assert_eq!(
            list_verdict(&resp(200, "not json")),
            Verdict::Unexpected("reply is not a list".to_string())
        );
        assert!(matches!(list_verdict(&resp(500, "[]")), Verdict::Unexpected(_)));
    }
}
