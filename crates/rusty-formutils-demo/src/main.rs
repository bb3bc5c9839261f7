use anyhow::Context;
use axum::{
    extract::{Request, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::post,
    Router,
};
use rusty_formutils::{
    parse_and_respond, FieldValue, Form, FormConfig, FormParser, FormState, RuleValidator,
    SchemaDecoder, ValidForm,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

/// Usernames nobody may sign up with
const RESERVED_USERNAMES: &[&str] = &["admin", "root", "system"];

#[derive(Debug, Default, Form)]
struct CreateUserForm {
    name: String,

    #[form(key = "email", validate = "email,required")]
    email: String,

    #[form(validate = "min=3,required")]
    password: String,

    #[form(validate = "omitempty,alphanum,not_reserved")]
    username: String,

    #[form(validate = "omitempty,gte=13,lte=130")]
    age: Option<u8>,

    #[form(key = "tag", validate = "max_items=5,max=20")]
    tags: Vec<String>,
}

/// Application state shared across handlers
#[derive(Clone)]
struct AppState {
    parser: Arc<FormParser>,
}

impl FormState for AppState {
    type Decoder = SchemaDecoder;
    type Validator = RuleValidator;

    fn form_parser(&self) -> &FormParser {
        &self.parser
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = FormConfig::load_default().unwrap_or_else(|e| {
        warn!("Failed to load config: {:#}, using defaults", e);
        FormConfig::default()
    });

    let parser = build_parser(&config)?;
    let app = app(Arc::new(parser));

    let addr = std::env::var("FORMUTILS_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Server running at http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Parser with the demo's custom rules; fails if a form uses an unknown rule
fn build_parser(config: &FormConfig) -> anyhow::Result<FormParser> {
    let validator = RuleValidator::new().with_rule("not_reserved", |value, _| match value {
        FieldValue::Text(text) => {
            let lowered = text.to_ascii_lowercase();
            Ok(!RESERVED_USERNAMES.contains(&lowered.as_str()))
        }
        other => anyhow::bail!("not_reserved cannot check a {} value", other.kind()),
    });

    let parser = FormParser::from_config(config).with_validator(validator);
    parser
        .register::<CreateUserForm>()
        .context("CreateUserForm has invalid form annotations")?;

    Ok(parser)
}

fn app(parser: Arc<FormParser>) -> Router {
    Router::new()
        .route("/users", post(create_user))
        .route("/users/manual", post(create_user_manual))
        .with_state(AppState { parser })
}

fn created(form: &CreateUserForm) -> Response {
    info!("Creating user {} <{}>", form.name, form.email);
    let body = json!({
        "name": form.name,
        "email": form.email,
        "username": form.username,
        "age": form.age,
        "tags": form.tags,
    });
    (StatusCode::CREATED, Json(body)).into_response()
}

/// Extractor style: invalid submissions never reach the handler body
async fn create_user(ValidForm(form): ValidForm<CreateUserForm>) -> Response {
    created(&form)
}

/// Explicit style: parse, bail out with the prepared response if needed
async fn create_user_manual(State(state): State<AppState>, request: Request) -> Response {
    let mut form = CreateUserForm::default();
    if let Some(response) = parse_and_respond(&*state.parser, request, &mut form).await {
        return response;
    }
    created(&form)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::header;
    use pretty_assertions::assert_eq;
    use serde_json::Value;
    use tower::ServiceExt;

    fn test_app() -> Router {
        app(Arc::new(build_parser(&FormConfig::default()).unwrap()))
    }

    async fn submit(uri: &str, body: &'static str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();

        let response = test_app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    #[tokio::test]
    async fn test_invalid_signup_reports_each_field() {
        for uri in ["/users", "/users/manual"] {
            let (status, body) = submit(uri, "email=not-an-email&password=ab").await;

            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(
                body,
                json!({
                    "message": "Invalid Data",
                    "fields": {
                        "email": "must be a valid email address",
                        "password": "must be min 3 chars length"
                    }
                })
            );
        }
    }

    #[tokio::test]
    async fn test_valid_signup_is_created() {
        let (status, body) = submit(
            "/users",
            "name=Ada&email=ada%40example.com&password=secret&age=36&tag=math&tag=poetry",
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["email"], "ada@example.com");
        assert_eq!(body["age"], 36);
        assert_eq!(body["tags"], json!(["math", "poetry"]));
    }

    #[tokio::test]
    async fn test_custom_rule_and_conversion_messages() {
        let (status, body) = submit(
            "/users/manual",
            "email=ada%40example.com&password=secret&username=Admin&age=old",
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["fields"],
            json!({
                "age": "must be a number",
                "username": "not_reserved"
            })
        );
    }

    #[tokio::test]
    async fn test_malformed_body_is_empty_500() {
        let (status, body) = submit("/users", "email=%zz").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, Value::Null);
    }
}
