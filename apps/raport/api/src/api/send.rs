//! Send endpoint: render the PDF and dispatch it as an email attachment.

use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use domain_dispatch::{DispatchError, ProviderError, SendRequest};
use serde::Serialize;
use tracing::warn;

/// Uniform response envelope, success shape.
#[derive(Debug, Serialize)]
pub struct SendOkBody {
    pub ok: bool,
    pub id: Option<String>,
}

/// Uniform response envelope, failure shape.
#[derive(Debug, Serialize)]
pub struct SendErrorBody {
    pub ok: bool,
    pub error: String,
    pub code: &'static str,
}

/// Map a dispatch error to the response status.
///
/// 400 for client input, 502 for delivery-level provider failures, 500 for
/// everything that is our (or our configuration's) fault.
fn status_for(err: &DispatchError) -> StatusCode {
    match err {
        DispatchError::MissingRecipient => StatusCode::BAD_REQUEST,
        DispatchError::ProviderNotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
        DispatchError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        DispatchError::Provider(provider_err) => match provider_err {
            ProviderError::Config(_) | ProviderError::Auth(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ProviderError::Send { .. } | ProviderError::Transport(_) => StatusCode::BAD_GATEWAY,
        },
    }
}

fn error_response(err: &DispatchError) -> Response {
    let status = status_for(err);
    let detail = match err {
        // Provider detail surfaced verbatim
        DispatchError::Provider(provider_err) => provider_err.to_string(),
        other => other.to_string(),
    };
    (
        status,
        Json(SendErrorBody {
            ok: false,
            error: detail,
            code: err.code(),
        }),
    )
        .into_response()
}

/// `POST /send` (and `/send-pdf`): `{to|recipient, subject?, message?}`.
pub async fn send_handler(
    State(state): State<AppState>,
    payload: Result<Json<SendRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(json) => json,
        Err(rejection) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(SendErrorBody {
                    ok: false,
                    error: rejection.body_text(),
                    code: "INVALID_JSON",
                }),
            )
                .into_response();
        }
    };

    match state.dispatch.dispatch(request).await {
        Ok(receipt) => Json(SendOkBody {
            ok: true,
            id: receipt.message_id,
        })
        .into_response(),
        Err(err) => {
            warn!(code = err.code(), error = %err, "Dispatch failed");
            error_response(&err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use core_config::{server::ServerConfig, Environment};
    use domain_dispatch::{
        providers::{MailProvider, OutgoingEmail},
        DispatchConfig, DispatchService, DocumentRenderer, DispatchResult, ProviderKind,
        RenderedDocument, SentMail,
    };
    use http_body_util::BodyExt;
    use std::sync::Arc;
    use tower::ServiceExt;

    struct StubRenderer;

    #[async_trait]
    impl DocumentRenderer for StubRenderer {
        async fn render(&self, _title: &str, _body: &str) -> DispatchResult<RenderedDocument> {
            Ok(RenderedDocument {
                filename: "raport-godzin.pdf".to_string(),
                bytes: b"%PDF-1.4 stub".to_vec(),
            })
        }
    }

    struct OkProvider;

    #[async_trait]
    impl MailProvider for OkProvider {
        async fn send(&self, _email: &OutgoingEmail) -> Result<SentMail, ProviderError> {
            Ok(SentMail {
                message_id: Some("msg-123".to_string()),
            })
        }

        fn name(&self) -> &'static str {
            "stub"
        }
    }

    struct UnauthorizedProvider;

    #[async_trait]
    impl MailProvider for UnauthorizedProvider {
        async fn send(&self, _email: &OutgoingEmail) -> Result<SentMail, ProviderError> {
            Err(ProviderError::Send {
                code: "401 Unauthorized".to_string(),
                message: "API key is invalid".to_string(),
            })
        }

        fn name(&self) -> &'static str {
            "stub"
        }
    }

    fn app(provider: Option<Arc<dyn MailProvider>>) -> axum::Router {
        let config = Config {
            server: ServerConfig::default(),
            environment: Environment::Development,
            provider_kind: ProviderKind::Resend,
            dispatch: DispatchConfig {
                attachment_filename: "raport-godzin.pdf".to_string(),
                stage_timeout: std::time::Duration::from_secs(5),
                max_in_flight: 4,
            },
        };
        let dispatch = Arc::new(DispatchService::new(
            Arc::new(StubRenderer),
            provider,
            config.dispatch.clone(),
        ));
        crate::api::routes(crate::state::AppState { config, dispatch })
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_healthz_returns_fixed_payload() {
        let app = app(Some(Arc::new(OkProvider)));
        let response = app
            .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_send_success_returns_envelope_with_id() {
        let app = app(Some(Arc::new(OkProvider)));
        let response = app
            .oneshot(post_json("/send", r#"{"to":"it@example.com"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["ok"], true);
        assert_eq!(body["id"], "msg-123");
    }

    #[tokio::test]
    async fn test_send_pdf_alias_routes_to_same_handler() {
        let app = app(Some(Arc::new(OkProvider)));
        let response = app
            .oneshot(post_json("/send-pdf", r#"{"recipient":"it@example.com"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_recipient_is_400_with_original_wording() {
        let app = app(Some(Arc::new(OkProvider)));
        let response = app
            .oneshot(post_json("/send", r#"{"subject":"S"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["ok"], false);
        assert_eq!(body["error"], "Brak pola 'to'.");
        assert_eq!(body["code"], "MISSING_RECIPIENT");
    }

    #[tokio::test]
    async fn test_provider_rejection_is_502_with_detail() {
        let app = app(Some(Arc::new(UnauthorizedProvider)));
        let response = app
            .oneshot(post_json("/send", r#"{"to":"it@example.com"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = body_json(response).await;
        assert_eq!(body["ok"], false);
        assert_eq!(body["code"], "PROVIDER_SEND_ERROR");
        let detail = body["error"].as_str().unwrap();
        assert!(detail.contains("API key is invalid"));
    }

    #[tokio::test]
    async fn test_unconfigured_provider_is_500() {
        let app = app(None);
        let response = app
            .oneshot(post_json("/send", r#"{"to":"it@example.com"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["code"], "PROVIDER_NOT_CONFIGURED");
    }

    #[tokio::test]
    async fn test_malformed_json_is_400() {
        let app = app(Some(Arc::new(OkProvider)));
        let response = app.oneshot(post_json("/send", "{not json")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["ok"], false);
        assert_eq!(body["code"], "INVALID_JSON");
    }
}
