use std::env;
use std::future::{Ready, ready};

use actix_web::{
    Error, HttpResponse, ResponseError,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::{StatusCode, header},
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use futures_util::future::LocalBoxFuture;

const DEFAULT_USERNAME: &str = "admin";
const DEFAULT_PASSWORD: &str = "password";

/// 401 with a Basic challenge. The body stays silent about which part of the
/// credentials was wrong.
#[derive(Debug, thiserror::Error)]
#[error("Unauthorized")]
pub struct Unauthorized;

impl ResponseError for Unauthorized {
    fn status_code(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::Unauthorized()
            .insert_header((header::WWW_AUTHENTICATE, "Basic realm=\"dashboard\""))
            .json(serde_json::json!({ "error": "Unauthorized" }))
    }
}

/// Expected credential pair, with the placeholder fallback for unconfigured
/// deployments.
pub fn dashboard_credentials() -> (String, String) {
    let username = env::var("DASHBOARD_USERNAME").unwrap_or_else(|_| DEFAULT_USERNAME.to_string());
    let password = env::var("DASHBOARD_PASSWORD").unwrap_or_else(|_| DEFAULT_PASSWORD.to_string());
    (username, password)
}

/// Check an Authorization header value against the expected pair.
pub fn check_credentials(header_value: &str, username: &str, password: &str) -> bool {
    let encoded = match header_value.strip_prefix("Basic ") {
        Some(encoded) => encoded.trim(),
        None => return false,
    };

    let decoded = match BASE64.decode(encoded) {
        Ok(bytes) => match String::from_utf8(bytes) {
            Ok(decoded) => decoded,
            Err(_) => return false,
        },
        Err(_) => return false,
    };

    match decoded.split_once(':') {
        Some((user, pass)) => user == username && pass == password,
        None => false,
    }
}

pub struct BasicAuth;

impl<S, B> Transform<S, ServiceRequest> for BasicAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = BasicAuthMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(BasicAuthMiddleware { service }))
    }
}

pub struct BasicAuthMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for BasicAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let authorized = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(|value| {
                let (username, password) = dashboard_credentials();
                check_credentials(value, &username, &password)
            })
            .unwrap_or(false);

        if !authorized {
            return Box::pin(async move { Err(Unauthorized.into()) });
        }

        Box::pin(self.service.call(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, test, web};

    fn authorization(user: &str, pass: &str) -> String {
        format!("Basic {}", BASE64.encode(format!("{}:{}", user, pass)))
    }

    #[::core::prelude::v1::test]
    fn accepts_exact_credential_pair() {
        let value = authorization("admin", "password");
        assert!(check_credentials(&value, "admin", "password"));
        assert!(!check_credentials(&value, "admin", "hunter2"));
        assert!(!check_credentials(&value, "root", "password"));
    }

    #[::core::prelude::v1::test]
    fn rejects_malformed_headers() {
        assert!(!check_credentials("Bearer abc", "admin", "password"));
        assert!(!check_credentials("Basic !!!not-base64!!!", "admin", "password"));
        // Decodes fine but carries no colon separator
        let no_colon = format!("Basic {}", BASE64.encode("adminpassword"));
        assert!(!check_credentials(&no_colon, "admin", "password"));
    }

    async fn guarded() -> HttpResponse {
        HttpResponse::Ok().json(serde_json::json!({ "ok": true }))
    }

    #[actix_web::test]
    async fn missing_credentials_get_a_challenge_and_no_handler_run() {
        let app = test::init_service(
            App::new().service(
                web::scope("/api")
                    .wrap(BasicAuth)
                    .route("/statistics", web::get().to(guarded)),
            ),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/statistics").to_request();
        let err = match test::try_call_service(&app, req).await {
            Ok(_) => panic!("request without credentials should be rejected"),
            Err(err) => err,
        };
        let resp = HttpResponse::from_error(err);
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            resp.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Basic realm=\"dashboard\""
        );
    }

    #[actix_web::test]
    async fn valid_credentials_reach_the_handler() {
        let app = test::init_service(
            App::new().service(
                web::scope("/api")
                    .wrap(BasicAuth)
                    .route("/statistics", web::get().to(guarded)),
            ),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/statistics")
            .insert_header((header::AUTHORIZATION, authorization("admin", "password")))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }
}
