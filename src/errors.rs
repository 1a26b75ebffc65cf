use std::sync::Arc;

use askama::Template;
use axum::{
    extract::multipart::MultipartError,
    http::{Request, StatusCode},
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
};
use thiserror::Error;
use tracing::{error, warn};

use crate::{authentication::current_user, data_formats::ErrorTemplate, AppState};

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Not Found")]
    NotFound,
    #[error("Login required to access {next}")]
    LoginRequired { next: String },
    #[error("Forbidden")]
    Forbidden,
    #[error("{0}")]
    BadRequest(&'static str),
    #[error("Internal Server Error")]
    ServerError,
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
    #[error("Template error: {0}")]
    TemplateError(#[from] askama::Error),
    #[error("Storage error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<MultipartError> for RequestError {
    fn from(value: MultipartError) -> Self {
        warn!("Malformed multipart body: {}", value);
        Self::BadRequest("Malformed form submission")
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        let (status_code, message) = match &self {
            RequestError::LoginRequired { next } => {
                return Redirect::to(&login_location(next)).into_response();
            }
            RequestError::Forbidden => return Redirect::to("/unauthorised").into_response(),
            RequestError::NotFound => (StatusCode::NOT_FOUND, "Not Found"),
            RequestError::BadRequest(message) => (StatusCode::BAD_REQUEST, *message),
            RequestError::ServerError
            | RequestError::DatabaseError(_)
            | RequestError::TemplateError(_)
            | RequestError::Io(_) => {
                error!("{}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            }
        };
        let mut response = error_page(status_code, message, String::new());
        response.extensions_mut().insert(ErrorPage {
            status: status_code,
            message,
        });
        response
    }
}

fn login_location(next: &str) -> String {
    match serde_urlencoded::to_string([("next", next)]) {
        Ok(query) => format!("/login?{query}"),
        Err(e) => {
            warn!("Could not encode login redirect for {}: {}", next, e);
            "/login".to_owned()
        }
    }
}

/// Left on error responses so the page can be rendered again for the
/// logged in visitor.
#[derive(Debug, Clone, Copy)]
struct ErrorPage {
    status: StatusCode,
    message: &'static str,
}

/// Error pages are built without the request, so they start out with the
/// anonymous navigation. This puts the visitor's username back.
pub async fn render_error_pages<B>(request: Request<B>, next: Next<B>) -> Response {
    let state = request.extensions().get::<Arc<AppState>>().cloned();
    let headers = request.headers().clone();
    let response = next.run(request).await;

    let page = match response.extensions().get::<ErrorPage>() {
        Some(page) => *page,
        None => return response,
    };
    let state = match state {
        Some(state) => state,
        None => return response,
    };
    match current_user(&state, &headers).await {
        Ok(Some(user)) => error_page(page.status, page.message, user.username),
        Ok(None) => response,
        Err(e) => {
            warn!("Could not look up the visitor for an error page: {}", e);
            response
        }
    }
}

fn error_page(status_code: StatusCode, message: &str, current_username: String) -> Response {
    let page = ErrorTemplate {
        current_username,
        status: status_code.as_u16(),
        message: message.to_owned(),
    };
    match page.render() {
        Ok(body) => (status_code, Html(body)).into_response(),
        Err(e) => {
            error!("Failed to render error page: {}", e);
            (status_code, message.to_owned()).into_response()
        }
    }
}
