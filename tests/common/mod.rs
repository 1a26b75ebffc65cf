#![allow(dead_code)]

use std::{
    path::PathBuf,
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use adventure::{get_random_free_port, run_app, Config};
use reqwest::{multipart, Client, Response, StatusCode};
use tokio::task::JoinHandle;

static APP_COUNTER: AtomicUsize = AtomicUsize::new(0);

pub const PASSWORD: &str = "correct horse battery";

pub struct TestApp {
    pub address: String,
    pub media_root: PathBuf,
    root: PathBuf,
    server: JoinHandle<()>,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self.server.abort();
        let _ = std::fs::remove_dir_all(&self.root);
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Files currently stored for article images.
    pub fn stored_images(&self) -> Vec<String> {
        let mut names: Vec<String> = match std::fs::read_dir(self.media_root.join("articles")) {
            Ok(entries) => entries
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.file_name().to_string_lossy().into_owned())
                .collect(),
            Err(_) => vec![],
        };
        names.sort();
        names
    }
}

/// Starts the server on a free port with its own database and media root.
pub async fn spawn_app() -> TestApp {
    let (_, address) = get_random_free_port();
    let root = std::env::temp_dir().join(format!(
        "adventure-test-{}-{}",
        std::process::id(),
        APP_COUNTER.fetch_add(1, Ordering::SeqCst)
    ));
    let _ = std::fs::remove_dir_all(&root);
    std::fs::create_dir_all(&root).unwrap();
    let media_root = root.join("media");

    let config = Config {
        address,
        database_url: format!("sqlite://{}", root.join("adventure.db").display()),
        jwt_secret: "integration-test-secret".to_owned(),
        media_root: media_root.clone(),
    };
    let server = tokio::spawn(async move {
        if let Err(e) = run_app(config).await {
            panic!("server failed: {e:#}");
        }
    });

    let app = TestApp {
        address: format!("http://{address}"),
        media_root,
        root,
        server,
    };
    let health = Client::new();
    for _ in 0..100 {
        if let Ok(response) = health.get(app.url("/check_health")).send().await {
            if response.status() == StatusCode::OK {
                return app;
            }
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("server did not start on {address}");
}

pub fn client() -> Client {
    Client::builder().cookie_store(true).build().unwrap()
}

/// A client logged in as a freshly registered `username`.
pub async fn user_client(app: &TestApp, username: &str) -> Client {
    let client = client();
    let response = client
        .post(app.url("/register"))
        .form(&[
            ("username", username),
            ("email", ""),
            ("password", PASSWORD),
            ("confirm_password", PASSWORD),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.url().path(), "/");
    client
}

pub fn article_form(title: &str, body: &str) -> multipart::Form {
    multipart::Form::new()
        .text("title", title.to_owned())
        .text("body", body.to_owned())
}

pub fn with_image(form: multipart::Form, file_name: &str, bytes: &'static [u8]) -> multipart::Form {
    let part = multipart::Part::bytes(bytes)
        .file_name(file_name.to_owned())
        .mime_str("image/png")
        .unwrap();
    form.part("image", part)
}

pub async fn create_article(client: &Client, app: &TestApp, form: multipart::Form) -> Response {
    client
        .post(app.url("/articles/create"))
        .multipart(form)
        .send()
        .await
        .unwrap()
}

pub async fn page(client: &Client, app: &TestApp, path: &str) -> (StatusCode, String) {
    let response = client.get(app.url(path)).send().await.unwrap();
    let status = response.status();
    (status, response.text().await.unwrap())
}

pub fn likes_marker(count: i64) -> String {
    format!(r#"<span class="likes-count">{count}</span>"#)
}
