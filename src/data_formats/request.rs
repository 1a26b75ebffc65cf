use axum::{body::Bytes, extract::Multipart};
use serde::Deserialize;

use crate::errors::RequestError;

pub const TITLE_MAX_LENGTH: usize = 100;
pub const COMMENT_MAX_LENGTH: usize = 300;
pub const USERNAME_MAX_LENGTH: usize = 150;
pub const PASSWORD_MIN_LENGTH: usize = 8;
pub const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

// ----------------- Filter Request -----------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    #[default]
    Asc,
    Desc,
}

impl Order {
    /// Anything but `desc` sorts ascending.
    pub fn from_param(value: &str) -> Self {
        if value.eq_ignore_ascii_case("desc") {
            Order::Desc
        } else {
            Order::Asc
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Order::Asc => "asc",
            Order::Desc => "desc",
        }
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct FilterParams {
    #[serde(default)]
    pub order: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArticleFilter {
    pub order: Order,
    pub text: String,
}

impl From<FilterParams> for ArticleFilter {
    fn from(FilterParams { order, text }: FilterParams) -> Self {
        ArticleFilter {
            order: order.as_deref().map(Order::from_param).unwrap_or_default(),
            text: text.unwrap_or_default(),
        }
    }
}

// ----------------- User Request -----------------
#[derive(Deserialize, Debug, Default)]
pub struct NextParams {
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub next: String,
}

#[derive(Deserialize, Debug)]
pub struct RegisterForm {
    pub username: String,
    #[serde(default)]
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegisterForm {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = vec![];
        let username = self.username.trim();
        if username.is_empty() {
            errors.push("Username is required.".to_owned());
        } else if username.chars().count() > USERNAME_MAX_LENGTH {
            errors.push(format!(
                "Username must be at most {USERNAME_MAX_LENGTH} characters."
            ));
        } else if !username
            .chars()
            .all(|c| c.is_alphanumeric() || "@.+-_".contains(c))
        {
            errors.push("Username may contain only letters, digits and @/./+/-/_.".to_owned());
        }
        let email = self.email.trim();
        if !email.is_empty() && !email.contains('@') {
            errors.push("Enter a valid email address.".to_owned());
        }
        if self.password.chars().count() < PASSWORD_MIN_LENGTH {
            errors.push(format!(
                "Password must be at least {PASSWORD_MIN_LENGTH} characters."
            ));
        }
        if self.password != self.confirm_password {
            errors.push("Passwords do not match.".to_owned());
        }
        errors
    }
}

/// Only local absolute paths of visible ASCII are followed after login.
pub fn safe_next(next: &str) -> &str {
    let printable = next.bytes().all(|b| (0x21..0x7f).contains(&b));
    if printable && next.starts_with('/') && !next.starts_with("//") && !next.contains('\\') {
        next
    } else {
        "/"
    }
}

// ----------------- Comment Request -----------------
#[derive(Deserialize, Debug, Default)]
pub struct CommentForm {
    #[serde(default)]
    pub text: String,
}

impl CommentForm {
    pub fn validate(&self) -> Vec<String> {
        let text = self.text.trim();
        if text.is_empty() {
            vec!["Comment text is required.".to_owned()]
        } else if text.chars().count() > COMMENT_MAX_LENGTH {
            vec![format!(
                "Comment must be at most {COMMENT_MAX_LENGTH} characters."
            )]
        } else {
            vec![]
        }
    }
}

// ----------------- Article Request -----------------
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub file_name: String,
    pub bytes: Bytes,
}

impl UploadedImage {
    pub fn extension(&self) -> Option<String> {
        let (_, extension) = self.file_name.rsplit_once('.')?;
        let extension = extension.to_ascii_lowercase();
        IMAGE_EXTENSIONS
            .contains(&extension.as_str())
            .then_some(extension)
    }
}

#[derive(Debug, Default)]
pub struct ArticleForm {
    pub title: String,
    pub body: String,
    pub image: Option<UploadedImage>,
}

impl ArticleForm {
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, RequestError> {
        let mut form = ArticleForm::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_owned();
            match name.as_str() {
                "title" => form.title = field.text().await?,
                "body" => form.body = field.text().await?,
                "image" => {
                    let file_name = field.file_name().unwrap_or_default().to_owned();
                    let bytes = field.bytes().await?;
                    // browsers send an empty part when no file was picked
                    if !file_name.is_empty() && !bytes.is_empty() {
                        form.image = Some(UploadedImage { file_name, bytes });
                    }
                }
                _ => {}
            }
        }
        Ok(form)
    }

    pub fn validate(&self) -> Vec<String> {
        let mut errors = vec![];
        let title = self.title.trim();
        if title.is_empty() {
            errors.push("Title is required.".to_owned());
        } else if title.chars().count() > TITLE_MAX_LENGTH {
            errors.push(format!(
                "Title must be at most {TITLE_MAX_LENGTH} characters."
            ));
        }
        if self.body.trim().is_empty() {
            errors.push("Content is required.".to_owned());
        }
        if let Some(image) = &self.image {
            if image.extension().is_none() {
                errors.push(format!(
                    "Upload a valid image ({}).",
                    IMAGE_EXTENSIONS.join(", ")
                ));
            }
        }
        errors
    }
}
