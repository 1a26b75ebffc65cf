use askama::Template;

use crate::models::{Article, Comment};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Public URL of a stored media file, empty when there is none.
pub fn media_url(path: Option<&str>) -> String {
    path.map(|path| format!("/media/{path}")).unwrap_or_default()
}

// ----------------- View Models -----------------
#[derive(Debug, Clone)]
pub struct ArticleCard {
    pub id: i64,
    pub title: String,
    pub image_url: String,
    pub author: String,
}

impl From<Article> for ArticleCard {
    fn from(
        Article {
            id,
            title,
            image,
            author_username,
            ..
        }: Article,
    ) -> Self {
        ArticleCard {
            id,
            title,
            image_url: media_url(image.as_deref()),
            author: author_username,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CommentView {
    pub text: String,
    pub author: String,
    pub created_at: String,
}

impl From<Comment> for CommentView {
    fn from(
        Comment {
            text,
            author_username,
            created_at,
            ..
        }: Comment,
    ) -> Self {
        CommentView {
            text,
            author: author_username,
            created_at: created_at.format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ArticleView {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub image_url: String,
    pub created_at: String,
}

impl From<&Article> for ArticleView {
    fn from(article: &Article) -> Self {
        ArticleView {
            id: article.id,
            title: article.title.clone(),
            body: article.body.clone(),
            image_url: media_url(article.image.as_deref()),
            created_at: article.created_at.format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

// ----------------- Pages -----------------
#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub current_username: String,
    pub articles: Vec<ArticleCard>,
    pub order: String,
    pub text: String,
}

#[derive(Template)]
#[template(path = "article_list.html")]
pub struct ArticleListTemplate {
    pub current_username: String,
    pub articles: Vec<ArticleCard>,
}

#[derive(Template)]
#[template(path = "article_details.html")]
pub struct ArticleDetailsTemplate {
    pub current_username: String,
    pub article: ArticleView,
    pub author: String,
    pub comments: Vec<CommentView>,
    pub likes_count: i64,
    pub can_edit: bool,
    pub can_delete: bool,
    pub can_like: bool,
    pub has_liked: bool,
    pub can_comment: bool,
    pub comment_text: String,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "article_create.html")]
pub struct ArticleCreateTemplate {
    pub current_username: String,
    pub title: String,
    pub body: String,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "article_edit.html")]
pub struct ArticleEditTemplate {
    pub current_username: String,
    pub article_id: i64,
    pub title: String,
    pub body: String,
    pub image_url: String,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "article_delete.html")]
pub struct ArticleDeleteTemplate {
    pub current_username: String,
    pub article_id: i64,
    pub title: String,
}

#[derive(Template)]
#[template(path = "unauthorised.html")]
pub struct UnauthorisedTemplate {
    pub current_username: String,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub current_username: String,
    pub username: String,
    pub next: String,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    pub current_username: String,
    pub username: String,
    pub email: String,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub current_username: String,
    pub status: u16,
    pub message: String,
}
