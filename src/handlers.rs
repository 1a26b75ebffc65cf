use std::sync::Arc;

use askama::Template;
use axum::{
    extract::{Multipart, Path, Query},
    http::{header::SET_COOKIE, StatusCode, Uri},
    response::{Html, IntoResponse, Redirect, Response},
    Extension, Form,
};
use tracing::{info, warn};

use crate::{
    authentication::{
        expired_session_cookie, get_jwt_token, hash_password_argon2, session_cookie,
        verify_password_argon2, AuthUser, MaybeUser,
    },
    data_formats::{
        safe_next, ArticleCard, ArticleCreateTemplate, ArticleDeleteTemplate,
        ArticleDetailsTemplate, ArticleEditTemplate, ArticleFilter, ArticleForm,
        ArticleListTemplate, ArticleView, CommentForm, CommentView, FilterParams, HomeTemplate,
        LoginForm, LoginTemplate, NextParams, RegisterForm, RegisterTemplate,
        UnauthorisedTemplate,
    },
    db_helpers::{
        add_comment_to_article_in_db, count_likes_in_db, create_article_in_db,
        delete_article_in_db, get_article_by_id_in_db, get_comments_for_article_in_db,
        get_like_in_db, get_user_by_username, insert_user, is_unique_violation,
        list_all_articles_in_db, list_articles_in_db, toggle_like_in_db, update_article_in_db,
    },
    errors::RequestError,
    media::{clean_up_files, discard_on_error, save_image},
    models::Article,
    AppState,
};

type HtmlResult = Result<Html<String>, RequestError>;
type PageResult = Result<Response, RequestError>;

fn render<T: Template>(page: &T) -> HtmlResult {
    Ok(Html(page.render()?))
}

/// Re-renders a form that failed validation.
fn render_invalid<T: Template>(page: &T) -> PageResult {
    Ok((StatusCode::UNPROCESSABLE_ENTITY, render(page)?).into_response())
}

fn article_url(id: i64) -> String {
    format!("/articles/{id}")
}

async fn find_article(state: &AppState, id: i64) -> Result<Article, RequestError> {
    get_article_by_id_in_db(&state.pool, id)
        .await?
        .ok_or(RequestError::NotFound)
}

async fn find_owned_article(
    state: &AppState,
    id: i64,
    user: &AuthUser,
) -> Result<Article, RequestError> {
    let article = find_article(state, id).await?;
    if article.profile_id != user.profile_id {
        warn!(
            "{} tried to change article {} owned by {}",
            user.username, id, article.author_username
        );
        return Err(RequestError::Forbidden);
    }
    Ok(article)
}

// ----------------- Helper Handlers -----------------
pub async fn alive() -> &'static str {
    "alive"
}

pub async fn not_found(uri: Uri) -> RequestError {
    info!("URL {} provided was not found", uri);
    RequestError::NotFound
}

pub async fn unauthorised_message(maybe_user: MaybeUser) -> HtmlResult {
    render(&UnauthorisedTemplate {
        current_username: maybe_user.username(),
    })
}

// ----------------- Listing Handlers -----------------
pub async fn home(
    Extension(state): Extension<Arc<AppState>>,
    maybe_user: MaybeUser,
    Query(params): Query<FilterParams>,
) -> HtmlResult {
    render_home(&state, maybe_user, params.into()).await
}

pub async fn home_filter(
    Extension(state): Extension<Arc<AppState>>,
    maybe_user: MaybeUser,
    Form(params): Form<FilterParams>,
) -> HtmlResult {
    render_home(&state, maybe_user, params.into()).await
}

async fn render_home(state: &AppState, maybe_user: MaybeUser, filter: ArticleFilter) -> HtmlResult {
    let articles = list_articles_in_db(&state.pool, &filter).await?;
    render(&HomeTemplate {
        current_username: maybe_user.username(),
        articles: articles.into_iter().map(ArticleCard::from).collect(),
        order: filter.order.as_str().to_owned(),
        text: filter.text,
    })
}

pub async fn article_list(
    Extension(state): Extension<Arc<AppState>>,
    maybe_user: MaybeUser,
) -> HtmlResult {
    let articles = list_all_articles_in_db(&state.pool).await?;
    render(&ArticleListTemplate {
        current_username: maybe_user.username(),
        articles: articles.into_iter().map(ArticleCard::from).collect(),
    })
}

// ----------------- Detail Handlers -----------------
async fn details_page(
    state: &AppState,
    user: &AuthUser,
    article: Article,
    CommentForm { text }: CommentForm,
    errors: Vec<String>,
) -> Result<ArticleDetailsTemplate, RequestError> {
    let comments = get_comments_for_article_in_db(&state.pool, article.id).await?;
    let likes_count = count_likes_in_db(&state.pool, article.id).await?;
    let has_liked = get_like_in_db(&state.pool, user.profile_id, article.id)
        .await?
        .is_some();
    let is_owner = article.profile_id == user.profile_id;
    Ok(ArticleDetailsTemplate {
        current_username: user.username.clone(),
        article: ArticleView::from(&article),
        author: article.author_username,
        comments: comments.into_iter().map(CommentView::from).collect(),
        likes_count,
        can_edit: is_owner,
        can_delete: is_owner,
        can_like: !is_owner,
        has_liked,
        can_comment: !is_owner,
        comment_text: text,
        errors,
    })
}

pub async fn article_details(
    Extension(state): Extension<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> HtmlResult {
    let article = find_article(&state, id).await?;
    let page = details_page(&state, &user, article, CommentForm::default(), vec![]).await?;
    render(&page)
}

pub async fn comment_article(
    Extension(state): Extension<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
    Form(form): Form<CommentForm>,
) -> PageResult {
    let article = find_article(&state, id).await?;
    if article.profile_id == user.profile_id {
        return Err(RequestError::Forbidden);
    }
    let errors = form.validate();
    if !errors.is_empty() {
        let page = details_page(&state, &user, article, form, errors).await?;
        return render_invalid(&page);
    }
    add_comment_to_article_in_db(&state.pool, user.profile_id, id, form.text.trim()).await?;
    info!("{} commented on article {}", user.username, id);
    Ok(Redirect::to(&article_url(id)).into_response())
}

pub async fn like_article(
    Extension(state): Extension<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> PageResult {
    let article = find_article(&state, id).await?;
    if article.profile_id == user.profile_id {
        return Err(RequestError::Forbidden);
    }
    let liked = toggle_like_in_db(&state.pool, user.profile_id, id).await?;
    info!("{} set like on article {} to {}", user.username, id, liked);
    Ok(Redirect::to(&article_url(id)).into_response())
}

// ----------------- Article Handlers -----------------
pub async fn create_article_page(user: AuthUser) -> HtmlResult {
    render(&ArticleCreateTemplate {
        current_username: user.username,
        title: String::new(),
        body: String::new(),
        errors: vec![],
    })
}

pub async fn create_article(
    Extension(state): Extension<Arc<AppState>>,
    user: AuthUser,
    multipart: Multipart,
) -> PageResult {
    let form = ArticleForm::from_multipart(multipart).await?;
    let errors = form.validate();
    if !errors.is_empty() {
        return render_invalid(&ArticleCreateTemplate {
            current_username: user.username,
            title: form.title,
            body: form.body,
            errors,
        });
    }

    let image = match &form.image {
        Some(image) => Some(save_image(&state.config.media_root, image).await?),
        None => None,
    };
    let created = create_article_in_db(
        &state.pool,
        user.profile_id,
        form.title.trim(),
        &form.body,
        image.as_deref(),
    )
    .await;
    let id = discard_on_error(&state.config.media_root, image.as_deref(), created).await?;
    info!("{} created article {}", user.username, id);
    Ok(Redirect::to("/").into_response())
}

pub async fn edit_article_page(
    Extension(state): Extension<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> HtmlResult {
    let article = find_owned_article(&state, id, &user).await?;
    let ArticleView {
        title,
        body,
        image_url,
        ..
    } = ArticleView::from(&article);
    render(&ArticleEditTemplate {
        current_username: user.username,
        article_id: id,
        title,
        body,
        image_url,
        errors: vec![],
    })
}

pub async fn edit_article(
    Extension(state): Extension<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> PageResult {
    let article = find_owned_article(&state, id, &user).await?;
    let form = ArticleForm::from_multipart(multipart).await?;
    let errors = form.validate();
    if !errors.is_empty() {
        return render_invalid(&ArticleEditTemplate {
            current_username: user.username,
            article_id: id,
            title: form.title,
            body: form.body,
            image_url: ArticleView::from(&article).image_url,
            errors,
        });
    }

    let new_image = match &form.image {
        Some(image) => Some(save_image(&state.config.media_root, image).await?),
        None => None,
    };
    let updated = update_article_in_db(
        &state.pool,
        id,
        user.profile_id,
        form.title.trim().to_owned(),
        form.body,
        new_image.clone(),
    )
    .await;
    discard_on_error(&state.config.media_root, new_image.as_deref(), updated).await?;
    if new_image.is_some() {
        if let Some(old_image) = &article.image {
            clean_up_files(&state.config.media_root, old_image).await;
        }
    }
    info!("{} edited article {}, likes cleared", user.username, id);
    Ok(Redirect::to(&article_url(id)).into_response())
}

pub async fn delete_article_page(
    Extension(state): Extension<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> HtmlResult {
    let article = find_owned_article(&state, id, &user).await?;
    render(&ArticleDeleteTemplate {
        current_username: user.username,
        article_id: id,
        title: article.title,
    })
}

pub async fn delete_article(
    Extension(state): Extension<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> PageResult {
    let article = find_owned_article(&state, id, &user).await?;
    delete_article_in_db(&state.pool, id, user.profile_id).await?;
    if let Some(image) = &article.image {
        clean_up_files(&state.config.media_root, image).await;
    }
    info!("{} deleted article {}", user.username, id);
    Ok(Redirect::to("/articles").into_response())
}

// ----------------- User Handlers -----------------
fn logged_in_redirect(state: &AppState, user_id: i64, next: &str) -> PageResult {
    let token = get_jwt_token(&state.config.jwt_secret, user_id).map_err(|e| {
        warn!("{:#}", e);
        RequestError::ServerError
    })?;
    Ok((
        [(SET_COOKIE, session_cookie(&token))],
        Redirect::to(safe_next(next)),
    )
        .into_response())
}

pub async fn login_page(maybe_user: MaybeUser, Query(params): Query<NextParams>) -> HtmlResult {
    render(&LoginTemplate {
        current_username: maybe_user.username(),
        username: String::new(),
        next: params.next.unwrap_or_default(),
        errors: vec![],
    })
}

pub async fn login_user(
    Extension(state): Extension<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> PageResult {
    let invalid = |form: LoginForm| {
        render_invalid(&LoginTemplate {
            current_username: String::new(),
            username: form.username,
            next: form.next,
            errors: vec!["Invalid username or password.".to_owned()],
        })
    };

    let user = match get_user_by_username(&state.pool, form.username.trim()).await? {
        Some(user) => user,
        None => return invalid(form),
    };
    let is_password_correct = verify_password_argon2(form.password.clone(), user.password)
        .await
        .map_err(|e| {
            warn!("{:#}", e);
            RequestError::ServerError
        })?;
    if !is_password_correct {
        return invalid(form);
    }

    info!("{} logged in", user.username);
    logged_in_redirect(&state, user.id, &form.next)
}

pub async fn register_page(maybe_user: MaybeUser) -> HtmlResult {
    render(&RegisterTemplate {
        current_username: maybe_user.username(),
        username: String::new(),
        email: String::new(),
        errors: vec![],
    })
}

pub async fn register_user(
    Extension(state): Extension<Arc<AppState>>,
    Form(mut form): Form<RegisterForm>,
) -> PageResult {
    let invalid = |form: RegisterForm, errors: Vec<String>| {
        render_invalid(&RegisterTemplate {
            current_username: String::new(),
            username: form.username,
            email: form.email,
            errors,
        })
    };

    let errors = form.validate();
    if !errors.is_empty() {
        return invalid(form, errors);
    }

    form.password = hash_password_argon2(form.password).await.map_err(|e| {
        warn!("{:#}", e);
        RequestError::ServerError
    })?;
    let (user, _) = match insert_user(&state.pool, &form).await {
        Ok(created) => created,
        Err(e) if is_unique_violation(&e) => {
            return invalid(form, vec!["A user with that username already exists.".to_owned()]);
        }
        Err(e) => return Err(e),
    };

    info!("Registered {}", user.username);
    logged_in_redirect(&state, user.id, "/")
}

pub async fn logout_user(maybe_user: MaybeUser) -> Response {
    if let MaybeUser(Some(user)) = &maybe_user {
        info!("{} (user {}) logged out", user.username, user.id);
    }
    (
        [(SET_COOKIE, expired_session_cookie())],
        Redirect::to("/"),
    )
        .into_response()
}
