mod common;

use common::*;
use reqwest::StatusCode;

const PNG: &[u8] = b"\x89PNG\r\n\x1a\nfirst";
const OTHER_PNG: &[u8] = b"\x89PNG\r\n\x1a\nsecond";

#[tokio::test]
async fn home_filters_case_insensitively_and_orders_by_title() {
    let app = spawn_app().await;
    let alice = user_client(&app, "alice").await;
    for title in ["Mountain Trip", "Sea Kayaking", "Night on the MOUNTAIN"] {
        let response = create_article(&alice, &app, article_form(title, "story")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.url().path(), "/");
    }

    let anonymous = client();
    let (status, body) = page(&anonymous, &app, "/?text=mountain&order=asc").await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body.contains("Sea Kayaking"));
    let first = body.find("Mountain Trip").unwrap();
    let second = body.find("Night on the MOUNTAIN").unwrap();
    assert!(first < second);

    let (_, body) = page(&anonymous, &app, "/?text=MOUNTAIN&order=desc").await;
    assert!(body.find("Night on the MOUNTAIN").unwrap() < body.find("Mountain Trip").unwrap());
    assert!(body.contains(r#"<option value="desc" selected>"#));
    assert!(body.contains(r#"value="MOUNTAIN""#));

    let response = anonymous
        .post(app.url("/"))
        .form(&[("text", "kayak"), ("order", "asc")])
        .send()
        .await
        .unwrap();
    let body = response.text().await.unwrap();
    assert!(body.contains("Sea Kayaking"));
    assert!(!body.contains("Mountain Trip"));
}

#[tokio::test]
async fn article_list_shows_everything() {
    let app = spawn_app().await;
    let alice = user_client(&app, "alice").await;
    create_article(&alice, &app, article_form("Zebra ride", "stripes")).await;
    create_article(&alice, &app, article_form("Apple orchard", "fruit")).await;

    let (status, body) = page(&client(), &app, "/articles").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.find("Zebra ride").unwrap() < body.find("Apple orchard").unwrap());
}

#[tokio::test]
async fn details_require_login() {
    let app = spawn_app().await;
    let alice = user_client(&app, "alice").await;
    create_article(&alice, &app, article_form("Canyon", "deep")).await;

    let response = client().get(app.url("/articles/1")).send().await.unwrap();
    assert_eq!(response.url().path(), "/login");
    assert_eq!(response.url().query(), Some("next=%2Farticles%2F1"));
}

#[tokio::test]
async fn login_redirect_keeps_ampersands_in_next() {
    let app = spawn_app().await;
    let response = client()
        .get(app.url("/articles/1&evil=1"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.url().path(), "/login");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.url().query(), Some("next=%2Farticles%2F1%26evil%3D1"));
}

#[tokio::test]
async fn missing_article_is_404() {
    let app = spawn_app().await;
    let alice = user_client(&app, "alice").await;
    let (status, body) = page(&alice, &app, "/articles/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains(r#"<span class="current-user">alice</span>"#));
    let response = alice
        .post(app.url("/articles/999/like"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn owner_and_visitor_see_different_actions() {
    let app = spawn_app().await;
    let alice = user_client(&app, "alice").await;
    let bob = user_client(&app, "bob").await;
    create_article(&alice, &app, article_form("Volcano", "hot")).await;

    let (_, owner_view) = page(&alice, &app, "/articles/1").await;
    assert!(owner_view.contains("/articles/1/edit"));
    assert!(owner_view.contains("/articles/1/delete"));
    assert!(!owner_view.contains("/articles/1/like"));

    let (_, visitor_view) = page(&bob, &app, "/articles/1").await;
    assert!(!visitor_view.contains("/articles/1/edit"));
    assert!(!visitor_view.contains("/articles/1/delete"));
    assert!(visitor_view.contains("/articles/1/like"));
}

#[tokio::test]
async fn liking_twice_returns_to_unliked() {
    let app = spawn_app().await;
    let alice = user_client(&app, "alice").await;
    let bob = user_client(&app, "bob").await;
    create_article(&alice, &app, article_form("Waterfall", "loud")).await;

    let response = bob.post(app.url("/articles/1/like")).send().await.unwrap();
    assert_eq!(response.url().path(), "/articles/1");
    let body = response.text().await.unwrap();
    assert!(body.contains(&likes_marker(1)));
    assert!(body.contains("Unlike"));

    let response = bob.post(app.url("/articles/1/like")).send().await.unwrap();
    let body = response.text().await.unwrap();
    assert!(body.contains(&likes_marker(0)));
    assert!(!body.contains("Unlike"));
}

#[tokio::test]
async fn owner_cannot_like_own_article() {
    let app = spawn_app().await;
    let alice = user_client(&app, "alice").await;
    create_article(&alice, &app, article_form("Reef", "fish")).await;

    let response = alice.post(app.url("/articles/1/like")).send().await.unwrap();
    assert_eq!(response.url().path(), "/unauthorised");
    let (_, body) = page(&alice, &app, "/articles/1").await;
    assert!(body.contains(&likes_marker(0)));
}

#[tokio::test]
async fn editing_clears_likes() {
    let app = spawn_app().await;
    let alice = user_client(&app, "alice").await;
    let bob = user_client(&app, "bob").await;
    create_article(&alice, &app, article_form("Meadow", "flowers")).await;
    bob.post(app.url("/articles/1/like")).send().await.unwrap();
    let (_, body) = page(&bob, &app, "/articles/1").await;
    assert!(body.contains(&likes_marker(1)));

    let response = alice
        .post(app.url("/articles/1/edit"))
        .multipart(article_form("Meadow in spring", "more flowers"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.url().path(), "/articles/1");
    let body = response.text().await.unwrap();
    assert!(body.contains("Meadow in spring"));
    assert!(body.contains(&likes_marker(0)));
}

#[tokio::test]
async fn only_owner_can_edit() {
    let app = spawn_app().await;
    let alice = user_client(&app, "alice").await;
    let bob = user_client(&app, "bob").await;
    create_article(&alice, &app, article_form("Lagoon", "blue")).await;

    let response = bob.get(app.url("/articles/1/edit")).send().await.unwrap();
    assert_eq!(response.url().path(), "/unauthorised");

    let response = bob
        .post(app.url("/articles/1/edit"))
        .multipart(article_form("Hijacked", "mine"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.url().path(), "/unauthorised");
    let (_, body) = page(&alice, &app, "/articles/1").await;
    assert!(body.contains("Lagoon"));
    assert!(!body.contains("Hijacked"));
}

#[tokio::test]
async fn invalid_article_form_is_rerendered() {
    let app = spawn_app().await;
    let alice = user_client(&app, "alice").await;
    let response = create_article(&alice, &app, article_form("", "no title")).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = response.text().await.unwrap();
    assert!(body.contains("Title is required."));
    assert!(body.contains("no title"));

    let (_, body) = page(&client(), &app, "/articles").await;
    assert!(!body.contains("no title"));
}

#[tokio::test]
async fn non_owner_cannot_delete() {
    let app = spawn_app().await;
    let alice = user_client(&app, "alice").await;
    let bob = user_client(&app, "bob").await;
    create_article(&alice, &app, article_form("Tundra", "cold")).await;

    let response = bob.get(app.url("/articles/1/delete")).send().await.unwrap();
    assert_eq!(response.url().path(), "/unauthorised");
    let response = bob
        .post(app.url("/articles/1/delete"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.url().path(), "/unauthorised");

    let (_, body) = page(&client(), &app, "/articles").await;
    assert!(body.contains("Tundra"));
}

#[tokio::test]
async fn owner_deletes_article_and_its_image() {
    let app = spawn_app().await;
    let alice = user_client(&app, "alice").await;
    create_article(
        &alice,
        &app,
        with_image(article_form("Savanna", "wide"), "savanna.png", PNG),
    )
    .await;
    assert_eq!(app.stored_images().len(), 1);

    let (status, body) = page(&alice, &app, "/articles/1/delete").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Savanna"));

    let response = alice
        .post(app.url("/articles/1/delete"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.url().path(), "/articles");
    assert!(!response.text().await.unwrap().contains("Savanna"));
    assert!(app.stored_images().is_empty());
    let (status, _) = page(&alice, &app, "/articles/1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn replacing_image_removes_the_old_file() {
    let app = spawn_app().await;
    let alice = user_client(&app, "alice").await;
    create_article(
        &alice,
        &app,
        with_image(article_form("Fjord", "steep"), "fjord.png", PNG),
    )
    .await;
    let original = app.stored_images();
    assert_eq!(original.len(), 1);
    let (status, _) = page(&alice, &app, &format!("/media/articles/{}", original[0])).await;
    assert_eq!(status, StatusCode::OK);

    // saving without a new upload keeps the stored image
    alice
        .post(app.url("/articles/1/edit"))
        .multipart(article_form("Fjord", "steeper"))
        .send()
        .await
        .unwrap();
    assert_eq!(app.stored_images(), original);

    alice
        .post(app.url("/articles/1/edit"))
        .multipart(with_image(article_form("Fjord", "steepest"), "new.png", OTHER_PNG))
        .send()
        .await
        .unwrap();
    let replaced = app.stored_images();
    assert_eq!(replaced.len(), 1);
    assert_ne!(replaced, original);
    let stored = std::fs::read(app.media_root.join("articles").join(&replaced[0])).unwrap();
    assert_eq!(stored, OTHER_PNG);
}

#[tokio::test]
async fn comments_appear_on_details() {
    let app = spawn_app().await;
    let alice = user_client(&app, "alice").await;
    let bob = user_client(&app, "bob").await;
    create_article(&alice, &app, article_form("Jungle", "humid")).await;

    let response = bob
        .post(app.url("/articles/1"))
        .form(&[("text", "Bring a machete")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.url().path(), "/articles/1");
    let body = response.text().await.unwrap();
    assert!(body.contains("Bring a machete"));

    let (_, body) = page(&alice, &app, "/articles/1").await;
    assert!(body.contains("Bring a machete"));
    assert!(body.contains("bob"));
}

#[tokio::test]
async fn blank_comment_is_rejected() {
    let app = spawn_app().await;
    let alice = user_client(&app, "alice").await;
    let bob = user_client(&app, "bob").await;
    create_article(&alice, &app, article_form("Marsh", "muddy")).await;

    let response = bob
        .post(app.url("/articles/1"))
        .form(&[("text", "   ")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response
        .text()
        .await
        .unwrap()
        .contains("Comment text is required."));
}

#[tokio::test]
async fn owner_cannot_comment_on_own_article() {
    let app = spawn_app().await;
    let alice = user_client(&app, "alice").await;
    create_article(&alice, &app, article_form("Prairie", "flat")).await;

    let response = alice
        .post(app.url("/articles/1"))
        .form(&[("text", "Talking to myself")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.url().path(), "/unauthorised");
    let (_, body) = page(&alice, &app, "/articles/1").await;
    assert!(!body.contains("Talking to myself"));
}
