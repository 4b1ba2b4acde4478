//! Session-gated HTML pages and the signup/login/logout flow.

mod support;

use axum::http::StatusCode;
use axum::Router;
use country_catalog::model::NewCountry;
use country_catalog::store::MemoryCatalog;
use country_catalog::CountryRepository;
use rstest::{fixture, rstest};
use std::sync::Arc;
use support::*;

struct Site {
    store: Arc<MemoryCatalog>,
    router: Router,
}

#[fixture]
fn site() -> Site {
    let store = Arc::new(MemoryCatalog::new());
    Site {
        router: router_over(store.clone()),
        store,
    }
}

async fn sign_up(router: &Router, username: &str, password: &str) -> axum::http::Response<axum::body::Body> {
    let body = format!("username={}&email={}%40example.com&password={}", username, username, password);
    send(router, form_request("/signup", &body, None)).await
}

/// Sign up and log in; returns the session cookie.
async fn logged_in(router: &Router) -> String {
    sign_up(router, "ada", "lovelace").await;
    let resp = send(router, form_request("/login", "username=ada&password=lovelace", None)).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), Some("/"));
    session_cookie(&resp).expect("login sets a session cookie")
}

#[rstest]
#[case::list("GET", "/")]
#[case::new_form("GET", "/new_country")]
#[case::create("POST", "/new_country")]
#[case::detail("GET", "/countries/FR")]
#[case::edit_form("GET", "/countries/FR/edit")]
#[case::edit("POST", "/countries/FR/edit")]
#[case::delete("POST", "/countries/FR/delete")]
#[tokio::test]
async fn pages_redirect_to_login_without_session(
    site: Site,
    #[case] method: &str,
    #[case] uri: &str,
) {
    site.store
        .create(&NewCountry::new("France", "French Republic", "FR", 67))
        .await
        .unwrap();
    let req = match method {
        "POST" => form_request(
            uri,
            "name_common=Hacked&name_official=Hacked&cca2=HK&population=1",
            None,
        ),
        _ => get(uri),
    };
    let resp = send(&site.router, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), Some("/login"));

    let fr = site.store.get_by_code("FR").await.unwrap().unwrap();
    assert_eq!(fr.name_common, "France");
    assert!(site.store.get_by_code("HK").await.unwrap().is_none());
}

#[rstest]
#[tokio::test]
async fn login_then_list_page(site: Site) {
    let mut fr = NewCountry::new("France", "French Republic", "FR", 67);
    fr.region = "Europe".into();
    site.store.create(&fr).await.unwrap();

    let cookie = logged_in(&site.router).await;
    let resp = send(&site.router, get_with_cookie("/", &cookie)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;
    assert!(html.contains("France"));
    assert!(html.contains("Signed in as"));
    assert!(html.contains("<option value=\"Europe\""));
}

#[rstest]
#[tokio::test]
async fn wrong_password_and_unknown_user_look_the_same(site: Site) {
    sign_up(&site.router, "ada", "lovelace").await;
    let wrong = send(&site.router, form_request("/login", "username=ada&password=nope", None)).await;
    assert_eq!(wrong.status(), StatusCode::OK);
    let wrong = body_text(wrong).await;
    let unknown = send(&site.router, form_request("/login", "username=bob&password=nope", None)).await;
    let unknown = body_text(unknown).await;
    assert!(wrong.contains("Invalid credentials"));
    assert_eq!(wrong, unknown);
}

#[rstest]
#[tokio::test]
async fn signup_rejects_existing_username(site: Site) {
    let first = sign_up(&site.router, "ada", "lovelace").await;
    assert_eq!(first.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&first), Some("/login"));

    let again = sign_up(&site.router, "ada", "other").await;
    assert_eq!(again.status(), StatusCode::OK);
    assert!(body_text(again).await.contains("User already exists"));
}

#[rstest]
#[tokio::test]
async fn logout_ends_the_session(site: Site) {
    let cookie = logged_in(&site.router).await;
    let resp = send(&site.router, get_with_cookie("/logout", &cookie)).await;
    assert_eq!(location(&resp), Some("/login"));

    let resp = send(&site.router, get_with_cookie("/", &cookie)).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), Some("/login"));
}

#[rstest]
#[tokio::test]
async fn form_create_edit_delete(site: Site) {
    let cookie = logged_in(&site.router).await;

    let resp = send(
        &site.router,
        form_request(
            "/new_country",
            "name_common=Testland&name_official=Republic+of+Testland&cca2=TL&capital=Testville",
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let created = site.store.get_by_code("TL").await.unwrap().unwrap();
    assert_eq!(created.population, 0);
    assert_eq!(created.flag_url.as_deref(), Some("https://flagcdn.com/tl.svg"));

    let resp = send(
        &site.router,
        form_request(
            "/countries/TL/edit",
            "name_common=Testland&name_official=Republic+of+Testland&capital=&population=42",
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(location(&resp), Some("/countries/TL"));
    let edited = site.store.get_by_code("TL").await.unwrap().unwrap();
    assert_eq!(edited.population, 42);
    assert_eq!(edited.capital, None);

    let resp = send(&site.router, form_request("/countries/TL/delete", "", Some(&cookie))).await;
    assert_eq!(location(&resp), Some("/"));
    assert!(site.store.get_by_code("TL").await.unwrap().is_none());
}

#[rstest]
#[tokio::test]
async fn invalid_form_rerenders_with_error(site: Site) {
    let cookie = logged_in(&site.router).await;
    let resp = send(
        &site.router,
        form_request("/new_country", "name_common=X&name_official=X&cca2=X", Some(&cookie)),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_text(resp).await.contains("cca2 must be exactly 2 letters"));
}

#[rstest]
#[tokio::test]
async fn unknown_country_page_is_not_found(site: Site) {
    let cookie = logged_in(&site.router).await;
    let resp = send(&site.router, get_with_cookie("/countries/ZZ", &cookie)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let html = body_text(resp).await;
    assert!(html.contains("Signed in as"));
    assert!(!html.contains("Sign up"));

    let resp = send(&site.router, get_with_cookie("/countries/ZZ/edit", &cookie)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(body_text(resp).await.contains("Signed in as"));
}
