use axum::{
    Router,
    body::{self, Body},
    http::{Method, Request, StatusCode, header},
    response::Response,
};
use serde_json::{Value, json};
use tower::ServiceExt;

use todo_app::{
    routes::API_PREFIX,
    test_helpers::{test_app, test_config},
};

/// Minimal cookie store: keeps the latest value per name, drops cleared ones.
#[derive(Default)]
struct Browser {
    cookies: Vec<(String, String)>,
}

impl Browser {
    fn absorb(&mut self, response: &Response) {
        for value in response.headers().get_all(header::SET_COOKIE) {
            let raw = value.to_str().expect("cookie header");
            let pair = raw.split(';').next().expect("cookie pair");
            let (name, value) = pair.split_once('=').expect("name=value");
            self.cookies.retain(|(existing, _)| existing != name);
            if !raw.contains("Max-Age=0") {
                self.cookies.push((name.to_string(), value.to_string()));
            }
        }
    }

    fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.as_str())
    }

    fn header(&self) -> String {
        self.cookies
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ")
    }

    async fn get(&mut self, app: &Router, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .uri(path)
            .header(header::COOKIE, self.header())
            .body(Body::empty())
            .expect("build request");
        self.send(app, request).await
    }

    async fn post_form(&mut self, app: &Router, path: &str, form: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method(Method::POST)
            .uri(path)
            .header(header::COOKIE, self.header())
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .expect("build request");
        self.send(app, request).await
    }

    async fn send(&mut self, app: &Router, request: Request<Body>) -> (StatusCode, String) {
        let response = app.clone().oneshot(request).await.expect("call router");
        self.absorb(&response);
        let status = response.status();
        let bytes = body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }
}

async fn api_call(
    app: &Router,
    method: Method,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> StatusCode {
    let mut request = Request::builder()
        .method(method)
        .uri(format!("{API_PREFIX}{path}"));
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .expect("build request");
    app.clone()
        .oneshot(request)
        .await
        .expect("call router")
        .status()
}

async fn todo_ids(app: &Router, token: &str) -> Vec<String> {
    let request = Request::builder()
        .uri(format!("{API_PREFIX}/todos"))
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .expect("build request");
    let response = app.clone().oneshot(request).await.expect("call router");
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let json: Value = serde_json::from_slice(&bytes).expect("json body");
    json["data"]
        .as_array()
        .expect("list")
        .iter()
        .filter_map(|item| item["id"].as_str().map(str::to_string))
        .collect()
}

#[tokio::test]
async fn signed_out_visitors_get_the_auth_page() {
    let (app, _, _) = test_app(test_config(&[])).await;
    let mut browser = Browser::default();

    let (status, page) = browser.get(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(page.contains("action=\"/sign-in\""));
    assert!(page.contains("Password must contain at least 8 characters"));
}

#[tokio::test]
async fn list_add_and_delete_through_the_browser() {
    let (app, _, _) = test_app(test_config(&[])).await;
    let mut browser = Browser::default();

    let (status, _) = browser
        .post_form(
            &app,
            "/sign-up",
            "email=alice%40example.com&password=Password1&phone_number=",
        )
        .await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert!(browser.cookie("todo_access").is_some());
    assert!(browser.cookie("todo_refresh").is_some());

    let (_, page) = browser.get(&app, "/").await;
    assert!(page.contains("alice@example.com"));
    assert!(page.contains("s Todos</h1>"));
    assert!(page.contains("Nothing to do yet."));

    browser
        .post_form(&app, "/todos", "content=++Buy+milk+")
        .await;
    browser.post_form(&app, "/todos", "content=+++").await;
    let (_, page) = browser.get(&app, "/").await;
    assert!(page.contains("<span>Buy milk</span>"));

    let token = browser.cookie("todo_access").expect("access cookie").to_string();
    let ids = todo_ids(&app, &token).await;
    assert_eq!(ids.len(), 1);

    let (status, _) = browser
        .post_form(&app, &format!("/todos/{}/delete", ids[0]), "")
        .await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    let (_, page) = browser.get(&app, "/").await;
    assert!(!page.contains("Buy milk"));

    browser.post_form(&app, "/sign-out", "").await;
    assert!(browser.cookie("todo_access").is_none());
    let (_, page) = browser.get(&app, "/").await;
    assert!(page.contains("action=\"/sign-in\""));
}

#[tokio::test]
async fn expired_access_cookie_is_renewed_from_the_refresh_cookie() {
    let (app, _, _) = test_app(test_config(&[])).await;
    let mut browser = Browser::default();
    browser
        .post_form(&app, "/sign-up", "email=bob%40example.com&password=Password1")
        .await;
    let refresh = browser.cookie("todo_refresh").expect("refresh").to_string();

    browser.cookies.retain(|(name, _)| name != "todo_access");
    let (status, page) = browser.get(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(page.contains("bob@example.com"));
    assert!(browser.cookie("todo_access").is_some());
    assert_ne!(browser.cookie("todo_refresh"), Some(refresh.as_str()));
}

#[tokio::test]
async fn sign_out_with_only_the_refresh_cookie_revokes_it() {
    let (app, _, _) = test_app(test_config(&[])).await;
    let mut browser = Browser::default();
    browser
        .post_form(&app, "/sign-up", "email=carl%40example.com&password=Password1")
        .await;
    let refresh = browser.cookie("todo_refresh").expect("refresh").to_string();

    // the access cookie has lapsed in the browser
    browser.cookies.retain(|(name, _)| name != "todo_access");
    let (status, _) = browser.post_form(&app, "/sign-out", "").await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert!(browser.cookies.is_empty());

    let status = api_call(
        &app,
        Method::POST,
        "/auth/refresh",
        None,
        Some(json!({ "refresh_token": refresh })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let mut stale = Browser::default();
    stale.cookies.push(("todo_refresh".to_string(), refresh));
    let (_, page) = stale.get(&app, "/").await;
    assert!(page.contains("action=\"/sign-in\""));
}

#[tokio::test]
async fn completed_items_show_a_done_marker() {
    let (app, _, _) = test_app(test_config(&[])).await;
    let mut browser = Browser::default();
    browser
        .post_form(&app, "/sign-up", "email=eve%40example.com&password=Password1")
        .await;
    browser.post_form(&app, "/todos", "content=Walk+dog").await;
    browser.post_form(&app, "/todos", "content=Feed+cat").await;

    let (_, page) = browser.get(&app, "/").await;
    assert!(!page.contains("class=\"done\""));

    let token = browser.cookie("todo_access").expect("access cookie").to_string();
    let ids = todo_ids(&app, &token).await;
    assert_eq!(ids.len(), 2);
    let status = api_call(
        &app,
        Method::PATCH,
        &format!("/todos/{}", ids[0]),
        Some(&token),
        Some(json!({ "is_done": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, page) = browser.get(&app, "/").await;
    assert_eq!(page.matches("class=\"done\"").count(), 1);
    let walk = page.find("Walk dog").expect("first item");
    let feed = page.find("Feed cat").expect("second item");
    let done = page.find("class=\"done\"").expect("marker");
    assert!(walk < done && done < feed);
}

#[tokio::test]
async fn sms_step_runs_through_the_browser() {
    let (app, _, sms) = test_app(test_config(&[])).await;
    let mut browser = Browser::default();

    browser
        .post_form(
            &app,
            "/sign-up",
            "email=dana%40example.com&password=Password1&phone_number=%2B15555550100",
        )
        .await;
    assert!(browser.cookie("todo_mfa").is_some());
    assert!(browser.cookie("todo_access").is_none());

    let (_, page) = browser.get(&app, "/").await;
    assert!(page.contains("action=\"/mfa\""));

    let (status, page) = browser.post_form(&app, "/mfa", "code=99999999").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(page.contains("Invalid verification code"));

    let code = sms.last_code().expect("code sent");
    let (status, _) = browser
        .post_form(&app, "/mfa", &format!("code={code}"))
        .await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert!(browser.cookie("todo_mfa").is_none());

    let (_, page) = browser.get(&app, "/").await;
    assert!(page.contains("dana@example.com"));
}

#[tokio::test]
async fn bad_credentials_rerender_the_auth_page() {
    let (app, _, _) = test_app(test_config(&[])).await;
    let mut browser = Browser::default();

    let (status, page) = browser
        .post_form(&app, "/sign-in", "email=nobody%40example.com&password=Password1")
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(page.contains("Invalid credentials"));
    assert!(browser.cookies.is_empty());
}
