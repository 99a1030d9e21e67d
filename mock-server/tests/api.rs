use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, luke_skywalker, PeoplePage, Person, TOKEN};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

// --- list ---

#[tokio::test]
async fn list_people_has_seeded_person() {
    let resp = app().oneshot(get("/api/people/")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let page: PeoplePage = body_json(resp).await;
    assert_eq!(page.count, 1);
    assert_eq!(page.results[0].name, "Luke Skywalker");
}

#[tokio::test]
async fn list_people_filters_by_search() {
    let resp = app().oneshot(get("/api/people/?search=vader")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let page: PeoplePage = body_json(resp).await;
    assert_eq!(page.count, 0);
    assert!(page.results.is_empty());
}

// --- get ---

#[tokio::test]
async fn get_person_returns_luke() {
    let resp = app().oneshot(get("/api/people/1")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let person: Person = body_json(resp).await;
    assert_eq!(person, luke_skywalker());
}

#[tokio::test]
async fn get_person_not_found() {
    let resp = app().oneshot(get("/api/people/999")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["detail"], "Not found");
}

// --- create ---

#[tokio::test]
async fn create_person_returns_201() {
    let resp = app()
        .oneshot(json_request("POST", "/api/people/", r#"{"name":"Leia Organa"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let person: Person = body_json(resp).await;
    assert_eq!(person.name, "Leia Organa");
    assert!(person.url.starts_with("/api/people/"));
}

#[tokio::test]
async fn create_person_malformed_json_returns_422() {
    let resp = app()
        .oneshot(json_request("POST", "/api/people/", r#"{"not_name":1}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// --- update ---

#[tokio::test]
async fn patch_person_not_found() {
    let resp = app()
        .oneshot(json_request("PATCH", "/api/people/999", r#"{"mass":"1"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- auth / broken ---

#[tokio::test]
async fn me_requires_bearer_token() {
    let resp = app().oneshot(get("/api/me")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(&body_bytes(resp).await[..], b"Unauthorized");

    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/api/me")
                .header(http::header::AUTHORIZATION, format!("Bearer {TOKEN}"))
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn broken_returns_non_json_body() {
    let resp = app().oneshot(get("/api/broken")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_bytes(resp).await;
    assert!(serde_json::from_slice::<serde_json::Value>(&body).is_err());
}

// --- full lifecycle ---

#[tokio::test]
async fn people_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    // create
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/api/people/",
            r#"{"name":"Han Solo","height":"180"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Person = body_json(resp).await;
    let path = created.url.clone();

    // replace
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("PUT", &path, r#"{"name":"Han Solo","mass":"80"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let replaced: Person = body_json(resp).await;
    assert_eq!(replaced.mass, "80");
    assert_eq!(replaced.height, ""); // replaced, not merged

    // patch
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("PATCH", &path, r#"{"height":"180"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let patched: Person = body_json(resp).await;
    assert_eq!(patched.height, "180");
    assert_eq!(patched.mass, "80"); // unchanged

    // list — Han and Luke
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/api/people/"))
        .await
        .unwrap();
    let page: PeoplePage = body_json(resp).await;
    assert_eq!(page.count, 2);

    // delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(
            Request::builder()
                .method("DELETE")
                .uri(&path)
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());

    // get after delete — 404
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get(&path))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
