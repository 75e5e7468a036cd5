use actix_web::{http::header, http::StatusCode, test, web, App};
use onestop_server::{configure, AppState, Settings};
use serde_json::{json, Value};

async fn test_state() -> web::Data<AppState> {
    let mut config = Settings::new_for_test().expect("Failed to load test config");
    config.seed.enabled = false;
    web::Data::new(AppState::new(config).await.expect("Failed to build state"))
}

#[actix_web::test]
async fn test_signup_login_and_me() {
    let state = test_state().await;
    let app = test::init_service(App::new().app_data(state.clone()).configure(configure)).await;

    let signup_response = test::TestRequest::post()
        .uri("/signup")
        .set_json(json!({
            "email": "bob@x.com",
            "password": "pw123",
            "full_name": "Bob"
        }))
        .send_request(&app)
        .await;
    assert_eq!(signup_response.status(), StatusCode::CREATED);
    let signup_body: Value = test::read_body_json(signup_response).await;
    assert_eq!(signup_body["message"], "Account created successfully! Please sign in.");

    let login_response = test::TestRequest::post()
        .uri("/token")
        .set_form([("username", "bob@x.com"), ("password", "pw123")])
        .send_request(&app)
        .await;
    assert_eq!(login_response.status(), StatusCode::OK);
    let login_body: Value = test::read_body_json(login_response).await;
    assert_eq!(login_body["token_type"], "bearer");
    assert_eq!(login_body["expires_in"], 30 * 60);
    let token = login_body["access_token"].as_str().unwrap().to_string();

    let me_response = test::TestRequest::get()
        .uri("/users/me")
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
        .send_request(&app)
        .await;
    assert_eq!(me_response.status(), StatusCode::OK);
    let me_body: Value = test::read_body_json(me_response).await;
    assert_eq!(
        me_body,
        json!({ "username": "Bob", "email": "bob@x.com", "disabled": false })
    );
}

#[actix_web::test]
async fn test_signup_accepts_camel_case_name() {
    let state = test_state().await;
    let app = test::init_service(App::new().app_data(state.clone()).configure(configure)).await;

    let response = test::TestRequest::post()
        .uri("/signup")
        .set_json(json!({
            "email": "carol@x.com",
            "password": "pw123",
            "fullName": "Carol"
        }))
        .send_request(&app)
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let user = state.users.lookup("carol@x.com").await.unwrap();
    assert_eq!(user.display_name, "Carol");
}

#[actix_web::test]
async fn test_duplicate_signup() {
    let state = test_state().await;
    let app = test::init_service(App::new().app_data(state.clone()).configure(configure)).await;

    let first = test::TestRequest::post()
        .uri("/signup")
        .set_json(json!({ "email": "a@x.com", "password": "first", "full_name": "A" }))
        .send_request(&app)
        .await;
    assert_eq!(first.status(), StatusCode::CREATED);
    let first_hash = state.users.lookup("a@x.com").await.unwrap().password_hash;

    let second = test::TestRequest::post()
        .uri("/signup")
        .set_json(json!({ "email": "a@x.com", "password": "second", "full_name": "A2" }))
        .send_request(&app)
        .await;
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(second).await;
    assert_eq!(body["detail"], "Email already registered");
    assert_eq!(body["error"]["status"], 400);

    let kept = state.users.lookup("a@x.com").await.unwrap();
    assert_eq!(kept.password_hash, first_hash);
    assert_eq!(kept.display_name, "A");
}

#[actix_web::test]
async fn test_invalid_registration() {
    let state = test_state().await;
    let app = test::init_service(App::new().app_data(state.clone()).configure(configure)).await;

    let response = test::TestRequest::post()
        .uri("/signup")
        .set_json(json!({ "email": "test@example.com", "password": "", "full_name": "Test" }))
        .send_request(&app)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(state.users.is_empty().await);
}

#[actix_web::test]
async fn test_invalid_login() {
    let state = test_state().await;
    let app = test::init_service(App::new().app_data(state.clone()).configure(configure)).await;

    state.auth_service.register("bob@x.com", "pw123", "Bob").await.unwrap();

    for (username, password) in [("bob@x.com", "wrong"), ("nonexistent@example.com", "pw123")] {
        let response = test::TestRequest::post()
            .uri("/token")
            .set_form([("username", username), ("password", password)])
            .send_request(&app)
            .await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers().get(header::WWW_AUTHENTICATE).unwrap(), "Bearer");
        let body: Value = test::read_body_json(response).await;
        assert_eq!(body["detail"], "Incorrect email or password");
    }
}

#[actix_web::test]
async fn test_login_ignores_extra_oauth_fields() {
    let state = test_state().await;
    let app = test::init_service(App::new().app_data(state.clone()).configure(configure)).await;

    state.auth_service.register("bob@x.com", "pw123", "Bob").await.unwrap();

    let response = test::TestRequest::post()
        .uri("/token")
        .set_form([
            ("grant_type", "password"),
            ("username", "bob@x.com"),
            ("password", "pw123"),
            ("scope", ""),
        ])
        .send_request(&app)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

fn multipart_body(boundary: &str, fields: &[(&str, &str)]) -> String {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
            boundary, name, value
        ));
    }
    body.push_str(&format!("--{}--\r\n", boundary));
    body
}

#[actix_web::test]
async fn test_login_with_multipart_form() {
    let state = test_state().await;
    let app = test::init_service(App::new().app_data(state.clone()).configure(configure)).await;

    state.auth_service.register("bob@x.com", "pw123", "Bob").await.unwrap();

    let boundary = "----onestopFormBoundary7MA4YWxk";
    let login = |password: &str| {
        test::TestRequest::post()
            .uri("/token")
            .insert_header((
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", boundary),
            ))
            .set_payload(multipart_body(
                boundary,
                &[("username", "bob@x.com"), ("password", password)],
            ))
    };

    let response = login("pw123").send_request(&app).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["token_type"], "bearer");
    let token = body["access_token"].as_str().unwrap();
    assert_eq!(state.auth_service.resolve(token).await.unwrap().email, "bob@x.com");

    let response = login("wrong").send_request(&app).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers().get(header::WWW_AUTHENTICATE).unwrap(), "Bearer");
}

#[actix_web::test]
async fn test_me_requires_valid_token() {
    let state = test_state().await;
    let app = test::init_service(App::new().app_data(state.clone()).configure(configure)).await;

    let missing = test::TestRequest::get().uri("/users/me").send_request(&app).await;
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(missing.headers().get(header::WWW_AUTHENTICATE).unwrap(), "Bearer");
    let body: Value = test::read_body_json(missing).await;
    assert_eq!(body["detail"], "Not authenticated");

    let invalid = test::TestRequest::get()
        .uri("/users/me")
        .insert_header((header::AUTHORIZATION, "Bearer invalid_token"))
        .send_request(&app)
        .await;
    assert_eq!(invalid.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(invalid.headers().get(header::WWW_AUTHENTICATE).unwrap(), "Bearer");
    let body: Value = test::read_body_json(invalid).await;
    assert_eq!(body["detail"], "Could not validate credentials");
}

#[actix_web::test]
async fn test_token_for_unregistered_subject_is_rejected() {
    let state = test_state().await;
    let app = test::init_service(App::new().app_data(state.clone()).configure(configure)).await;

    let issuer = onestop_server::TokenIssuer::from_config(&state.config.auth).unwrap();
    let token = issuer.issue("ghost@x.com", chrono::Duration::minutes(5)).unwrap();

    let response = test::TestRequest::get()
        .uri("/users/me")
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
        .send_request(&app)
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["detail"], "Could not validate credentials");
}
