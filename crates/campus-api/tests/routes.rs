use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use campus_api::auth::create_token;
use campus_api::state::{AppState, AppStateInner};
use campus_db::Database;
use campus_db::models::NewUser;
use campus_types::models::Role;

const SECRET: &str = "integration-test-secret";

struct TestApp {
    state: AppState,
}

impl TestApp {
    fn new() -> Self {
        Self::with_fixture(None)
    }

    fn with_fixture(fixture_path: Option<PathBuf>) -> Self {
        let state = Arc::new(AppStateInner {
            db: Database::open_in_memory().unwrap(),
            jwt_secret: SECRET.to_string(),
            token_ttl_days: 1,
            fixture_path,
        });
        Self { state }
    }

    fn db(&self) -> &Database {
        &self.state.db
    }

    fn router(&self) -> Router {
        campus_api::router(self.state.clone())
    }

    /// Insert an account directly and hand back its id and a bearer token.
    fn user(&self, username: &str, role: Role, college: &str) -> (i64, String) {
        let id = self
            .db()
            .create_user(&NewUser {
                username,
                email: &format!("{}@campus.test", username),
                password_hash: "unused",
                role,
                college,
            })
            .unwrap();
        let token = create_token(SECRET, id, username, 1).unwrap();
        (id, token)
    }

    async fn send(&self, req: Request<Body>) -> (StatusCode, Value, axum::http::HeaderMap) {
        let res = self.router().oneshot(req).await.unwrap();
        let status = res.status();
        let headers = res.headers().clone();
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body, headers)
    }

    async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        let req = Request::builder()
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();
        let (status, body, _) = self.send(req).await;
        (status, body)
    }

    async fn post(&self, uri: &str, token: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token));
        let req = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let (status, body, _) = self.send(req).await;
        (status, body)
    }

    async fn post_public(
        &self,
        uri: &str,
        body: Value,
    ) -> (StatusCode, Value, axum::http::HeaderMap) {
        let req = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(req).await
    }
}

#[tokio::test]
async fn health_is_public_and_home_redirects_to_explore() {
    let app = TestApp::new();

    let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body, _) = app.send(req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let req = Request::builder().uri("/").body(Body::empty()).unwrap();
    let (status, _, headers) = app.send(req).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(headers[header::LOCATION], "/explore");

    let req = Request::builder().uri("/explore").body(Body::empty()).unwrap();
    let (status, body, _) = app.send(req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn protected_routes_reject_missing_and_forged_tokens() {
    let app = TestApp::new();

    let req = Request::builder().uri("/dashboard").body(Body::empty()).unwrap();
    let (status, body, _) = app.send(req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");

    let forged = create_token("some-other-secret", 1, "nobody", 1).unwrap();
    let (status, _) = app.get("/inbox", &forged).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Valid signature, but the account does not exist.
    let orphan = create_token(SECRET, 999, "ghost", 1).unwrap();
    let (status, _) = app.get("/dashboard", &orphan).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn register_validates_rejects_duplicates_and_logs_in() {
    let app = TestApp::new();

    let (status, body, _) = app
        .post_public(
            "/register",
            json!({
                "username": "amira",
                "email": "amira@uni.edu",
                "password": "longenough",
                "password_confirm": "different",
                "role": "Professor",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
    assert!(body["fields"]["password_confirm"].is_array());
    assert!(body["fields"]["role"].is_array());
    assert!(app.db().get_user_by_username("amira").unwrap().is_none());

    let good = json!({
        "username": "amira",
        "email": "amira@uni.edu",
        "password": "longenough",
        "password_confirm": "longenough",
        "role": "Senior",
        "college": "Engineering",
    });
    let (status, body, headers) = app.post_public("/register", good.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["username"], "amira");
    assert_eq!(body["user"]["role"], "Senior");
    assert_eq!(body["user"]["avatar"], "avatars/default.png");
    let cookie = headers[header::SET_COOKIE].to_str().unwrap().to_string();
    assert!(cookie.starts_with("campus_session="));

    let (status, body, _) = app.post_public("/register", good).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["username"].is_array());

    let (status, _, _) = app
        .post_public("/login", json!({ "username": "amira", "password": "wrong-password" }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body, _) = app
        .post_public("/login", json!({ "username": "amira", "password": "longenough" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();

    // The session cookie alone authenticates too.
    let session = cookie.split(';').next().unwrap().to_string();
    let req = Request::builder()
        .uri("/dashboard")
        .header(header::COOKIE, session)
        .body(Body::empty())
        .unwrap();
    let (status, body, _) = app.send(req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "amira@uni.edu");

    let (status, _) = app.get("/dashboard", &token).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_registrations_of_one_name_yield_one_account() {
    let app = TestApp::new();
    let body = json!({
        "username": "dup",
        "email": "dup@uni.edu",
        "password": "longenough",
        "password_confirm": "longenough",
        "role": "Junior",
    });

    let (first, second) = tokio::join!(
        app.post_public("/register", body.clone()),
        app.post_public("/register", body.clone()),
    );
    let mut statuses = [first.0, second.0];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::CREATED, StatusCode::BAD_REQUEST]);

    let loser = if first.0 == StatusCode::BAD_REQUEST { &first.1 } else { &second.1 };
    assert_eq!(loser["error"], "validation_error");
    assert!(loser["fields"]["username"].is_array());
    assert_eq!(app.db().search_users("dup").unwrap().len(), 1);
}

#[tokio::test]
async fn missing_or_mistyped_body_fields_are_400s() {
    let app = TestApp::new();
    let (_, token) = app.user("med", Role::Junior, "Medicine");

    let (status, body) = app.post("/post", &token, Some(json!({ "title": "only a title" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["fields"]["body"][0], "This field is required.");
    assert!(body["fields"].get("title").is_none());

    let (status, body, _) = app.post_public("/register", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["username"].is_array());
    assert!(body["fields"]["role"].is_array());

    let (status, body) = app.post("/post", &token, Some(json!({ "title": 7, "body": "x" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");

    let req = Request::builder()
        .method("POST")
        .uri("/chat/med")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body, _) = app.send(req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn query_list_is_college_scoped_unless_all_is_requested() {
    let app = TestApp::new();
    let (_, med) = app.user("med", Role::Junior, "Medicine");
    let (_, law) = app.user("law", Role::Junior, "Law");

    let (status, _) = app
        .post("/post", &med, Some(json!({ "title": "Anatomy", "body": "Bones?" })))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    app.post("/post", &law, Some(json!({ "title": "Torts", "body": "Duty of care" })))
        .await;

    let (_, body) = app.get("/queries", &med).await;
    assert_eq!(body["showing_all"], false);
    let titles: Vec<&str> = body["queries"]
        .as_array()
        .unwrap()
        .iter()
        .map(|q| q["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Anatomy"]);

    let (_, body) = app.get("/queries?all=1", &med).await;
    assert_eq!(body["showing_all"], true);
    assert_eq!(body["queries"].as_array().unwrap().len(), 2);
    // Newest first.
    assert_eq!(body["queries"][0]["title"], "Torts");

    let (_, body) = app.get("/my-queries", &law).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["is_mine"], true);
}

#[tokio::test]
async fn blank_query_title_is_a_field_error() {
    let app = TestApp::new();
    let (_, token) = app.user("med", Role::Junior, "Medicine");

    let (status, body) = app
        .post("/post", &token, Some(json!({ "title": "   ", "body": "text" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["title"].is_array());
}

#[tokio::test]
async fn juniors_cannot_answer_and_nothing_is_recorded() {
    let app = TestApp::new();
    let (author_id, author) = app.user("asker", Role::Junior, "Medicine");
    let (_, junior) = app.user("junior", Role::Junior, "Medicine");

    let (_, query) = app
        .post("/post", &author, Some(json!({ "title": "Pharma", "body": "Dosage?" })))
        .await;
    let query_id = query["id"].as_i64().unwrap();

    let (_, detail) = app.get(&format!("/query/{}", query_id), &junior).await;
    assert_eq!(detail["can_answer"], false);

    let (status, body) = app
        .post(&format!("/query/{}/answer", query_id), &junior, Some(json!({ "body": "Guess" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");

    assert!(app.db().list_answers_for_query(query_id).unwrap().is_empty());
    assert_eq!(app.db().unread_count(author_id).unwrap(), 0);

    let (status, _) = app
        .post("/query/4242/answer", &junior, Some(json!({ "body": "x" })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn answering_notifies_the_author_but_not_oneself() {
    let app = TestApp::new();
    let (asker_id, asker) = app.user("asker", Role::Junior, "Medicine");
    let (doctor_id, doctor) = app.user("drsalma", Role::Doctor, "Medicine");

    let (_, query) = app
        .post("/post", &asker, Some(json!({ "title": "Organic chem", "body": "Help" })))
        .await;
    let query_id = query["id"].as_i64().unwrap();

    // Both answer routes share one path.
    let (status, answer) = app
        .post(&format!("/query/{}", query_id), &doctor, Some(json!({ "body": "Read chapter 4" })))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(answer["author"]["username"], "drsalma");

    let (_, notes) = app.get("/notifications", &asker).await;
    assert_eq!(notes["notifications"].as_array().unwrap().len(), 1);
    assert_eq!(notes["notifications"][0]["kind"], "answer");
    assert_eq!(
        notes["notifications"][0]["message"],
        "drsalma answered your query: Organic chem"
    );
    assert_eq!(notes["notifications"][0]["sender"]["id"], doctor_id);

    let (_, own) = app
        .post("/post", &doctor, Some(json!({ "title": "Self study", "body": "Notes" })))
        .await;
    let own_id = own["id"].as_i64().unwrap();
    let (status, _) = app
        .post(&format!("/query/{}/answer", own_id), &doctor, Some(json!({ "body": "Me again" })))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(app.db().unread_count(doctor_id).unwrap(), 0);

    let (_, detail) = app.get(&format!("/query/{}", query_id), &asker).await;
    assert_eq!(detail["query"]["answer_count"], 1);
    assert_eq!(detail["answers"][0]["body"], "Read chapter 4");
    assert_eq!(app.db().unread_count(asker_id).unwrap(), 0);
}

#[tokio::test]
async fn only_authors_delete_queries_and_answers() {
    let app = TestApp::new();
    let (_, owner) = app.user("owner", Role::Junior, "Medicine");
    let (_, senior) = app.user("senior", Role::Senior, "Medicine");

    let (_, query) = app
        .post("/post", &owner, Some(json!({ "title": "Mine", "body": "x" })))
        .await;
    let query_id = query["id"].as_i64().unwrap();
    let (_, answer) = app
        .post(&format!("/query/{}/answer", query_id), &senior, Some(json!({ "body": "y" })))
        .await;
    let answer_id = answer["id"].as_i64().unwrap();

    let (status, _) = app.post(&format!("/query/{}/delete", query_id), &senior, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.post(&format!("/answer/{}/delete", answer_id), &owner, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(app.db().get_query(query_id).unwrap().is_some());

    let (status, _) = app.post(&format!("/answer/{}/delete", answer_id), &senior, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(app.db().get_answer(answer_id).unwrap().is_none());

    let (status, _) = app.post(&format!("/query/{}/delete", query_id), &owner, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.get(&format!("/query/{}", query_id), &owner).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn follow_toggles_and_notifies_only_on_follow() {
    let app = TestApp::new();
    let (_, alice) = app.user("alice", Role::Junior, "Law");
    let (bob_id, bob) = app.user("bob", Role::Senior, "Law");

    let uri = format!("/follow/{}", bob_id);
    let (status, body) = app.post(&uri, &alice, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["following"], true);
    assert_eq!(body["followers_count"], 1);

    let (_, body) = app.post(&uri, &alice, None).await;
    assert_eq!(body["following"], false);
    assert_eq!(body["followers_count"], 0);

    let (_, notes) = app.get("/notifications", &bob).await;
    let notes = notes["notifications"].as_array().unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0]["kind"], "follow");
    assert_eq!(notes[0]["message"], "alice started following you.");

    let (status, body) = app.post(&uri, &bob, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["user"].is_array());

    let (status, _) = app.post("/follow/9999", &alice, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    app.post(&uri, &alice, None).await;
    let (_, users) = app.get("/users", &alice).await;
    let users = users.as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["user"]["username"], "bob");
    assert_eq!(users[0]["is_following"], true);
}

#[tokio::test]
async fn inbox_lists_the_latest_message_per_partner() {
    let app = TestApp::new();
    let (_, ali) = app.user("ali", Role::Junior, "Law");
    let (_, bea) = app.user("bea", Role::Junior, "Law");
    let (_, cal) = app.user("cal", Role::Junior, "Law");

    app.post("/chat/bea", &ali, Some(json!({ "content": "hi bea" }))).await;
    app.post("/chat/ali", &bea, Some(json!({ "content": "hey ali" }))).await;
    let (status, sent) = app.post("/chat/ali", &cal, Some(json!({ "content": "yo" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(sent["is_mine"], true);

    let (_, inbox) = app.get("/inbox", &ali).await;
    let inbox = inbox.as_array().unwrap();
    assert_eq!(inbox.len(), 2);
    assert_eq!(inbox[0]["user"]["username"], "cal");
    assert_eq!(inbox[0]["last_message"], "yo");
    assert_eq!(inbox[1]["user"]["username"], "bea");
    assert_eq!(inbox[1]["last_message"], "hey ali");

    let (_, chat) = app.get("/chat/bea", &ali).await;
    let contents: Vec<&str> = chat["messages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["content"].as_str().unwrap())
        .collect();
    assert_eq!(contents, vec!["hi bea", "hey ali"]);
    assert_eq!(chat["messages"][0]["is_mine"], true);
    assert_eq!(chat["messages"][1]["is_mine"], false);

    let (_, unread) = app.get("/notifications/unread-count", &ali).await;
    assert_eq!(unread["unread"], 2);
}

#[tokio::test]
async fn messages_reject_self_blank_and_foreign_deletes() {
    let app = TestApp::new();
    let (_, ali) = app.user("ali", Role::Junior, "Law");
    let (_, bea) = app.user("bea", Role::Junior, "Law");

    let (status, body) = app.post("/chat/ali", &ali, Some(json!({ "content": "me" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["receiver"].is_array());

    let (status, _) = app.post("/chat/bea", &ali, Some(json!({ "content": "  " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, sent) = app.post("/chat/bea", &ali, Some(json!({ "content": "hello" }))).await;
    let uri = format!("/message/{}/delete", sent["id"].as_i64().unwrap());
    let (status, _) = app.post(&uri, &bea, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.post(&uri, &ali, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, inbox) = app.get("/inbox", &bea).await;
    assert_eq!(inbox, json!([]));
}

#[tokio::test]
async fn start_chat_redirects_to_chat_or_inbox() {
    let app = TestApp::new();
    let (_, ali) = app.user("ali", Role::Junior, "Law");
    app.user("bea", Role::Junior, "Law");

    let req = |uri: &str| {
        Request::builder()
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", ali))
            .body(Body::empty())
            .unwrap()
    };

    let (status, _, headers) = app.send(req("/start-chat/bea")).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(headers[header::LOCATION], "/chat/bea");

    let (_, _, headers) = app.send(req("/start-chat/ali")).await;
    assert_eq!(headers[header::LOCATION], "/inbox");

    let (status, _, _) = app.send(req("/start-chat/nobody")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn viewing_notifications_marks_them_read() {
    let app = TestApp::new();
    let (_, ali) = app.user("ali", Role::Junior, "Law");
    let (bea_id, bea) = app.user("bea", Role::Junior, "Law");

    app.post("/chat/bea", &ali, Some(json!({ "content": "one" }))).await;
    app.post("/chat/bea", &ali, Some(json!({ "content": "two" }))).await;
    assert_eq!(app.db().unread_count(bea_id).unwrap(), 2);

    let (_, first) = app.get("/notifications", &bea).await;
    assert_eq!(first["marked_read"], 2);
    assert_eq!(first["notifications"][0]["is_read"], false);
    assert_eq!(first["notifications"][0]["message"], "ali sent you a message.");

    let (_, second) = app.get("/notifications", &bea).await;
    assert_eq!(second["marked_read"], 0);
    assert_eq!(second["notifications"].as_array().unwrap().len(), 2);
    assert_eq!(second["notifications"][0]["is_read"], true);

    let (_, dash) = app.get("/dashboard", &bea).await;
    assert_eq!(dash["unread_notifications"], 0);
}

#[tokio::test]
async fn anonymous_queries_hide_their_author_from_others() {
    let app = TestApp::new();
    let (_, shy) = app.user("shy", Role::Junior, "Medicine");
    let (_, peer) = app.user("peer", Role::Junior, "Medicine");

    let (_, created) = app
        .post(
            "/post",
            &shy,
            Some(json!({ "title": "Embarrassing", "body": "?", "is_anonymous": true })),
        )
        .await;
    assert_eq!(created["display_author"], "Anonymous");
    assert!(created["author"].is_null());
    assert_eq!(created["is_mine"], true);

    let (_, list) = app.get("/queries", &peer).await;
    assert_eq!(list["queries"][0]["display_author"], "Anonymous");
    assert!(list["queries"][0]["author"].is_null());
    assert_eq!(list["queries"][0]["is_mine"], false);

    let (_, profile) = app.get("/profile/shy", &peer).await;
    assert_eq!(profile["queries"], json!([]));
    assert_eq!(profile["tab"], "queries");

    let (_, own) = app.get("/profile/shy?tab=answers", &shy).await;
    assert_eq!(own["queries"].as_array().unwrap().len(), 1);
    assert_eq!(own["tab"], "answers");
}

#[tokio::test]
async fn search_matches_queries_and_users() {
    let app = TestApp::new();
    let (_, nour) = app.user("nour", Role::Senior, "Pharmacy");
    app.user("omar", Role::Junior, "Pharmacy");

    app.post("/post", &nour, Some(json!({ "title": "Enzyme kinetics", "body": "Km?" })))
        .await;
    app.post("/post", &nour, Some(json!({ "title": "Lab safety", "body": "Goggles" })))
        .await;

    let (_, body) = app.get("/search?q=%20enzyme%20", &nour).await;
    assert_eq!(body["query"], "enzyme");
    assert_eq!(body["query_results"].as_array().unwrap().len(), 1);
    assert_eq!(body["user_results"], json!([]));

    let (_, body) = app.get("/search?q=oma", &nour).await;
    assert_eq!(body["user_results"][0]["username"], "omar");

    // Wildcards in the term are literal.
    let (_, body) = app.get("/search?q=%25", &nour).await;
    assert_eq!(body["query_results"], json!([]));
}

#[tokio::test]
async fn explore_posts_are_public_to_read_and_private_to_write() {
    let app = TestApp::new();
    let (_, writer) = app.user("writer", Role::Doctor, "Dentistry");

    let (status, post) = app
        .post("/explore/new", &writer, Some(json!({ "title": "Flossing", "body": "Daily." })))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(post["author"]["username"], "writer");

    let (status, _, _) = app
        .post_public("/explore/new", json!({ "title": "Spam", "body": "x" }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let req = Request::builder().uri("/explore").body(Body::empty()).unwrap();
    let (_, feed, _) = app.send(req).await;
    assert_eq!(feed.as_array().unwrap().len(), 1);
    assert_eq!(feed[0]["title"], "Flossing");
}

#[tokio::test]
async fn load_data_seeds_the_configured_fixture_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("seed.json");
    std::fs::write(
        &path,
        json!({
            "users": [{
                "username": "seeded",
                "email": "seeded@uni.edu",
                "password": "password123",
                "role": "Senior",
                "college": "Law",
            }],
            "queries": [{ "author": "seeded", "title": "Seeded query", "body": "b" }],
            "posts": [],
        })
        .to_string(),
    )
    .unwrap();

    let app = TestApp::with_fixture(Some(path));
    let (_, admin) = app.user("admin", Role::Doctor, "Law");

    for _ in 0..2 {
        let req = Request::builder()
            .uri("/load-data")
            .header(header::AUTHORIZATION, format!("Bearer {}", admin))
            .body(Body::empty())
            .unwrap();
        let (status, _, headers) = app.send(req).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(headers[header::LOCATION], "/");
    }

    assert!(app.db().get_user_by_username("seeded").unwrap().is_some());
    let (_, list) = app.get("/queries", &admin).await;
    assert_eq!(list["queries"].as_array().unwrap().len(), 1);

    let (status, _, _) = app
        .send(
            Request::builder()
                .uri("/migrate-now")
                .header(header::AUTHORIZATION, format!("Bearer {}", admin))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::SEE_OTHER);
}
