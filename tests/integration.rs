mod common;

use reqwest::StatusCode;
use serde_json::{json, Value};

use common::TestServer;

async fn create(server: &TestServer, body: Value) -> Value {
    let resp = server
        .client
        .post(server.url("/api/todos"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    resp.json().await.unwrap()
}

#[tokio::test]
async fn test_health() {
    let server = TestServer::new().await;

    let resp = server
        .client
        .get(server.url("/api/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_todo_crud() {
    let server = TestServer::new().await;

    // List todos (should be empty)
    let resp = server
        .client
        .get(server.url("/api/todos"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let todos: Vec<Value> = resp.json().await.unwrap();
    assert!(todos.is_empty());

    // Create a todo
    let todo = create(
        &server,
        json!({"title": "  Write tests  ", "category": "start-doing"}),
    )
    .await;
    assert_eq!(todo["title"], "Write tests");
    assert_eq!(todo["category"], "start-doing");
    assert_eq!(todo["completed"], false);
    assert!(todo["description"].is_null());
    assert_eq!(todo["createdAt"], todo["updatedAt"]);
    let todo_id = todo["id"].as_str().unwrap().to_string();

    // Get the todo
    let resp = server
        .client
        .get(server.url(&format!("/api/todos/{}", todo_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: Value = resp.json().await.unwrap();
    assert_eq!(fetched, todo);

    // Update title and category only
    let resp = server
        .client
        .put(server.url(&format!("/api/todos/{}", todo_id)))
        .json(&json!({"title": "Write more tests", "category": "keep-doing"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = resp.json().await.unwrap();
    assert_eq!(updated["title"], "Write more tests");
    assert_eq!(updated["category"], "keep-doing");
    assert_eq!(updated["completed"], false);
    assert_eq!(updated["id"], todo["id"]);
    assert_eq!(updated["createdAt"], todo["createdAt"]);
    assert_ne!(updated["updatedAt"], todo["updatedAt"]);

    // Mark todo as completed
    let resp = server
        .client
        .put(server.url(&format!("/api/todos/{}", todo_id)))
        .json(&json!({"completed": true}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let completed: Value = resp.json().await.unwrap();
    assert_eq!(completed["completed"], true);
    assert_eq!(completed["title"], "Write more tests");

    // Delete it
    let resp = server
        .client
        .delete(server.url(&format!("/api/todos/{}", todo_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = server
        .client
        .get(server.url(&format!("/api/todos/{}", todo_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = server
        .client
        .get(server.url("/api/todos"))
        .send()
        .await
        .unwrap();
    let todos: Vec<Value> = resp.json().await.unwrap();
    assert!(todos.is_empty());
}

#[tokio::test]
async fn test_list_is_newest_first() {
    let server = TestServer::new().await;

    for (i, (title, category)) in [
        ("first", "start-doing"),
        ("second", "keep-doing"),
        ("third", "do-differently"),
    ]
    .into_iter()
    .enumerate()
    {
        let todo = create(&server, json!({"title": title, "category": category})).await;
        server.shift_created_at(todo["id"].as_str().unwrap(), i as i64 * 1_000);
    }

    let resp = server
        .client
        .get(server.url("/api/todos"))
        .send()
        .await
        .unwrap();
    let todos: Vec<Value> = resp.json().await.unwrap();
    let titles: Vec<_> = todos.iter().map(|t| t["title"].as_str().unwrap()).collect();
    assert_eq!(titles, ["third", "second", "first"]);
}

#[tokio::test]
async fn test_todo_not_found() {
    let server = TestServer::new().await;

    let resp = server
        .client
        .get(server.url("/api/todos/9999"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Todo not found");

    // Existence is checked before the payload
    let resp = server
        .client
        .put(server.url("/api/todos/9999"))
        .json(&json!({"title": "   "}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = server
        .client
        .delete(server.url("/api/todos/9999"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_validation() {
    let server = TestServer::new().await;

    let cases = [
        (json!({"title": "   ", "category": "start-doing"}), "Title is required"),
        (json!({"category": "start-doing"}), "Title is required"),
        (json!({"title": "x"}), "Valid category is required"),
        (json!({"title": "x", "category": "invalid"}), "Valid category is required"),
        (json!({"title": "x", "category": "START_DOING"}), "Valid category is required"),
    ];

    for (body, message) in cases {
        let resp = server
            .client
            .post(server.url("/api/todos"))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{body}");
        let error: Value = resp.json().await.unwrap();
        assert_eq!(error["error"], message);
    }

    let resp = server
        .client
        .get(server.url("/api/todos"))
        .send()
        .await
        .unwrap();
    let todos: Vec<Value> = resp.json().await.unwrap();
    assert!(todos.is_empty());
}

#[tokio::test]
async fn test_update_validation_leaves_record_alone() {
    let server = TestServer::new().await;
    let todo = create(
        &server,
        json!({"title": "Retro", "description": "weekly", "category": "do-differently"}),
    )
    .await;
    let url = server.url(&format!("/api/todos/{}", todo["id"].as_str().unwrap()));

    let resp = server
        .client
        .put(&url)
        .json(&json!({"title": "  "}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let error: Value = resp.json().await.unwrap();
    assert_eq!(error["error"], "Title cannot be empty");

    let resp = server
        .client
        .put(&url)
        .json(&json!({"category": "later"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = server.client.get(&url).send().await.unwrap();
    let current: Value = resp.json().await.unwrap();
    assert_eq!(current, todo);
}

#[tokio::test]
async fn test_wrongly_typed_fields_are_bad_requests() {
    let server = TestServer::new().await;
    let todo = create(&server, json!({"title": "Retro", "category": "keep-doing"})).await;
    let url = server.url(&format!("/api/todos/{}", todo["id"].as_str().unwrap()));

    let resp = server
        .client
        .put(&url)
        .json(&json!({"completed": "yes"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let error: Value = resp.json().await.unwrap();
    assert!(error["error"].is_string());

    let resp = server
        .client
        .post(server.url("/api/todos"))
        .json(&json!({"title": 5, "category": "keep-doing"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let error: Value = resp.json().await.unwrap();
    assert!(error["error"].is_string());

    // Not JSON at all
    let resp = server
        .client
        .post(server.url("/api/todos"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = server.client.get(&url).send().await.unwrap();
    let current: Value = resp.json().await.unwrap();
    assert_eq!(current, todo);

    let resp = server
        .client
        .get(server.url("/api/todos"))
        .send()
        .await
        .unwrap();
    let todos: Vec<Value> = resp.json().await.unwrap();
    assert_eq!(todos.len(), 1);
}

#[tokio::test]
async fn test_description_is_trimmed_and_clearable() {
    let server = TestServer::new().await;
    let todo = create(
        &server,
        json!({"title": "Demo", "description": "  show the board  ", "category": "keep-doing"}),
    )
    .await;
    assert_eq!(todo["description"], "show the board");

    let resp = server
        .client
        .put(server.url(&format!("/api/todos/{}", todo["id"].as_str().unwrap())))
        .json(&json!({"description": "   "}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = resp.json().await.unwrap();
    assert!(updated["description"].is_null());
    assert_eq!(updated["title"], "Demo");
}

#[tokio::test]
async fn test_board_projection() {
    let server = TestServer::new().await;

    let old = create(&server, json!({"title": "old", "category": "start-doing"})).await;
    let done = create(&server, json!({"title": "done", "category": "start-doing"})).await;
    let new = create(&server, json!({"title": "new", "category": "start-doing"})).await;
    create(&server, json!({"title": "keep", "category": "keep-doing"})).await;
    server.shift_created_at(new["id"].as_str().unwrap(), 1_000);

    server
        .client
        .put(server.url(&format!("/api/todos/{}", done["id"].as_str().unwrap())))
        .json(&json!({"completed": true}))
        .send()
        .await
        .unwrap();

    let resp = server
        .client
        .get(server.url("/api/board"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let board: Value = resp.json().await.unwrap();

    let titles = |column: &str| -> Vec<String> {
        board[column]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["title"].as_str().unwrap().to_string())
            .collect()
    };
    assert_eq!(titles("startDoing"), ["new", "old", "done"]);
    assert!(titles("doDifferently").is_empty());
    assert_eq!(titles("keepDoing"), ["keep"]);
    assert_eq!(board["total"], 4);
    assert_eq!(board["completed"], 1);
    assert_eq!(board["startDoing"][1]["id"], old["id"]);

    let resp = server
        .client
        .get(server.url("/api/board/plain"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .contains("text/plain"));
    let body = resp.text().await.unwrap();
    assert!(body.contains("What should we start doing? (3)"));
    assert!(body.contains("[x] done"));
    assert!(body.contains("[ ] keep"));
}

#[tokio::test]
async fn test_database_failure_is_500() {
    let server = TestServer::new().await;
    server.break_database();

    let resp = server
        .client
        .get(server.url("/api/todos"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Internal server error");
}

#[tokio::test]
async fn test_base_path_nesting() {
    let server = TestServer::with_base_path("/retro").await;

    let resp = server
        .client
        .get(server.url("/retro/api/todos"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = server
        .client
        .get(server.url("/api/todos"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cors_origin_is_allowed() {
    let server = TestServer::with_cors_origin("http://localhost:4200").await;

    let resp = server
        .client
        .get(server.url("/api/health"))
        .header("origin", "http://localhost:4200")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("access-control-allow-origin").unwrap(),
        "http://localhost:4200"
    );

    let server = TestServer::new().await;
    let resp = server
        .client
        .get(server.url("/api/health"))
        .header("origin", "http://localhost:4200")
        .send()
        .await
        .unwrap();
    assert!(resp.headers().get("access-control-allow-origin").is_none());
}
