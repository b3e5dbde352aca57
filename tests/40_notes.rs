mod common;

use anyhow::Result;
use common::{id_of, TestServer};
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn create_and_fetch_note() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.user("alice").await?;
    let folder = server.create(&token, "/api/folders", json!({ "name": "Work" })).await?;
    let tag = server.create(&token, "/api/tags", json!({ "name": "urgent" })).await?;

    let res = server
        .post(
            &token,
            "/api/notes",
            json!({
                "title": "Standup",
                "content": "Talk about the release",
                "folderId": folder["id"],
                "tags": [tag["id"]]
            }),
        )
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let location = res.headers()["location"].to_str()?.to_string();
    let note: Value = res.json().await?;
    assert_eq!(location, format!("/api/notes/{}", id_of(&note)));
    assert_eq!(note["folderId"], folder["id"]);
    assert_eq!(note["tags"], json!([tag["id"]]));

    let fetched: Value = server.get(&token, &location).await?.json().await?;
    assert_eq!(fetched["title"], "Standup");
    assert_eq!(fetched["content"], "Talk about the release");

    Ok(())
}

#[tokio::test]
async fn create_requires_title() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.user("alice").await?;

    let res = server.post(&token, "/api/notes", json!({ "content": "untitled" })).await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn invalid_references_are_rejected_before_writing() -> Result<()> {
    let server = TestServer::start().await?;
    let alice = server.user("alice").await?;
    let bob = server.user("bob").await?;
    let bobs_folder = server.create(&bob, "/api/folders", json!({ "name": "Bob" })).await?;
    let bobs_tag = server.create(&bob, "/api/tags", json!({ "name": "bob" })).await?;
    let alices_tag = server.create(&alice, "/api/tags", json!({ "name": "mine" })).await?;

    let bad_bodies = [
        json!({ "title": "t", "folderId": "not-a-uuid" }),
        json!({ "title": "t", "folderId": bobs_folder["id"] }),
        json!({ "title": "t", "folderId": uuid::Uuid::new_v4().to_string() }),
        json!({ "title": "t", "tags": "nope" }),
        json!({ "title": "t", "tags": ["not-a-uuid"] }),
        json!({ "title": "t", "tags": [bobs_tag["id"]] }),
        json!({ "title": "t", "tags": [alices_tag["id"], bobs_tag["id"]] }),
        json!({ "title": "t", "tags": [alices_tag["id"], alices_tag["id"]] }),
    ];

    for body in bad_bodies {
        let res = server.post(&alice, "/api/notes", body.clone()).await?;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{}", body);
    }

    let notes: Vec<Value> = server.get(&alice, "/api/notes").await?.json().await?;
    assert!(notes.is_empty());

    Ok(())
}

#[tokio::test]
async fn failed_update_leaves_note_untouched() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.user("alice").await?;
    let note = server.create(&token, "/api/notes", json!({ "title": "Before" })).await?;
    let path = format!("/api/notes/{}", id_of(&note));

    let res = server
        .put(
            &token,
            &path,
            json!({ "title": "After", "tags": [uuid::Uuid::new_v4().to_string()] }),
        )
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let current: Value = server.get(&token, &path).await?.json().await?;
    assert_eq!(current["title"], "Before");
    assert_eq!(current["tags"], json!([]));

    Ok(())
}

#[tokio::test]
async fn update_is_a_patch() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.user("alice").await?;
    let folder = server.create(&token, "/api/folders", json!({ "name": "Work" })).await?;
    let tag = server.create(&token, "/api/tags", json!({ "name": "urgent" })).await?;
    let note = server
        .create(
            &token,
            "/api/notes",
            json!({ "title": "Plan", "content": "body", "folderId": folder["id"], "tags": [tag["id"]] }),
        )
        .await?;
    let path = format!("/api/notes/{}", id_of(&note));

    let updated: Value = server
        .put(&token, &path, json!({ "content": "new body" }))
        .await?
        .json()
        .await?;
    assert_eq!(updated["title"], "Plan");
    assert_eq!(updated["content"], "new body");
    assert_eq!(updated["folderId"], folder["id"]);
    assert_eq!(updated["tags"], json!([tag["id"]]));

    let updated: Value = server
        .put(&token, &path, json!({ "folderId": null, "tags": [] }))
        .await?
        .json()
        .await?;
    assert!(updated["folderId"].is_null());
    assert_eq!(updated["tags"], json!([]));
    assert_eq!(updated["content"], "new body");

    let res = server.put(&token, &path, json!({ "title": "" })).await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn search_term_matches_title_or_content_case_insensitively() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.user("alice").await?;
    server
        .create(&token, "/api/notes", json!({ "title": "Concert", "content": "Saw Lady Gaga" }))
        .await?;
    server.create(&token, "/api/notes", json!({ "title": "GAGA tour" })).await?;
    server
        .create(&token, "/api/notes", json!({ "title": "Cats", "content": "Why cats are great" }))
        .await?;

    let found: Vec<Value> = server.get(&token, "/api/notes?searchTerm=gaga").await?.json().await?;
    let mut titles: Vec<&str> = found.iter().filter_map(|n| n["title"].as_str()).collect();
    titles.sort();
    assert_eq!(titles, vec!["Concert", "GAGA tour"]);

    Ok(())
}

#[tokio::test]
async fn folder_and_tag_filters_combine() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.user("alice").await?;
    let work = server.create(&token, "/api/folders", json!({ "name": "Work" })).await?;
    let urgent = server.create(&token, "/api/tags", json!({ "name": "urgent" })).await?;

    server
        .create(&token, "/api/notes", json!({ "title": "a", "folderId": work["id"], "tags": [urgent["id"]] }))
        .await?;
    server
        .create(&token, "/api/notes", json!({ "title": "b", "folderId": work["id"] }))
        .await?;
    server
        .create(&token, "/api/notes", json!({ "title": "c", "tags": [urgent["id"]] }))
        .await?;

    let in_work: Vec<Value> = server
        .get(&token, &format!("/api/notes?folderId={}", id_of(&work)))
        .await?
        .json()
        .await?;
    assert_eq!(in_work.len(), 2);

    let both: Vec<Value> = server
        .get(&token, &format!("/api/notes?folderId={}&tagId={}", id_of(&work), id_of(&urgent)))
        .await?
        .json()
        .await?;
    assert_eq!(both.len(), 1);
    assert_eq!(both[0]["title"], "a");

    let res = server.get(&token, "/api/notes?folderId=garbage").await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn notes_are_listed_most_recently_updated_first() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.user("alice").await?;
    let first = server.create(&token, "/api/notes", json!({ "title": "first" })).await?;
    server.create(&token, "/api/notes", json!({ "title": "second" })).await?;

    server
        .put(&token, &format!("/api/notes/{}", id_of(&first)), json!({ "content": "touched" }))
        .await?;

    let list: Vec<Value> = server.get(&token, "/api/notes").await?.json().await?;
    let titles: Vec<&str> = list.iter().filter_map(|n| n["title"].as_str()).collect();
    assert_eq!(titles, vec!["first", "second"]);

    Ok(())
}

#[tokio::test]
async fn delete_note() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.user("alice").await?;
    let note = server.create(&token, "/api/notes", json!({ "title": "gone" })).await?;
    let path = format!("/api/notes/{}", id_of(&note));

    assert_eq!(server.delete(&token, &path).await?.status(), StatusCode::NO_CONTENT);
    assert_eq!(server.get(&token, &path).await?.status(), StatusCode::NOT_FOUND);
    assert_eq!(server.delete(&token, &path).await?.status(), StatusCode::NOT_FOUND);

    Ok(())
}
