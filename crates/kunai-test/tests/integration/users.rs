#![allow(clippy::unused_async, unused_must_use, clippy::too_many_lines)]
//! Integration tests for user reads, self-service updates, and the
//! delete cascade.

use salvo::http::StatusCode;
use serde_json::json;

use super::helpers::*;

#[test_log::test(tokio::test)]
async fn list_reads_are_scoped_to_the_principal() -> anyhow::Result<()> {
    let test_db = TestDb::new().await?;
    let service = create_test_service(&test_db).await;

    let alice_token = register_and_login(&service, "alice").await;
    register_and_login(&service, "bob").await;
    test_db
        .seed_admin("root", "root@example.com", "root-password")
        .await?;
    let admin_token = login_token(&service, "root", "root-password").await;

    let own_row = TestRequest::get(USER_ROUTE_PREFIX)
        .bearer(&alice_token)
        .send(&service)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(own_row.as_array().expect("array").len(), 1);
    assert_eq!(own_row[0]["username"], "alice");

    let everyone = TestRequest::get(USER_ROUTE_PREFIX)
        .bearer(&admin_token)
        .send(&service)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(everyone.as_array().expect("array").len(), 3);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn users_may_read_only_their_own_row() -> anyhow::Result<()> {
    let test_db = TestDb::new().await?;
    let service = create_test_service(&test_db).await;

    let alice_token = register_and_login(&service, "alice").await;
    let bob_token = register_and_login(&service, "bob").await;
    let alice_id = test_db.user_id_by_username("alice").await?;
    test_db
        .seed_admin("root", "root@example.com", "root-password")
        .await?;
    let admin_token = login_token(&service, "root", "root-password").await;

    let own_row = TestRequest::get(&user_path(alice_id))
        .bearer(&alice_token)
        .send(&service)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(own_row["username"], "alice");
    assert_eq!(own_row["email"], "alice@example.com");
    assert_eq!(own_row["role"], "user");

    TestRequest::get(&user_path(alice_id))
        .bearer(&bob_token)
        .send(&service)
        .await
        .assert_status(StatusCode::FORBIDDEN)
        .assert_body_contains("Access denied");

    TestRequest::get(&user_path(alice_id))
        .bearer(&admin_token)
        .send(&service)
        .await
        .assert_status(StatusCode::OK);

    // A missing row is a 404 before any ownership comparison.
    TestRequest::get(&user_path(424_242))
        .bearer(&bob_token)
        .send(&service)
        .await
        .assert_status(StatusCode::NOT_FOUND)
        .assert_body_contains("User not found");

    TestRequest::get(&format!("{USER_ROUTE_PREFIX}/not-a-number"))
        .bearer(&bob_token)
        .send(&service)
        .await
        .assert_status(StatusCode::NOT_FOUND)
        .assert_body_contains("User not found");
    Ok(())
}

#[test_log::test(tokio::test)]
async fn the_response_embeds_owned_tasks_and_hides_credentials() -> anyhow::Result<()> {
    let test_db = TestDb::new().await?;
    let service = create_test_service(&test_db).await;

    let token = register_and_login(&service, "alice").await;
    let alice_id = test_db.user_id_by_username("alice").await?;
    let category_id = test_db.seed_category("Chores").await?;
    create_task_as(&service, &token, category_id, "First").await;
    create_task_as(&service, &token, category_id, "Second").await;

    let fetched = TestRequest::get(&user_path(alice_id))
        .bearer(&token)
        .send(&service)
        .await
        .assert_status(StatusCode::OK)
        .json();

    let tasks = fetched["tasks"].as_array().expect("tasks array");
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0]["title"], "First");
    assert_eq!(tasks[0]["category"]["name"], "Chores");

    assert!(fetched.get("password").is_none());
    assert!(fetched.get("password_hash").is_none());
    Ok(())
}

#[test_log::test(tokio::test)]
async fn partial_updates_rotate_credentials() -> anyhow::Result<()> {
    let test_db = TestDb::new().await?;
    let service = create_test_service(&test_db).await;

    let token = register_and_login(&service, "alice").await;
    let alice_id = test_db.user_id_by_username("alice").await?;

    TestRequest::put(&user_path(alice_id))
        .bearer(&token)
        .json_body(&json!({ "password": "rotated-password" }))
        .send(&service)
        .await
        .assert_status(StatusCode::OK);

    login(&service, "alice", "password123")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    login_token(&service, "alice", "rotated-password").await;

    let renamed = TestRequest::put(&user_path(alice_id))
        .bearer(&token)
        .json_body(&json!({ "username": "alice-renamed" }))
        .send(&service)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(renamed["username"], "alice-renamed");
    assert_eq!(renamed["email"], "alice@example.com");

    login_token(&service, "alice-renamed", "rotated-password").await;

    // A body with no updatable fields is a no-op.
    let unchanged = TestRequest::put(&user_path(alice_id))
        .bearer(&token)
        .json_body(&json!({}))
        .send(&service)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(unchanged["username"], "alice-renamed");
    Ok(())
}

#[test_log::test(tokio::test)]
async fn updates_reject_taken_or_implausible_identities() -> anyhow::Result<()> {
    let test_db = TestDb::new().await?;
    let service = create_test_service(&test_db).await;

    let alice_token = register_and_login(&service, "alice").await;
    register_and_login(&service, "bob").await;
    let alice_id = test_db.user_id_by_username("alice").await?;

    TestRequest::put(&user_path(alice_id))
        .bearer(&alice_token)
        .json_body(&json!({ "username": "bob" }))
        .send(&service)
        .await
        .assert_status(StatusCode::CONFLICT)
        .assert_body_contains("User already exists");

    TestRequest::put(&user_path(alice_id))
        .bearer(&alice_token)
        .json_body(&json!({ "email": "bob@example.com" }))
        .send(&service)
        .await
        .assert_status(StatusCode::CONFLICT)
        .assert_body_contains("User already exists");

    TestRequest::put(&user_path(alice_id))
        .bearer(&alice_token)
        .json_body(&json!({ "email": "not-an-address" }))
        .send(&service)
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_body_contains("email must be a valid address");

    TestRequest::put(&user_path(alice_id))
        .bearer(&alice_token)
        .json_body(&json!({ "username": "   " }))
        .send(&service)
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_body_contains("username must not be empty");

    TestRequest::put(&user_path(alice_id))
        .bearer(&alice_token)
        .json_body(&json!({ "password": "" }))
        .send(&service)
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_body_contains("password must not be empty");
    Ok(())
}

#[test_log::test(tokio::test)]
async fn foreign_rows_reject_updates_and_deletes() -> anyhow::Result<()> {
    let test_db = TestDb::new().await?;
    let service = create_test_service(&test_db).await;

    register_and_login(&service, "alice").await;
    let bob_token = register_and_login(&service, "bob").await;
    let alice_id = test_db.user_id_by_username("alice").await?;

    TestRequest::put(&user_path(alice_id))
        .bearer(&bob_token)
        .json_body(&json!({ "username": "hijacked" }))
        .send(&service)
        .await
        .assert_status(StatusCode::FORBIDDEN)
        .assert_body_contains("Access denied");

    TestRequest::delete(&user_path(alice_id))
        .bearer(&bob_token)
        .send(&service)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    assert_eq!(test_db.count_users().await?, 2);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn deleting_a_user_cascades_to_owned_tasks() -> anyhow::Result<()> {
    let test_db = TestDb::new().await?;
    let service = create_test_service(&test_db).await;

    let alice_token = register_and_login(&service, "alice").await;
    let bob_token = register_and_login(&service, "bob").await;
    let alice_id = test_db.user_id_by_username("alice").await?;
    test_db
        .seed_admin("root", "root@example.com", "root-password")
        .await?;
    let admin_token = login_token(&service, "root", "root-password").await;
    let category_id = test_db.seed_category("Chores").await?;

    let alice_task = create_task_as(&service, &alice_token, category_id, "Goes away").await;
    create_task_as(&service, &bob_token, category_id, "Stays").await;

    TestRequest::delete(&user_path(alice_id))
        .bearer(&admin_token)
        .send(&service)
        .await
        .assert_status(StatusCode::OK)
        .assert_body_contains("User deleted successfully");

    assert_eq!(test_db.count_users().await?, 2);
    assert_eq!(test_db.count_tasks().await?, 1);

    TestRequest::get(&task_path(alice_task))
        .bearer(&admin_token)
        .send(&service)
        .await
        .assert_status(StatusCode::NOT_FOUND)
        .assert_body_contains("Task not found");
    Ok(())
}

#[test_log::test(tokio::test)]
async fn admins_may_update_any_user() -> anyhow::Result<()> {
    let test_db = TestDb::new().await?;
    let service = create_test_service(&test_db).await;

    register_and_login(&service, "alice").await;
    let alice_id = test_db.user_id_by_username("alice").await?;
    test_db
        .seed_admin("root", "root@example.com", "root-password")
        .await?;
    let admin_token = login_token(&service, "root", "root-password").await;

    let updated = TestRequest::put(&user_path(alice_id))
        .bearer(&admin_token)
        .json_body(&json!({ "email": "corrected@example.com" }))
        .send(&service)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(updated["email"], "corrected@example.com");
    Ok(())
}
