#![allow(clippy::unused_async, unused_must_use, clippy::too_many_lines)]
//! Integration tests for registration and login.

use salvo::http::StatusCode;

use super::helpers::*;

#[test_log::test(tokio::test)]
async fn sign_up_creates_an_account_and_allows_login() -> anyhow::Result<()> {
    let test_db = TestDb::new().await?;
    let service = create_test_service(&test_db).await;

    sign_up_user(&service, "alice", "alice@example.com", "password123")
        .await
        .assert_status(StatusCode::CREATED)
        .assert_body_contains("User created successfully");

    let token = login_token(&service, "alice", "password123").await;
    assert!(!token.is_empty());

    assert_eq!(test_db.count_users().await?, 1);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn duplicate_username_is_rejected_without_a_second_row() -> anyhow::Result<()> {
    let test_db = TestDb::new().await?;
    let service = create_test_service(&test_db).await;

    sign_up_user(&service, "alice", "alice@example.com", "password123")
        .await
        .assert_status(StatusCode::CREATED);

    sign_up_user(&service, "alice", "other@example.com", "password123")
        .await
        .assert_status(StatusCode::CONFLICT)
        .assert_body_contains("User already exists");

    assert_eq!(test_db.count_users().await?, 1);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn duplicate_email_is_rejected_without_a_second_row() -> anyhow::Result<()> {
    let test_db = TestDb::new().await?;
    let service = create_test_service(&test_db).await;

    sign_up_user(&service, "alice", "alice@example.com", "password123")
        .await
        .assert_status(StatusCode::CREATED);

    sign_up_user(&service, "alice2", "alice@example.com", "password123")
        .await
        .assert_status(StatusCode::CONFLICT)
        .assert_body_contains("User already exists");

    assert_eq!(test_db.count_users().await?, 1);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn sign_up_rejects_missing_or_implausible_fields() -> anyhow::Result<()> {
    let test_db = TestDb::new().await?;
    let service = create_test_service(&test_db).await;

    sign_up_user(&service, "", "alice@example.com", "password123")
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_body_contains("username must not be empty");

    sign_up_user(&service, "alice", "not-an-address", "password123")
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_body_contains("email must be a valid address");

    sign_up_user(&service, "alice", "alice@example.com", "")
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_body_contains("password must not be empty");

    assert_eq!(test_db.count_users().await?, 0);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn malformed_sign_up_bodies_are_rejected() -> anyhow::Result<()> {
    let test_db = TestDb::new().await?;
    let service = create_test_service(&test_db).await;

    TestRequest::post(SIGN_UP_ROUTE_PREFIX)
        .header("Content-Type", "application/json")
        .body("not json at all")
        .send(&service)
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_body_contains("Invalid request body");

    // Required fields cannot be absent either.
    TestRequest::post(SIGN_UP_ROUTE_PREFIX)
        .json_body(&serde_json::json!({ "username": "alice" }))
        .send(&service)
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_body_contains("Invalid request body");

    assert_eq!(test_db.count_users().await?, 0);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn unknown_username_and_wrong_password_fail_identically() -> anyhow::Result<()> {
    let test_db = TestDb::new().await?;
    let service = create_test_service(&test_db).await;

    sign_up_user(&service, "alice", "alice@example.com", "password123")
        .await
        .assert_status(StatusCode::CREATED);

    let unknown_user = login(&service, "mallory", "password123")
        .await
        .assert_status(StatusCode::UNAUTHORIZED)
        .body_string();

    let wrong_password = login(&service, "alice", "wrong-password")
        .await
        .assert_status(StatusCode::UNAUTHORIZED)
        .body_string();

    // The response must not reveal which check failed.
    assert_eq!(unknown_user, wrong_password);
    assert!(unknown_user.contains("Invalid username or password"));
    Ok(())
}

#[test_log::test(tokio::test)]
async fn seeded_admin_can_log_in() -> anyhow::Result<()> {
    let test_db = TestDb::new().await?;
    let service = create_test_service(&test_db).await;

    test_db
        .seed_admin("root", "root@example.com", "root-password")
        .await?;

    let token = login_token(&service, "root", "root-password").await;
    assert!(!token.is_empty());
    Ok(())
}
