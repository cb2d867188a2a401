#![allow(clippy::unused_async, unused_must_use, clippy::too_many_lines)]
//! Integration tests for bearer token verification on protected routes.
//!
//! Tokens are stateless: the middleware only checks the signature and the
//! expiry, never the store. What that means for deleted accounts is pinned
//! down at the end of this file.

use salvo::http::StatusCode;

use super::helpers::*;

#[test_log::test(tokio::test)]
async fn healthcheck_needs_no_token() -> anyhow::Result<()> {
    let test_db = TestDb::new().await?;
    let service = create_test_service(&test_db).await;

    let response = TestRequest::get(HEALTHCHECK_ROUTE_PREFIX)
        .send(&service)
        .await
        .assert_status(StatusCode::OK);
    assert_eq!(response.body_string(), "OK");
    Ok(())
}

#[test_log::test(tokio::test)]
async fn protected_routes_require_a_token() -> anyhow::Result<()> {
    let test_db = TestDb::new().await?;
    let service = create_test_service(&test_db).await;

    TestRequest::get(TASK_ROUTE_PREFIX)
        .send(&service)
        .await
        .assert_status(StatusCode::UNAUTHORIZED)
        .assert_body_contains("authorization_required");
    Ok(())
}

#[test_log::test(tokio::test)]
async fn malformed_authorization_headers_count_as_missing() -> anyhow::Result<()> {
    let test_db = TestDb::new().await?;
    let service = create_test_service(&test_db).await;

    // Wrong scheme.
    TestRequest::get(TASK_ROUTE_PREFIX)
        .header("Authorization", "Token abcdef")
        .send(&service)
        .await
        .assert_status(StatusCode::UNAUTHORIZED)
        .assert_body_contains("authorization_required");

    // Scheme without a token.
    TestRequest::get(TASK_ROUTE_PREFIX)
        .header("Authorization", "Bearer")
        .send(&service)
        .await
        .assert_status(StatusCode::UNAUTHORIZED)
        .assert_body_contains("authorization_required");
    Ok(())
}

#[test_log::test(tokio::test)]
async fn garbage_tokens_are_rejected() -> anyhow::Result<()> {
    let test_db = TestDb::new().await?;
    let service = create_test_service(&test_db).await;

    TestRequest::get(TASK_ROUTE_PREFIX)
        .bearer("not-a-token")
        .send(&service)
        .await
        .assert_status(StatusCode::UNAUTHORIZED)
        .assert_body_contains("invalid_token");
    Ok(())
}

#[test_log::test(tokio::test)]
async fn tokens_signed_with_an_unknown_secret_are_rejected() -> anyhow::Result<()> {
    let test_db = TestDb::new().await?;
    let service = create_test_service(&test_db).await;

    TestRequest::get(TASK_ROUTE_PREFIX)
        .bearer(&foreign_secret_token(1, Role::User))
        .send(&service)
        .await
        .assert_status(StatusCode::UNAUTHORIZED)
        .assert_body_contains("invalid_token");
    Ok(())
}

#[test_log::test(tokio::test)]
async fn expired_tokens_are_rejected_as_expired() -> anyhow::Result<()> {
    let test_db = TestDb::new().await?;
    let service = create_test_service(&test_db).await;

    TestRequest::get(TASK_ROUTE_PREFIX)
        .bearer(&expired_token_for(1, Role::User))
        .send(&service)
        .await
        .assert_status(StatusCode::UNAUTHORIZED)
        .assert_body_contains("token_expired");
    Ok(())
}

#[test_log::test(tokio::test)]
async fn a_valid_token_reaches_the_handler() -> anyhow::Result<()> {
    let test_db = TestDb::new().await?;
    let service = create_test_service(&test_db).await;

    let token = register_and_login(&service, "alice").await;

    let response = TestRequest::get(TASK_ROUTE_PREFIX)
        .bearer(&token)
        .send(&service)
        .await
        .assert_status(StatusCode::OK);
    assert_eq!(response.json(), serde_json::json!([]));
    Ok(())
}

#[test_log::test(tokio::test)]
async fn a_stale_token_outlives_its_deleted_account() -> anyhow::Result<()> {
    let test_db = TestDb::new().await?;
    let service = create_test_service(&test_db).await;

    let token = register_and_login(&service, "alice").await;
    let alice_id = test_db.user_id_by_username("alice").await?;
    let category_id = test_db.seed_category("Chores").await?;

    TestRequest::delete(&user_path(alice_id))
        .bearer(&token)
        .send(&service)
        .await
        .assert_status(StatusCode::OK);

    // The signature still verifies, so list reads succeed and scope down
    // to the missing principal.
    let response = TestRequest::get(TASK_ROUTE_PREFIX)
        .bearer(&token)
        .send(&service)
        .await
        .assert_status(StatusCode::OK);
    assert_eq!(response.json(), serde_json::json!([]));

    // Writes need the principal row and surface its absence.
    TestRequest::post(TASK_ROUTE_PREFIX)
        .bearer(&token)
        .json_body(&serde_json::json!({
            "title": "Ghost task",
            "category_id": category_id,
        }))
        .send(&service)
        .await
        .assert_status(StatusCode::NOT_FOUND)
        .assert_body_contains("User not found");
    Ok(())
}
