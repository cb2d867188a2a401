#![allow(clippy::unused_async, unused_must_use, clippy::too_many_lines)]
//! Integration tests for category reads and admin-gated mutations.

use salvo::http::StatusCode;
use serde_json::json;

use super::helpers::*;

#[test_log::test(tokio::test)]
async fn reads_are_open_to_every_authenticated_principal() -> anyhow::Result<()> {
    let test_db = TestDb::new().await?;
    let service = create_test_service(&test_db).await;

    let user_token = register_and_login(&service, "alice").await;
    test_db
        .seed_admin("root", "root@example.com", "root-password")
        .await?;
    let admin_token = login_token(&service, "root", "root-password").await;
    let category_id = test_db.seed_category("Chores").await?;

    // Reads still require authentication.
    TestRequest::get(CATEGORY_ROUTE_PREFIX)
        .send(&service)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    for token in [&user_token, &admin_token] {
        let listed = TestRequest::get(CATEGORY_ROUTE_PREFIX)
            .bearer(token)
            .send(&service)
            .await
            .assert_status(StatusCode::OK)
            .json();
        assert_eq!(listed.as_array().expect("array").len(), 1);
        assert_eq!(listed[0]["name"], "Chores");

        let fetched = TestRequest::get(&category_path(category_id))
            .bearer(token)
            .send(&service)
            .await
            .assert_status(StatusCode::OK)
            .json();
        assert_eq!(fetched["name"], "Chores");
    }
    Ok(())
}

#[test_log::test(tokio::test)]
async fn mutations_are_restricted_to_administrators() -> anyhow::Result<()> {
    let test_db = TestDb::new().await?;
    let service = create_test_service(&test_db).await;

    let user_token = register_and_login(&service, "alice").await;
    test_db
        .seed_admin("root", "root@example.com", "root-password")
        .await?;
    let admin_token = login_token(&service, "root", "root-password").await;

    TestRequest::post(CATEGORY_ROUTE_PREFIX)
        .bearer(&user_token)
        .json_body(&json!({ "name": "Forbidden" }))
        .send(&service)
        .await
        .assert_status(StatusCode::FORBIDDEN)
        .assert_body_contains("Access denied");

    let created = TestRequest::post(CATEGORY_ROUTE_PREFIX)
        .bearer(&admin_token)
        .json_body(&json!({ "name": "Errands" }))
        .send(&service)
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    assert_eq!(created["name"], "Errands");
    let category_id = i32::try_from(created["id"].as_i64().expect("category id"))?;

    TestRequest::delete(&category_path(category_id))
        .bearer(&user_token)
        .send(&service)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    TestRequest::delete(&category_path(category_id))
        .bearer(&admin_token)
        .send(&service)
        .await
        .assert_status(StatusCode::OK)
        .assert_body_contains("Category deleted successfully");

    TestRequest::get(&category_path(category_id))
        .bearer(&user_token)
        .send(&service)
        .await
        .assert_status(StatusCode::NOT_FOUND)
        .assert_body_contains("Category not found");
    Ok(())
}

#[test_log::test(tokio::test)]
async fn the_role_check_precedes_the_lookup_on_delete() -> anyhow::Result<()> {
    let test_db = TestDb::new().await?;
    let service = create_test_service(&test_db).await;

    let user_token = register_and_login(&service, "alice").await;
    test_db
        .seed_admin("root", "root@example.com", "root-password")
        .await?;
    let admin_token = login_token(&service, "root", "root-password").await;

    // An ordinary user gets a 403 even for an id that does not exist, so
    // the response leaks nothing about what is stored.
    TestRequest::delete(&category_path(424_242))
        .bearer(&user_token)
        .send(&service)
        .await
        .assert_status(StatusCode::FORBIDDEN)
        .assert_body_contains("Access denied");

    TestRequest::delete(&category_path(424_242))
        .bearer(&admin_token)
        .send(&service)
        .await
        .assert_status(StatusCode::NOT_FOUND)
        .assert_body_contains("Category not found");
    Ok(())
}

#[test_log::test(tokio::test)]
async fn create_rejects_an_empty_name() -> anyhow::Result<()> {
    let test_db = TestDb::new().await?;
    let service = create_test_service(&test_db).await;

    test_db
        .seed_admin("root", "root@example.com", "root-password")
        .await?;
    let admin_token = login_token(&service, "root", "root-password").await;

    TestRequest::post(CATEGORY_ROUTE_PREFIX)
        .bearer(&admin_token)
        .json_body(&json!({ "name": "   " }))
        .send(&service)
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_body_contains("name must not be empty");
    Ok(())
}

#[test_log::test(tokio::test)]
async fn non_numeric_category_ids_are_not_found() -> anyhow::Result<()> {
    let test_db = TestDb::new().await?;
    let service = create_test_service(&test_db).await;

    let token = register_and_login(&service, "alice").await;

    TestRequest::get(&format!("{CATEGORY_ROUTE_PREFIX}/not-a-number"))
        .bearer(&token)
        .send(&service)
        .await
        .assert_status(StatusCode::NOT_FOUND)
        .assert_body_contains("Category not found");
    Ok(())
}
