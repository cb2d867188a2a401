//! Registration, login, and admin bootstrap.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use kunai_db::db::connection::DbConnection;
use kunai_db::db::enums::Role;
use kunai_db::db::{query, schema};
use kunai_db::model::user::{NewUser, User};

use crate::error::{ServiceError, ServiceResult, map_unique_violation};

use super::password::{hash_password, verify_password};
use super::token::TokenService;

/// ## Summary
/// Registers a new ordinary user account.
///
/// ## Side Effects
/// - Inserts the user row with a freshly salted password hash.
///
/// ## Errors
/// - `ValidationError` if a field is empty or the email is implausible.
/// - `Conflict` if the username or the email is already taken.
pub async fn register(
    conn: &mut DbConnection<'_>,
    username: &str,
    email: &str,
    password: &str,
) -> ServiceResult<User> {
    create_account(conn, username, email, password, Role::User).await
}

/// ## Summary
/// Creates an administrator account.
///
/// Used by the `create_admin` binary and by test seeding; there is no HTTP
/// surface for minting administrators.
///
/// ## Errors
/// Same as [`register`].
pub async fn create_admin(
    conn: &mut DbConnection<'_>,
    username: &str,
    email: &str,
    password: &str,
) -> ServiceResult<User> {
    create_account(conn, username, email, password, Role::Admin).await
}

/// ## Summary
/// Authenticates a principal by username and password and issues an access
/// token embedding the stored role.
///
/// Unknown usernames and wrong passwords fail identically; the response
/// never reveals which check rejected the attempt.
///
/// ## Errors
/// Returns `InvalidCredentials` on unknown username or password mismatch.
pub async fn login(
    conn: &mut DbConnection<'_>,
    tokens: &TokenService,
    username: &str,
    password: &str,
) -> ServiceResult<String> {
    let user: Option<User> = query::user::by_username(username)
        .select(User::as_select())
        .first(conn)
        .await
        .optional()?;

    let Some(user) = user else {
        tracing::debug!(username, "Login attempt for unknown username");
        return Err(ServiceError::InvalidCredentials);
    };

    if verify_password(password, &user.password_hash).is_err() {
        tracing::debug!(user_id = user.id, "Login attempt with wrong password");
        return Err(ServiceError::InvalidCredentials);
    }

    tokens.issue(conn, user.id).await
}

async fn create_account(
    conn: &mut DbConnection<'_>,
    username: &str,
    email: &str,
    password: &str,
    role: Role,
) -> ServiceResult<User> {
    validate_signup(username, email, password)?;

    let existing: Option<User> = query::user::by_username_or_email(username, email)
        .select(User::as_select())
        .first(conn)
        .await
        .optional()?;

    if existing.is_some() {
        return Err(ServiceError::Conflict("User already exists".to_string()));
    }

    let password_hash = hash_password(password)?;
    let new_user = NewUser {
        username,
        email,
        password_hash: &password_hash,
        role,
    };

    let created: User = diesel::insert_into(schema::users::table)
        .values(&new_user)
        .returning(User::as_returning())
        .get_result(conn)
        .await
        .map_err(map_unique_violation)?;

    tracing::info!(user_id = created.id, role = %created.role, "Account created");

    Ok(created)
}

fn validate_signup(username: &str, email: &str, password: &str) -> ServiceResult<()> {
    if username.trim().is_empty() {
        return Err(ServiceError::ValidationError(
            "username must not be empty".to_string(),
        ));
    }
    if email.trim().is_empty() || !email.contains('@') {
        return Err(ServiceError::ValidationError(
            "email must be a valid address".to_string(),
        ));
    }
    if password.is_empty() {
        return Err(ServiceError::ValidationError(
            "password must not be empty".to_string(),
        ));
    }
    Ok(())
}
