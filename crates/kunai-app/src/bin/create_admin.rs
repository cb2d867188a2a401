//! Seeds an administrator account from the command line.
//!
//! There is no HTTP surface for minting administrators; this binary is the
//! only way to create one.

use kunai_core::config::load_config;
use kunai_db::db::DbProvider;
use kunai_db::db::connection::create_pool;
use kunai_db::db::migrate::run_migrations;
use kunai_service::auth::account;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let [_, username, email, password] = args.as_slice() else {
        eprintln!("Usage: create_admin <username> <email> <password>");
        std::process::exit(1);
    };

    let config = load_config()?;

    run_migrations(&config.database.url).await?;

    let pool = create_pool(&config.database.url, 1).await?;
    let mut conn = pool.get_connection().await?;

    match account::create_admin(&mut conn, username, email, password).await {
        Ok(user) => {
            println!("Admin user '{}' created with id {}", user.username, user.id);
            Ok(())
        }
        Err(err) => {
            eprintln!("Failed to create admin user: {err}");
            std::process::exit(1);
        }
    }
}
