//! Create a user account in the Postgres credential store.
//!
//! Usage:
//!   seed --email admin@example.com --name Admin --password secret

use anyhow::{bail, Context, Result};
use clap::Parser;
use gateway_core::domains::auth::hash_password;
use gateway_core::domains::users::{NewUser, PgUserStore, StoreError, UserStore};
use sqlx::PgPool;

#[derive(Parser, Debug)]
#[command(name = "seed", about = "Create a gateway user account")]
struct Args {
    /// Login email (stored lowercased)
    #[arg(long)]
    email: String,

    /// Display name
    #[arg(long)]
    name: String,

    /// Plaintext password; only the Argon2 hash is stored
    #[arg(long)]
    password: String,

    #[arg(long)]
    contact_number: Option<String>,

    /// Role to grant
    #[arg(long, default_value = "Super Admin")]
    role: String,

    /// Group to join
    #[arg(long, default_value = "Admins")]
    group: String,

    /// Postgres connection string
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sqlx=warn".into()),
        )
        .init();

    let args = Args::parse();

    if args.password.is_empty() {
        bail!("--password must not be empty");
    }

    let pool = PgPool::connect(&args.database_url)
        .await
        .context("Failed to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    let store = PgUserStore::new(pool);
    let password_hash = hash_password(&args.password).context("Failed to hash password")?;

    let result = store
        .create_user(NewUser {
            email: args.email.clone(),
            name: args.name,
            password_hash,
            blocked: false,
            contact_number: args.contact_number,
            roles: vec![args.role],
            groups: vec![args.group],
        })
        .await;

    match result {
        Ok(user) => {
            tracing::info!(user_id = %user.id, email = %user.email, "User created");
            println!("{}", user.id);
            Ok(())
        }
        Err(StoreError::DuplicateEmail(email)) => bail!("A user with email {} already exists", email),
        Err(e) => Err(e).context("Failed to create user"),
    }
}
