//! Development seed: staff accounts and a starter catalog.
//!
//! Usage: `cargo run --bin seed`. Idempotent; existing rows are left alone.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};
use sqlx::postgres::PgPoolOptions;

use maktaba_server::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().expect("Failed to load configuration");

    tracing_subscriber::fmt().init();

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!("./migrations").run(&pool).await?;

    let accounts = [
        ("Amina Librarian", "librarian@maktaba.org", "librarian", "librarian"),
        ("Omar Admin", "admin@maktaba.org", "admin", "admin"),
    ];

    for (name, email, password, role) in accounts {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("Password hashing failed: {}", e))?
            .to_string();

        let inserted = sqlx::query(
            r#"
            INSERT INTO users (name, email, password_hash, role)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (LOWER(email)) DO NOTHING
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(&hash)
        .bind(role)
        .execute(&pool)
        .await?
        .rows_affected();

        if inserted > 0 {
            tracing::info!("Seeded {} account: {}", role, email);
        }
    }

    let books = [
        ("Things Fall Apart", "Chinua Achebe", "978-0-385-47454-2", 3),
        ("Season of Migration to the North", "Tayeb Salih", "978-1-59017-302-2", 2),
        ("The Beautyful Ones Are Not Yet Born", "Ayi Kwei Armah", "978-0-435-90540-1", 1),
    ];

    for (title, author, isbn, copies) in books {
        let inserted = sqlx::query(
            r#"
            INSERT INTO books (title, author, isbn, total_copies, available_copies)
            VALUES ($1, $2, $3, $4, $4)
            ON CONFLICT (isbn) DO NOTHING
            "#,
        )
        .bind(title)
        .bind(author)
        .bind(isbn)
        .bind(copies)
        .execute(&pool)
        .await?
        .rows_affected();

        if inserted > 0 {
            tracing::info!("Seeded book: {}", title);
        }
    }

    tracing::info!("Seed complete");

    Ok(())
}
