//! Database schema migrations (idempotent).
//!
//! | Table | Key | Contents |
//! |-------|-----|----------|
//! | `mentors` | `id` | profile fields; topic and group lists as JSON text |
//! | `mentor_internships` | `(mentor_id, position)` | organization + role |
//! | `mentor_struggles` | `(mentor_id, position)` | area + situation + advice |
//! | `mentor_embeddings` | `mentor_id` | source text, f32 BLOB, model, hash |
//!
//! `mentor_embeddings.mentor_id` is the primary key, which is what makes
//! refreshes overwrite rather than append.

use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    migrate_pool(&pool).await?;
    pool.close().await;
    Ok(())
}

pub async fn migrate_pool(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS mentors (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            user_type TEXT,
            bio_for_profile TEXT,
            mentoring_style TEXT,
            confident_queries_json TEXT NOT NULL DEFAULT '[]',
            groups_json TEXT NOT NULL DEFAULT '[]',
            updated_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS mentor_internships (
            mentor_id TEXT NOT NULL,
            position INTEGER NOT NULL,
            company_org TEXT,
            role_position TEXT,
            PRIMARY KEY (mentor_id, position),
            FOREIGN KEY (mentor_id) REFERENCES mentors(id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS mentor_struggles (
            mentor_id TEXT NOT NULL,
            position INTEGER NOT NULL,
            area TEXT,
            situation_description TEXT,
            advice_to_junior TEXT,
            PRIMARY KEY (mentor_id, position),
            FOREIGN KEY (mentor_id) REFERENCES mentors(id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS mentor_embeddings (
            mentor_id TEXT PRIMARY KEY,
            embedding_source_text TEXT NOT NULL,
            embedding BLOB NOT NULL,
            model TEXT NOT NULL,
            dims INTEGER NOT NULL,
            source_hash TEXT NOT NULL,
            updated_at INTEGER NOT NULL,
            FOREIGN KEY (mentor_id) REFERENCES mentors(id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_mentors_name ON mentors(name)")
        .execute(pool)
        .await?;

    Ok(())
}
