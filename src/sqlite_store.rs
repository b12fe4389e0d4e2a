//! SQLite-backed [`MentorStore`] implementation.
//!
//! A mentor is read as a nested fetch: the `mentors` row, then its
//! internships and struggles in `position` order. Topic and group lists are
//! stored as JSON text columns.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use haven_match_core::embedding::{blob_to_vec, vec_to_blob};
use haven_match_core::models::{Internship, Mentor, MentorEmbedding, MentorRole, Struggle};
use haven_match_core::store::MentorStore;

/// SQLite implementation of the [`MentorStore`] trait.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn load_children(&self, mentor: &mut Mentor) -> Result<()> {
        let internships = sqlx::query(
            "SELECT company_org, role_position FROM mentor_internships WHERE mentor_id = ? ORDER BY position",
        )
        .bind(&mentor.id)
        .fetch_all(&self.pool)
        .await?;

        mentor.internships = internships
            .iter()
            .map(|row| Internship {
                company_org: row.get("company_org"),
                role_position: row.get("role_position"),
            })
            .collect();

        let struggles = sqlx::query(
            "SELECT area, situation_description, advice_to_junior FROM mentor_struggles WHERE mentor_id = ? ORDER BY position",
        )
        .bind(&mentor.id)
        .fetch_all(&self.pool)
        .await?;

        mentor.struggles = struggles
            .iter()
            .map(|row| Struggle {
                area: row.get("area"),
                situation_description: row.get("situation_description"),
                advice_to_junior: row.get("advice_to_junior"),
            })
            .collect();

        Ok(())
    }
}

fn parse_role(value: Option<String>) -> Option<MentorRole> {
    let value = value?;
    serde_json::from_value(serde_json::Value::String(value)).ok()
}

fn mentor_from_row(row: &SqliteRow) -> Result<Mentor> {
    let id: String = row.get("id");
    let topics: String = row.get("confident_queries_json");
    let groups: String = row.get("groups_json");

    Ok(Mentor {
        confident_queries: serde_json::from_str(&topics)
            .with_context(|| format!("bad confident_queries_json for mentor {}", id))?,
        groups: serde_json::from_str(&groups)
            .with_context(|| format!("bad groups_json for mentor {}", id))?,
        name: row.get("name"),
        role: parse_role(row.get("user_type")),
        bio: row.get("bio_for_profile"),
        mentoring_style: row.get("mentoring_style"),
        internships: Vec::new(),
        struggles: Vec::new(),
        id,
    })
}

fn embedding_from_row(row: &SqliteRow) -> MentorEmbedding {
    let blob: Vec<u8> = row.get("embedding");
    MentorEmbedding {
        mentor_id: row.get("mentor_id"),
        source_text: row.get("embedding_source_text"),
        embedding: blob_to_vec(&blob),
        model: row.get("model"),
        source_hash: row.get("source_hash"),
        updated_at: row.get("updated_at"),
    }
}

const MENTOR_COLUMNS: &str = "id, name, user_type, bio_for_profile, mentoring_style, confident_queries_json, groups_json";

const EMBEDDING_COLUMNS: &str =
    "mentor_id, embedding_source_text, embedding, model, source_hash, updated_at";

#[async_trait]
impl MentorStore for SqliteStore {
    async fn upsert_mentor(&self, mentor: &Mentor) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        let topics = serde_json::to_string(&mentor.confident_queries)?;
        let groups = serde_json::to_string(&mentor.groups)?;

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO mentors (id, name, user_type, bio_for_profile, mentoring_style,
                                 confident_queries_json, groups_json, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                user_type = excluded.user_type,
                bio_for_profile = excluded.bio_for_profile,
                mentoring_style = excluded.mentoring_style,
                confident_queries_json = excluded.confident_queries_json,
                groups_json = excluded.groups_json,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&mentor.id)
        .bind(&mentor.name)
        .bind(mentor.role.map(|r| r.as_str()))
        .bind(&mentor.bio)
        .bind(&mentor.mentoring_style)
        .bind(&topics)
        .bind(&groups)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM mentor_internships WHERE mentor_id = ?")
            .bind(&mentor.id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM mentor_struggles WHERE mentor_id = ?")
            .bind(&mentor.id)
            .execute(&mut *tx)
            .await?;

        for (position, internship) in mentor.internships.iter().enumerate() {
            sqlx::query(
                "INSERT INTO mentor_internships (mentor_id, position, company_org, role_position) VALUES (?, ?, ?, ?)",
            )
            .bind(&mentor.id)
            .bind(position as i64)
            .bind(&internship.company_org)
            .bind(&internship.role_position)
            .execute(&mut *tx)
            .await?;
        }

        for (position, struggle) in mentor.struggles.iter().enumerate() {
            sqlx::query(
                "INSERT INTO mentor_struggles (mentor_id, position, area, situation_description, advice_to_junior) VALUES (?, ?, ?, ?, ?)",
            )
            .bind(&mentor.id)
            .bind(position as i64)
            .bind(&struggle.area)
            .bind(&struggle.situation_description)
            .bind(&struggle.advice_to_junior)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn get_mentor(&self, id: &str) -> Result<Option<Mentor>> {
        let row = sqlx::query(&format!("SELECT {} FROM mentors WHERE id = ?", MENTOR_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let mut mentor = mentor_from_row(&row)?;
                self.load_children(&mut mentor).await?;
                Ok(Some(mentor))
            }
            None => Ok(None),
        }
    }

    async fn list_mentors(&self, limit: Option<usize>) -> Result<Vec<Mentor>> {
        let limit_val = limit.map(|l| l as i64).unwrap_or(-1);

        let rows = sqlx::query(&format!(
            "SELECT {} FROM mentors ORDER BY id LIMIT ?",
            MENTOR_COLUMNS
        ))
        .bind(limit_val)
        .fetch_all(&self.pool)
        .await?;

        let mut mentors = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut mentor = mentor_from_row(row)?;
            self.load_children(&mut mentor).await?;
            mentors.push(mentor);
        }
        Ok(mentors)
    }

    async fn upsert_embedding(&self, embedding: &MentorEmbedding) -> Result<()> {
        let blob = vec_to_blob(&embedding.embedding);

        sqlx::query(
            r#"
            INSERT INTO mentor_embeddings (mentor_id, embedding_source_text, embedding,
                                           model, dims, source_hash, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(mentor_id) DO UPDATE SET
                embedding_source_text = excluded.embedding_source_text,
                embedding = excluded.embedding,
                model = excluded.model,
                dims = excluded.dims,
                source_hash = excluded.source_hash,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&embedding.mentor_id)
        .bind(&embedding.source_text)
        .bind(&blob)
        .bind(&embedding.model)
        .bind(embedding.embedding.len() as i64)
        .bind(&embedding.source_hash)
        .bind(embedding.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_embedding(&self, mentor_id: &str) -> Result<Option<MentorEmbedding>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM mentor_embeddings WHERE mentor_id = ?",
            EMBEDDING_COLUMNS
        ))
        .bind(mentor_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(embedding_from_row))
    }

    async fn list_embeddings(&self) -> Result<Vec<MentorEmbedding>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM mentor_embeddings ORDER BY mentor_id",
            EMBEDDING_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(embedding_from_row).collect())
    }
}
