use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::core::error::{AppError, Result};
use crate::features::reports::models::{Comment, CreateComment};
use crate::shared::time;

/// Service for report comments
pub struct CommentService {
    pool: SqlitePool,
}

impl CommentService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Comments of a report, newest first
    pub async fn list_for_report(&self, report_id: i64) -> Result<Vec<Comment>> {
        let mut tx = self.pool.begin().await?;
        ensure_report_exists(&mut tx, report_id).await?;

        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, report_id, user_name, comment_text, created_at
            FROM comments
            WHERE report_id = ?
            ORDER BY julianday(created_at) DESC, id DESC
            "#,
        )
        .bind(report_id)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list comments for report {}: {:?}", report_id, e);
            AppError::Database(e)
        })?;

        tx.commit().await?;
        Ok(comments)
    }

    /// Add a comment; a missing report is rejected before anything is written
    ///
    /// The existence check and the insert are one statement so concurrent
    /// writers queue on SQLite's write lock instead of failing to upgrade a
    /// read transaction.
    pub async fn create(&self, report_id: i64, data: &CreateComment) -> Result<Comment> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (report_id, user_name, comment_text, created_at)
            SELECT ?, ?, ?, ?
            WHERE EXISTS (SELECT 1 FROM reports WHERE id = ?)
            RETURNING id, report_id, user_name, comment_text, created_at
            "#,
        )
        .bind(report_id)
        .bind(&data.user_name)
        .bind(&data.comment_text)
        .bind(time::now())
        .bind(report_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create comment on report {}: {:?}", report_id, e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound(format!("Report {} not found", report_id)))?;

        tracing::info!("Created comment: {} on report: {}", comment.id, report_id);

        Ok(comment)
    }
}

async fn ensure_report_exists(tx: &mut Transaction<'_, Sqlite>, report_id: i64) -> Result<()> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM reports WHERE id = ?)")
        .bind(report_id)
        .fetch_one(&mut **tx)
        .await?;

    if !exists {
        return Err(AppError::NotFound(format!("Report {} not found", report_id)));
    }
    Ok(())
}
