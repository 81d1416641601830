use sqlx::types::Json;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::core::error::{AppError, Result};
use crate::features::reports::models::{CreateReport, Report, ReportFilter, REPORT_COLUMNS};
use crate::modules::storage::StagedBatch;
use crate::shared::constants::DEFAULT_REPORT_STATUS;
use crate::shared::time;

/// Service for report operations
pub struct ReportService {
    pool: SqlitePool,
}

impl ReportService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a report and move its staged media into place.
    ///
    /// The row is only committed after every file has been promoted. On any
    /// error the transaction rolls back and dropping `media` removes the files.
    pub async fn create(&self, data: &CreateReport, mut media: StagedBatch) -> Result<Report> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            r#"
            INSERT INTO reports (
                category, name, phone, location, description, details,
                latitude, longitude, map_url, status, image_urls, voice_note_url, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {}
            "#,
            REPORT_COLUMNS
        );

        let report = sqlx::query_as::<_, Report>(&sql)
            .bind(&data.category)
            .bind(&data.name)
            .bind(&data.phone)
            .bind(&data.location)
            .bind(&data.description)
            .bind(data.details.as_ref().map(Json))
            .bind(data.latitude)
            .bind(data.longitude)
            .bind(&data.map_url)
            .bind(DEFAULT_REPORT_STATUS)
            .bind(Json(media.image_paths()))
            .bind(media.voice_note_path())
            .bind(time::now())
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create report: {:?}", e);
                AppError::Database(e)
            })?;

        media.promote().await?;

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit report {}: {:?}", report.id, e);
            AppError::Database(e)
        })?;
        media.commit();

        tracing::info!(
            "Created report: {} (category: {}, images: {}, voice note: {})",
            report.id,
            report.category,
            report.image_urls.0.len(),
            report.voice_note_url.is_some()
        );

        Ok(report)
    }

    /// List reports matching every present filter, newest first
    pub async fn list(&self, filter: &ReportFilter) -> Result<Vec<Report>> {
        let mut query: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {} FROM reports WHERE 1 = 1", REPORT_COLUMNS));

        if let Some(category) = &filter.category {
            query.push(" AND category = ").push_bind(category);
        }
        if let Some(status) = &filter.status {
            query.push(" AND status = ").push_bind(status);
        }
        // Stored timestamps are whole milliseconds, the precision julianday() keeps,
        // so bounds are moved inward to the nearest millisecond
        if let Some(from) = filter.created_from {
            query
                .push(" AND julianday(created_at) >= julianday(")
                .push_bind(time::ceil_millis(from))
                .push(")");
        }
        if let Some(until) = filter.created_until {
            query
                .push(" AND julianday(created_at) <= julianday(")
                .push_bind(time::floor_millis(until))
                .push(")");
        }
        query.push(" ORDER BY julianday(created_at) DESC, id DESC");

        let reports = query
            .build_query_as::<Report>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list reports: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(reports)
    }

    /// Get report by ID
    pub async fn get_by_id(&self, id: i64) -> Result<Report> {
        let sql = format!("SELECT {} FROM reports WHERE id = ?", REPORT_COLUMNS);

        sqlx::query_as::<_, Report>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Report {} not found", id)))
    }

    /// Replace the free-text status of a report
    pub async fn update_status(&self, id: i64, status: &str) -> Result<Report> {
        let sql = format!(
            "UPDATE reports SET status = ? WHERE id = ? RETURNING {}",
            REPORT_COLUMNS
        );

        let report = sqlx::query_as::<_, Report>(&sql)
            .bind(status)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update status of report {}: {:?}", id, e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("Report {} not found", id)))?;

        tracing::info!("Report {} status set to '{}'", id, report.status);

        Ok(report)
    }
}
