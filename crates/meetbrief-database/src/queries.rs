//! Database query operations for `MeetBrief`

use crate::models::MeetingRow;
use meetbrief_core::{MeetingId, MeetingStatus};
use meetbrief_store::{StoreError, StoreResult};
use sqlx::PgPool;

/// Meeting record database operations
#[derive(Debug)]
pub struct MeetingQueries;

impl MeetingQueries {
    /// Fetch a meeting row by id
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn fetch(pool: &PgPool, meeting_id: MeetingId) -> StoreResult<Option<MeetingRow>> {
        let query = "SELECT * FROM meetings WHERE id = $1";

        sqlx::query_as::<_, MeetingRow>(query)
            .bind(meeting_id)
            .fetch_optional(pool)
            .await
            .map_err(StoreError::database)
    }

    /// Save the formatted transcript, detected language and derived status
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails or the row is missing.
    pub async fn save_transcript(
        pool: &PgPool,
        meeting_id: MeetingId,
        transcript: &str,
        language: Option<&str>,
        status: MeetingStatus,
    ) -> StoreResult<()> {
        let query = r"
            UPDATE meetings
            SET transcript = $2, language = $3, status = $4, updated_at = now()
            WHERE id = $1
        ";

        let result = sqlx::query(query)
            .bind(meeting_id)
            .bind(transcript)
            .bind(language)
            .bind(status.to_string())
            .execute(pool)
            .await
            .map_err(StoreError::database)?;

        ensure_updated(result.rows_affected(), meeting_id)
    }

    /// Attach the summary, mark completed and clear the error message
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails or the row is missing.
    pub async fn attach_summary(
        pool: &PgPool,
        meeting_id: MeetingId,
        summary: &str,
    ) -> StoreResult<()> {
        let query = r"
            UPDATE meetings
            SET summary = $2, status = $3, error_message = NULL, updated_at = now()
            WHERE id = $1
        ";

        let result = sqlx::query(query)
            .bind(meeting_id)
            .bind(summary)
            .bind(MeetingStatus::Completed.to_string())
            .execute(pool)
            .await
            .map_err(StoreError::database)?;

        ensure_updated(result.rows_affected(), meeting_id)
    }

    /// Mark completed with a degradation message, keeping the transcript
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails or the row is missing.
    pub async fn complete_with_warning(
        pool: &PgPool,
        meeting_id: MeetingId,
        message: &str,
    ) -> StoreResult<()> {
        let query = r"
            UPDATE meetings
            SET status = $2, error_message = $3, updated_at = now()
            WHERE id = $1
        ";

        let result = sqlx::query(query)
            .bind(meeting_id)
            .bind(MeetingStatus::Completed.to_string())
            .bind(message)
            .execute(pool)
            .await
            .map_err(StoreError::database)?;

        ensure_updated(result.rows_affected(), meeting_id)
    }

    /// Mark the record failed
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails or the row is missing.
    pub async fn mark_error(
        pool: &PgPool,
        meeting_id: MeetingId,
        message: &str,
    ) -> StoreResult<()> {
        let query = r"
            UPDATE meetings
            SET status = $2, error_message = $3, updated_at = now()
            WHERE id = $1
        ";

        let result = sqlx::query(query)
            .bind(meeting_id)
            .bind(MeetingStatus::Error.to_string())
            .bind(message)
            .execute(pool)
            .await
            .map_err(StoreError::database)?;

        ensure_updated(result.rows_affected(), meeting_id)
    }
}

fn ensure_updated(rows_affected: u64, meeting_id: MeetingId) -> StoreResult<()> {
    if rows_affected == 0 {
        return Err(StoreError::MeetingNotFound { meeting_id });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_updated() {
        assert!(ensure_updated(1, 7).is_ok());

        let err = ensure_updated(0, 7).unwrap_err();
        assert!(matches!(
            err,
            StoreError::MeetingNotFound { meeting_id: 7 }
        ));
    }
}
