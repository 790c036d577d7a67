use sqlx::PgPool;

use crate::{errors::Result, models::StorageAccount};

pub struct StorageQueries;

impl StorageQueries {
    /// Inserts a zeroed row. Returns `false` when the user already had one.
    pub async fn insert_account(pool: &PgPool, user_id: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO storage (user_id, used_storage, total_files)
            VALUES ($1, 0, 0)
            ON CONFLICT (user_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn find_by_user(pool: &PgPool, user_id: &str) -> Result<Option<StorageAccount>> {
        let account = sqlx::query_as::<_, StorageAccount>(
            "SELECT user_id, used_storage, total_files FROM storage WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(account)
    }

    /// Applies the delta in one statement so concurrent updates to the same
    /// row serialize on the row lock instead of overwriting each other.
    pub async fn apply_delta(
        pool: &PgPool,
        user_id: &str,
        delta: i64,
    ) -> Result<Option<StorageAccount>> {
        let account = sqlx::query_as::<_, StorageAccount>(
            r#"
            UPDATE storage
            SET used_storage = GREATEST(used_storage + $2, 0),
                total_files = GREATEST(total_files + SIGN($2)::BIGINT, 0)
            WHERE user_id = $1
            RETURNING user_id, used_storage, total_files
            "#,
        )
        .bind(user_id)
        .bind(delta)
        .fetch_optional(pool)
        .await?;

        Ok(account)
    }

    /// Moves only the file count. Used for zero-byte objects, which carry
    /// no byte delta.
    pub async fn adjust_file_count(
        pool: &PgPool,
        user_id: &str,
        delta: i64,
    ) -> Result<Option<StorageAccount>> {
        let account = sqlx::query_as::<_, StorageAccount>(
            r#"
            UPDATE storage
            SET total_files = GREATEST(total_files + $2, 0)
            WHERE user_id = $1
            RETURNING user_id, used_storage, total_files
            "#,
        )
        .bind(user_id)
        .bind(delta)
        .fetch_optional(pool)
        .await?;

        Ok(account)
    }

    pub async fn overwrite_counters(
        pool: &PgPool,
        user_id: &str,
        used_storage: i64,
        total_files: i64,
    ) -> Result<Option<StorageAccount>> {
        let account = sqlx::query_as::<_, StorageAccount>(
            r#"
            UPDATE storage
            SET used_storage = $2, total_files = $3
            WHERE user_id = $1
            RETURNING user_id, used_storage, total_files
            "#,
        )
        .bind(user_id)
        .bind(used_storage.max(0))
        .bind(total_files.max(0))
        .fetch_optional(pool)
        .await?;

        Ok(account)
    }

    pub async fn ping(pool: &PgPool) -> Result<()> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }
}
