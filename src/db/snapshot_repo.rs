use sqlx::PgPool;

use crate::models::AssetSnapshot;

/// Append one cycle's snapshots. Each row carries its own insert timestamp.
pub async fn insert_snapshots(pool: &PgPool, snapshots: &[AssetSnapshot]) -> anyhow::Result<()> {
    for snap in snapshots {
        sqlx::query(
            r#"
            INSERT INTO asset_snapshots
                (asset, free_quantity, average_price, total_cost,
                 current_price, current_value, profit_loss, percent_change,
                 history_truncated)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(&snap.asset)
        .bind(snap.free_quantity)
        .bind(snap.average_price)
        .bind(snap.total_cost)
        .bind(snap.current_price)
        .bind(snap.current_value)
        .bind(snap.profit_loss)
        .bind(snap.percent_change)
        .bind(snap.history_truncated)
        .execute(pool)
        .await?;
    }

    Ok(())
}
