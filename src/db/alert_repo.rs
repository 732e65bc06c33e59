use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{AlertCondition, PriceAlert};

/// Create a new active alert.
pub async fn insert_alert(
    pool: &PgPool,
    asset: &str,
    condition: AlertCondition,
    threshold_price: Decimal,
) -> anyhow::Result<PriceAlert> {
    let alert = sqlx::query_as::<_, PriceAlert>(
        r#"
        INSERT INTO price_alerts (asset, condition, threshold_price)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(asset)
    .bind(condition.to_string())
    .bind(threshold_price)
    .fetch_one(pool)
    .await?;

    Ok(alert)
}

/// All alerts still armed.
pub async fn get_active_alerts(pool: &PgPool) -> anyhow::Result<Vec<PriceAlert>> {
    let alerts = sqlx::query_as::<_, PriceAlert>(
        "SELECT * FROM price_alerts WHERE active ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    Ok(alerts)
}

/// Disarm an alert. `triggered` distinguishes a fired alert from a
/// user-cancelled one.
pub async fn deactivate_alert(pool: &PgPool, id: Uuid, triggered: bool) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        UPDATE price_alerts
        SET active = FALSE,
            triggered_at = CASE WHEN $2 THEN NOW() ELSE triggered_at END
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(triggered)
    .execute(pool)
    .await?;

    Ok(())
}

/// Remove an alert entirely. Returns false when no row matched.
pub async fn delete_alert(pool: &PgPool, id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query("DELETE FROM price_alerts WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
