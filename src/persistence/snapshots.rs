use crate::models::OrderBookSnapshot;
use sqlx::PgPool;

/// Bulk insert — snapshots are append-only forensic records, never updated.
pub async fn insert_snapshots(
    pool: &PgPool,
    batch: &[OrderBookSnapshot],
) -> Result<(), sqlx::Error> {
    if batch.is_empty() {
        return Ok(());
    }

    let mut tx = pool.begin().await?;
    for snapshot in batch {
        let bids = serde_json::to_value(&snapshot.bids).unwrap_or(serde_json::Value::Array(vec![]));
        let asks = serde_json::to_value(&snapshot.asks).unwrap_or(serde_json::Value::Array(vec![]));

        sqlx::query(
            r#"
            INSERT INTO order_book_snapshots (
                snapshot_id, contract_id, area, timestamp, revision_number,
                bids, asks, is_native
            ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
            "#,
        )
        .bind(snapshot.snapshot_id)
        .bind(&snapshot.contract_id)
        .bind(&snapshot.area)
        .bind(snapshot.timestamp)
        .bind(snapshot.revision_number)
        .bind(bids)
        .bind(asks)
        .bind(snapshot.is_native)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    Ok(())
}

