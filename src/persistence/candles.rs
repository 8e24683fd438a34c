use crate::core_types::ContractType;
use crate::models::MarketCandle;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

/// Insert-or-replace on `(contract_id, timestamp, area)`. Re-derivation is
/// idempotent: every derived column is overwritten on conflict.
pub async fn upsert_candles(pool: &PgPool, batch: &[MarketCandle]) -> Result<(), sqlx::Error> {
    if batch.is_empty() {
        return Ok(());
    }

    let mut tx = pool.begin().await?;
    for candle in batch {
        sqlx::query(
            r#"
            INSERT INTO market_candles (
                contract_id, area, timestamp, contract_type,
                open, high, low, close, volume, vwap, trade_count
            ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11)
            ON CONFLICT (contract_id, timestamp, area) DO UPDATE SET
                contract_type = EXCLUDED.contract_type,
                open = EXCLUDED.open,
                high = EXCLUDED.high,
                low = EXCLUDED.low,
                close = EXCLUDED.close,
                volume = EXCLUDED.volume,
                vwap = EXCLUDED.vwap,
                trade_count = EXCLUDED.trade_count
            "#,
        )
        .bind(&candle.contract_id)
        .bind(&candle.area)
        .bind(candle.timestamp)
        .bind(candle.contract_type.as_str())
        .bind(candle.open)
        .bind(candle.high)
        .bind(candle.low)
        .bind(candle.close)
        .bind(candle.volume)
        .bind(candle.vwap)
        .bind(candle.trade_count)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    Ok(())
}

/// Full candle series for a contract, sorted by timestamp ascending.
pub async fn candles_for_contract(
    pool: &PgPool,
    area: &str,
    contract_id: &str,
) -> Result<Vec<MarketCandle>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT contract_id, area, timestamp, contract_type,
               open, high, low, close, volume, vwap, trade_count
        FROM market_candles
        WHERE area = $1 AND contract_id = $2
        ORDER BY timestamp ASC
        "#,
    )
    .bind(area)
    .bind(contract_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(row_to_candle).collect())
}

/// Most recent `limit` candles for an area across all contracts, newest
/// first — the live runner's working set (§4.K). The live runner is
/// scoped per area, not per contract, since the tradable near-term
/// contract rotates constantly in an intraday market.
pub async fn latest_candles_for_area(
    pool: &PgPool,
    area: &str,
    limit: i64,
) -> Result<Vec<MarketCandle>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT contract_id, area, timestamp, contract_type,
               open, high, low, close, volume, vwap, trade_count
        FROM market_candles
        WHERE area = $1
        ORDER BY timestamp DESC
        LIMIT $2
        "#,
    )
    .bind(area)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(row_to_candle).collect())
}

/// The minute-bucketed OHLCV aggregation at the heart of the candle
/// pipeline: groups trades in `[from, to)` by `(contract_id,
/// date_trunc('minute', trade_time), contract_type)`.
pub async fn aggregate_minute_candles(
    pool: &PgPool,
    area: &str,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<Vec<MarketCandle>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT
            contract_id,
            $1::text AS area,
            date_trunc('minute', trade_time) AS bucket,
            contract_type,
            (array_agg(price ORDER BY trade_time ASC))[1] AS open,
            (array_agg(price ORDER BY trade_time DESC))[1] AS close,
            MAX(price) AS high,
            MIN(price) AS low,
            SUM(volume) AS volume,
            SUM(price * volume) / NULLIF(SUM(volume), 0) AS vwap,
            COUNT(*) AS trade_count
        FROM trades
        WHERE delivery_area = $1 AND trade_time >= $2 AND trade_time < $3
        GROUP BY contract_id, bucket, contract_type
        "#,
    )
    .bind(area)
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|row| {
            let contract_type_str: String = row.get("contract_type");
            MarketCandle {
                contract_id: row.get("contract_id"),
                area: row.get("area"),
                timestamp: row.get("bucket"),
                contract_type: contract_type_str.parse().unwrap_or(ContractType::Other),
                open: row.get("open"),
                high: row.get("high"),
                low: row.get("low"),
                close: row.get("close"),
                volume: row.get("volume"),
                vwap: row.get("vwap"),
                trade_count: row.get("trade_count"),
            }
        })
        .collect())
}

fn row_to_candle(row: &sqlx::postgres::PgRow) -> MarketCandle {
    let contract_type_str: String = row.get("contract_type");
    MarketCandle {
        contract_id: row.get("contract_id"),
        area: row.get("area"),
        timestamp: row.get("timestamp"),
        contract_type: contract_type_str.parse().unwrap_or(ContractType::Other),
        open: row.get("open"),
        high: row.get("high"),
        low: row.get("low"),
        close: row.get("close"),
        volume: row.get("volume"),
        vwap: row.get("vwap"),
        trade_count: row.get("trade_count"),
    }
}
