//! DDL for the relational (hot) store. Applied once at startup; every
//! statement is `IF NOT EXISTS` so repeated calls across process restarts
//! are harmless.

use sqlx::PgPool;

pub async fn init_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("initializing PostgreSQL schema");

    sqlx::query(CREATE_TRADES_TABLE).execute(pool).await?;
    sqlx::query(CREATE_MARKET_CANDLES_TABLE).execute(pool).await?;
    sqlx::query(CREATE_ORDER_FLOW_TICKS_TABLE).execute(pool).await?;
    sqlx::query(CREATE_ORDER_BOOK_SNAPSHOTS_TABLE).execute(pool).await?;
    sqlx::query(CREATE_ORDER_CONTRACTS_TABLE).execute(pool).await?;
    sqlx::query(CREATE_TRADE_FETCH_STATE_TABLE).execute(pool).await?;
    sqlx::query(CREATE_CANDLE_GEN_STATE_TABLE).execute(pool).await?;
    sqlx::query(CREATE_ORDER_FLOW_SYNC_STATE_TABLE).execute(pool).await?;

    tracing::info!("PostgreSQL schema ready");
    Ok(())
}

const CREATE_TRADES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS trades (
    trade_id            TEXT NOT NULL,
    delivery_area       TEXT NOT NULL,
    trade_side          TEXT NOT NULL,
    contract_id         TEXT NOT NULL,
    contract_name       TEXT NOT NULL,
    delivery_start      TIMESTAMPTZ NOT NULL,
    delivery_end        TIMESTAMPTZ NOT NULL,
    duration_minutes    DOUBLE PRECISION NOT NULL,
    contract_type       TEXT NOT NULL,
    price               NUMERIC NOT NULL,
    volume              NUMERIC NOT NULL,
    trade_time          TIMESTAMPTZ NOT NULL,
    trade_updated_at    TIMESTAMPTZ NOT NULL,
    state               TEXT NOT NULL,
    revision_number     BIGINT NOT NULL,
    phase               TEXT,
    cross_exchange      BOOLEAN NOT NULL DEFAULT FALSE,
    reference_order_id  TEXT,
    PRIMARY KEY (trade_id, delivery_area, trade_side)
)
"#;

const CREATE_MARKET_CANDLES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS market_candles (
    contract_id     TEXT NOT NULL,
    area            TEXT NOT NULL,
    timestamp       TIMESTAMPTZ NOT NULL,
    contract_type   TEXT NOT NULL,
    open            NUMERIC NOT NULL,
    high            NUMERIC NOT NULL,
    low             NUMERIC NOT NULL,
    close           NUMERIC NOT NULL,
    volume          NUMERIC NOT NULL,
    vwap            NUMERIC NOT NULL,
    trade_count     BIGINT NOT NULL,
    PRIMARY KEY (contract_id, timestamp, area)
)
"#;

const CREATE_ORDER_FLOW_TICKS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS order_flow_ticks (
    tick_id         TEXT PRIMARY KEY,
    contract_id     TEXT NOT NULL,
    delivery_area   TEXT NOT NULL,
    order_id        TEXT NOT NULL,
    side            TEXT NOT NULL,
    price           NUMERIC NOT NULL,
    volume          NUMERIC NOT NULL,
    updated_time    TIMESTAMPTZ NOT NULL,
    priority_time   TIMESTAMPTZ NOT NULL,
    is_snapshot     BOOLEAN NOT NULL DEFAULT FALSE,
    is_deleted      BOOLEAN NOT NULL DEFAULT FALSE,
    revision_number BIGINT NOT NULL,
    root_updated_at TIMESTAMPTZ NOT NULL
)
"#;

const CREATE_ORDER_BOOK_SNAPSHOTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS order_book_snapshots (
    snapshot_id     UUID PRIMARY KEY,
    contract_id     TEXT NOT NULL,
    area            TEXT NOT NULL,
    timestamp       TIMESTAMPTZ NOT NULL,
    revision_number BIGINT NOT NULL,
    bids            JSONB NOT NULL,
    asks            JSONB NOT NULL,
    is_native       BOOLEAN NOT NULL DEFAULT TRUE
)
"#;

const CREATE_ORDER_CONTRACTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS order_contracts (
    contract_id     TEXT NOT NULL,
    delivery_area   TEXT NOT NULL,
    contract_name   TEXT NOT NULL,
    delivery_start  TIMESTAMPTZ NOT NULL,
    delivery_end    TIMESTAMPTZ NOT NULL,
    contract_type   TEXT NOT NULL,
    volume_unit     TEXT NOT NULL,
    price_unit      TEXT NOT NULL,
    open_ts         TIMESTAMPTZ NOT NULL,
    close_ts        TIMESTAMPTZ NOT NULL,
    is_archived     BOOLEAN NOT NULL DEFAULT FALSE,
    updated_at      TIMESTAMPTZ NOT NULL,
    PRIMARY KEY (contract_id, delivery_area)
)
"#;

const CREATE_TRADE_FETCH_STATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS trade_fetch_state (
    area                TEXT PRIMARY KEY,
    last_fetched_time   TIMESTAMPTZ,
    status              TEXT NOT NULL DEFAULT 'running',
    last_error          TEXT
)
"#;

const CREATE_CANDLE_GEN_STATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS candle_gen_state (
    area                    TEXT PRIMARY KEY,
    last_generated_time     TIMESTAMPTZ
)
"#;

const CREATE_ORDER_FLOW_SYNC_STATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS order_flow_sync_state (
    area                TEXT PRIMARY KEY,
    last_archived_time  TIMESTAMPTZ,
    last_realtime_time  TIMESTAMPTZ
)
"#;
