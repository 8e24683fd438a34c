//! Cold (columnar, Snappy-compressed) tick store.
//!
//! Files live at `{cold_store_root}/{area}/{date}/{contract_id}.parquet`.
//! A path is write-once per `(area, date, contract_id)` — the historical
//! archival worker pool schedules at most one worker per contract, so
//! concurrent writers to the same path never occur.

use crate::core_types::Side;
use crate::models::OrderFlowTick;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use parquet::file::properties::WriterProperties;
use parquet::file::reader::{FileReader, SerializedFileReader};
use parquet::file::writer::SerializedFileWriter;
use parquet::record::RowAccessor;
use parquet::schema::parser::parse_message_type;
use parquet_derive::ParquetRecordWriter;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(ParquetRecordWriter)]
struct TickRow {
    tick_id: String,
    contract_id: String,
    delivery_area: String,
    order_id: String,
    side: String,
    price: String,
    volume: String,
    updated_time_millis: i64,
    priority_time_millis: i64,
    is_snapshot: bool,
    is_deleted: bool,
    revision_number: i64,
    root_updated_at_millis: i64,
}

const TICK_SCHEMA: &str = "
message tick {
    REQUIRED BYTE_ARRAY tick_id (UTF8);
    REQUIRED BYTE_ARRAY contract_id (UTF8);
    REQUIRED BYTE_ARRAY delivery_area (UTF8);
    REQUIRED BYTE_ARRAY order_id (UTF8);
    REQUIRED BYTE_ARRAY side (UTF8);
    REQUIRED BYTE_ARRAY price (UTF8);
    REQUIRED BYTE_ARRAY volume (UTF8);
    REQUIRED INT64 updated_time_millis;
    REQUIRED INT64 priority_time_millis;
    REQUIRED BOOLEAN is_snapshot;
    REQUIRED BOOLEAN is_deleted;
    REQUIRED INT64 revision_number;
    REQUIRED INT64 root_updated_at_millis;
}
";

pub fn tick_file_path(root: &str, area: &str, date: NaiveDate, contract_id: &str) -> PathBuf {
    Path::new(root)
        .join(area)
        .join(date.format("%Y-%m-%d").to_string())
        .join(format!("{contract_id}.parquet"))
}

/// Write a contract's full set of archived ticks as one Snappy-compressed
/// Parquet file. Schema equals [`OrderFlowTick`].
pub fn write_tick_file(
    root: &str,
    area: &str,
    date: NaiveDate,
    contract_id: &str,
    ticks: &[OrderFlowTick],
) -> anyhow::Result<()> {
    let path = tick_file_path(root, area, date, contract_id);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let rows: Vec<TickRow> = ticks
        .iter()
        .map(|tick| TickRow {
            tick_id: tick.tick_id.clone(),
            contract_id: tick.contract_id.clone(),
            delivery_area: tick.delivery_area.clone(),
            order_id: tick.order_id.clone(),
            side: tick.side.as_str().to_string(),
            price: tick.price.to_string(),
            volume: tick.volume.to_string(),
            updated_time_millis: tick.updated_time.timestamp_millis(),
            priority_time_millis: tick.priority_time.timestamp_millis(),
            is_snapshot: tick.is_snapshot,
            is_deleted: tick.is_deleted,
            revision_number: tick.revision_number,
            root_updated_at_millis: tick.root_updated_at.timestamp_millis(),
        })
        .collect();

    let schema = Arc::new(parse_message_type(TICK_SCHEMA)?);
    let props = Arc::new(
        WriterProperties::builder()
            .set_compression(parquet::basic::Compression::SNAPPY)
            .build(),
    );

    let file = File::create(&path)?;
    let mut writer = SerializedFileWriter::new(file, schema, props)?;
    let mut row_group = writer.next_row_group()?;
    rows.as_slice().write_to_row_group(&mut row_group)?;
    row_group.close()?;
    writer.close()?;

    Ok(())
}

/// Read back a contract's archived ticks, or `None` if no file exists for
/// `(area, date, contract_id)` — the caller then falls back to the hot
/// store.
pub fn read_tick_file(
    root: &str,
    area: &str,
    date: NaiveDate,
    contract_id: &str,
) -> anyhow::Result<Option<Vec<OrderFlowTick>>> {
    let path = tick_file_path(root, area, date, contract_id);
    if !path.exists() {
        return Ok(None);
    }

    let file = File::open(&path)?;
    let reader = SerializedFileReader::new(file)?;
    let mut ticks = Vec::new();

    for row in reader.get_row_iter(None)? {
        let row = row?;
        let side: Side = row.get_string(4)?.parse().unwrap_or(Side::Buy);
        let price = row.get_string(5)?.parse()?;
        let volume = row.get_string(6)?.parse()?;

        ticks.push(OrderFlowTick {
            tick_id: row.get_string(0)?.clone(),
            contract_id: row.get_string(1)?.clone(),
            delivery_area: row.get_string(2)?.clone(),
            order_id: row.get_string(3)?.clone(),
            side,
            price,
            volume,
            updated_time: millis_to_utc(row.get_long(7)?),
            priority_time: millis_to_utc(row.get_long(8)?),
            is_snapshot: row.get_bool(9)?,
            is_deleted: row.get_bool(10)?,
            revision_number: row.get_long(11)?,
            root_updated_at: millis_to_utc(row.get_long(12)?),
        });
    }

    Ok(Some(ticks))
}

fn millis_to_utc(millis: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(millis).single().unwrap_or_else(Utc::now)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_layout_matches_spec() {
        let date = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        let path = tick_file_path("data/order_flow", "SE3", date, "C123");
        assert_eq!(path, PathBuf::from("data/order_flow/SE3/2025-02-01/C123.parquet"));
    }
}
