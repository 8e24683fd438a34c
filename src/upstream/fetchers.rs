use crate::upstream::client::UpstreamClient;
use crate::upstream::dto::{ContractsResponse, OrderBookResponse, RevisionsResponse, TradesResponse};
use async_stream::stream;
use chrono::{DateTime, Duration as ChronoDuration, SecondsFormat, Utc};
use futures::Stream;
use reqwest::Method;

const TRADES_PATH: &str = "/api/v2/Intraday/Trades/ByDeliveryStart";
const REVISIONS_PATH: &str = "/api/v2/Intraday/OrderRevisions/ByUpdatedTime";
const CONTRACTS_PATH: &str = "/api/v2/Intraday/OrderBook/ContractsIds/ByArea";
const ORDER_BOOK_PATH: &str = "/api/v2/Intraday/OrderBook/ByContractId";

fn iso(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Single call: completed trades in `[from, to)` for one area.
pub async fn trades_by_delivery_start(
    client: &UpstreamClient,
    area: &str,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<TradesResponse, crate::error::UpstreamError> {
    let from_s = iso(from);
    let to_s = iso(to);
    let params = [
        ("deliveryStartFrom", from_s.as_str()),
        ("deliveryStartTo", to_s.as_str()),
        ("areas", area),
    ];
    let value = client.do_request(Method::GET, TRADES_PATH, &params).await?;
    serde_json::from_value(value).map_err(|e| crate::error::UpstreamError::Parse(e.to_string()))
}

/// Lazy, finite, restartable sequence of revision slices covering `[from,
/// to)`, each at most `slice_cap` wide (§A.3's configurable revision
/// chunk size). A slice that fails to fetch or parse is logged and
/// skipped — the sequence itself never terminates early because of it.
pub fn order_revisions_by_updated_time<'a>(
    client: &'a UpstreamClient,
    area: String,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    slice_cap: ChronoDuration,
) -> impl Stream<Item = RevisionsResponse> + 'a {
    stream! {
        let mut slice_start = from;
        while slice_start < to {
            let slice_end = std::cmp::min(slice_start + slice_cap, to);
            let from_s = iso(slice_start);
            let to_s = iso(slice_end);
            let params = [
                ("area", area.as_str()),
                ("updatedTimeFrom", from_s.as_str()),
                ("updatedTimeTo", to_s.as_str()),
            ];

            match client.do_request(Method::GET, REVISIONS_PATH, &params).await {
                Ok(value) => match serde_json::from_value::<RevisionsResponse>(value) {
                    Ok(parsed) => yield parsed,
                    Err(e) => tracing::warn!(
                        area = %area, slice_start = %slice_start, slice_end = %slice_end,
                        "failed to parse revision slice: {e}"
                    ),
                },
                Err(e) => tracing::warn!(
                    area = %area, slice_start = %slice_start, slice_end = %slice_end,
                    "failed to fetch revision slice: {e}"
                ),
            }

            slice_start = slice_end;
        }
    }
}

/// Single call: contracts open on `(area, date)`.
pub async fn contracts_by_area(
    client: &UpstreamClient,
    area: &str,
    date: chrono::NaiveDate,
) -> Result<ContractsResponse, crate::error::UpstreamError> {
    let date_s = date.format("%Y-%m-%d").to_string();
    let params = [("area", area), ("deliveryDateUtc", date_s.as_str())];
    let value = client.do_request(Method::GET, CONTRACTS_PATH, &params).await?;
    serde_json::from_value(value).map_err(|e| crate::error::UpstreamError::Parse(e.to_string()))
}

/// Single call, potentially large: full revision history for one contract.
pub async fn order_book_by_contract_id(
    client: &UpstreamClient,
    area: &str,
    contract_id: &str,
    date: chrono::NaiveDate,
) -> Result<OrderBookResponse, crate::error::UpstreamError> {
    let date_s = date.format("%Y-%m-%d").to_string();
    let params = [
        ("area", area),
        ("contractId", contract_id),
        ("deliveryDateUtc", date_s.as_str()),
    ];
    let value = client.do_request(Method::GET, ORDER_BOOK_PATH, &params).await?;
    serde_json::from_value(value).map_err(|e| crate::error::UpstreamError::Parse(e.to_string()))
}
