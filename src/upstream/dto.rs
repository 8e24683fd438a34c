//! Raw JSON shapes returned by the upstream REST API (§6). These are
//! deserialize-only; [`crate::parsers`] turns them into canonical records.

use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradesResponse {
    pub contracts: Vec<TradeContractDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeContractDto {
    pub contract_id: String,
    pub contract_name: String,
    pub delivery_start: String,
    pub delivery_end: String,
    pub trades: Vec<TradeDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeDto {
    pub trade_id: String,
    pub trade_time: String,
    pub trade_updated_at: String,
    pub trade_state: String,
    pub revision_number: i64,
    pub price: Decimal,
    pub volume: Decimal,
    pub trade_phase: Option<String>,
    #[serde(rename = "crossPx")]
    pub cross_px: Option<bool>,
    #[serde(default)]
    pub legs: Vec<TradeLegDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeLegDto {
    pub delivery_area: String,
    pub reference_order_id: Option<String>,
    pub trade_side: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionsResponse {
    pub contracts: Vec<RevisionContractDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionContractDto {
    pub contract_id: String,
    pub contract_name: String,
    pub delivery_start: String,
    pub delivery_end: String,
    pub orders: Vec<OrderDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDto {
    pub order_id: String,
    pub side: String,
    pub created_time: String,
    pub revisions: Vec<RevisionDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionDto {
    pub revision_number: i64,
    pub action: String,
    pub price: Decimal,
    pub volume: Decimal,
    pub updated_time: String,
    pub priority_time: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractSummaryDto {
    pub contract_id: String,
    pub contract_name: String,
    pub delivery_start: String,
    pub delivery_end: String,
}

#[derive(Debug, Deserialize)]
pub struct ContractsResponse {
    pub contracts: Vec<ContractSummaryDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderBookResponse {
    pub contract_id: String,
    pub delivery_area: String,
    pub updated_at: String,
    pub revisions: Vec<BookRevisionDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRevisionDto {
    pub revision: i64,
    pub is_snapshot: bool,
    #[serde(default)]
    pub buy_orders: Vec<BookOrderDto>,
    #[serde(default)]
    pub sell_orders: Vec<BookOrderDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookOrderDto {
    pub order_id: String,
    pub price: Decimal,
    pub volume: Decimal,
    pub updated_time: String,
    pub priority_time: Option<String>,
    #[serde(default)]
    pub deleted: bool,
}
