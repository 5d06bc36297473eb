use std::str::FromStr;

use serde::Deserialize;

use shopfloor_core::DomainError;
use shopfloor_manufacturing::{BomComponent, BomOperation};

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    /// `raw` (default) or `finished`.
    pub kind: Option<String>,
    #[serde(default)]
    pub stock_qty: i64,
}

#[derive(Debug, Deserialize)]
pub struct BomComponentRequest {
    pub product_id: String,
    pub qty_per_unit: f64,
}

#[derive(Debug, Deserialize)]
pub struct BomOperationRequest {
    pub name: String,
    pub work_center: Option<String>,
    pub planned_minutes: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct CreateBomRequest {
    pub product_id: String,
    #[serde(default)]
    pub components: Vec<BomComponentRequest>,
    #[serde(default)]
    pub operations: Vec<BomOperationRequest>,
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub product_id: String,
    pub quantity: u32,
    /// `planned` (default) or `confirmed`.
    pub status: Option<String>,
    pub start_date: Option<String>,
    pub deadline: Option<String>,
    pub assignee: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrderRequest {
    pub quantity: Option<u32>,
    pub start_date: Option<String>,
    pub deadline: Option<String>,
    pub assignee: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateWorkOrderRequest {
    pub mo_id: String,
    pub operation: String,
    pub work_center: Option<String>,
    #[serde(default)]
    pub planned_minutes: u32,
}

#[derive(Debug, Deserialize)]
pub struct WorkOrderStatusRequest {
    pub status: String,
    pub operator: Option<String>,
    pub comments: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StockMovementRequest {
    pub product_id: String,
    /// `in` or `out`.
    pub direction: String,
    pub quantity: u64,
    pub reference: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StatusQuery {
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LedgerQuery {
    pub product_id: Option<String>,
    pub limit: Option<usize>,
}

// -------------------------
// Parsing helpers
// -------------------------

/// Parse an id, status or kind; failures become the matching JSON error.
pub fn parse<T>(raw: &str) -> Result<T, axum::response::Response>
where
    T: FromStr<Err = DomainError>,
{
    raw.trim()
        .parse()
        .map_err(|e: DomainError| errors::service_error_to_response(e.into()))
}

pub fn parse_opt<T>(raw: Option<&str>) -> Result<Option<T>, axum::response::Response>
where
    T: FromStr<Err = DomainError>,
{
    raw.map(parse).transpose()
}

pub fn bom_components(
    lines: Vec<BomComponentRequest>,
) -> Result<Vec<BomComponent>, axum::response::Response> {
    lines
        .into_iter()
        .map(|l| {
            Ok(BomComponent {
                product_id: parse(&l.product_id)?,
                qty_per_unit: l.qty_per_unit,
            })
        })
        .collect()
}

pub fn bom_operations(ops: Vec<BomOperationRequest>) -> Vec<BomOperation> {
    ops.into_iter()
        .map(|o| BomOperation {
            name: o.name,
            work_center: o.work_center,
            planned_minutes: o.planned_minutes,
        })
        .collect()
}
