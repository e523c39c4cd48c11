//! Bill models for the buy/sell workflow

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Item;

/// Direction of a bill: stock coming in (buy) or going out (sell)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BillType {
    Buy,
    Sell,
}

impl BillType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillType::Buy => "buy",
            BillType::Sell => "sell",
        }
    }

    /// Buy bills are priced at the buying price, sell bills at the selling price
    pub fn unit_price(&self, item: &Item) -> Decimal {
        match self {
            BillType::Buy => item.buying_price,
            BillType::Sell => item.selling_price,
        }
    }
}

impl std::fmt::Display for BillType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BillType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" => Ok(BillType::Buy),
            "sell" => Ok(BillType::Sell),
            other => Err(format!("unknown bill type '{}', expected buy or sell", other)),
        }
    }
}

/// A bill header as listed by `GET /bill/`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Bill {
    pub id: i64,
    pub bill_id: String,
    pub bill_type: BillType,
    #[serde(with = "crate::types::timestamp")]
    pub created_at: NaiveDateTime,
}

/// Response of `POST /bill/start`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StartBillResponse {
    pub bill_id: String,
    #[serde(alias = "bull_type")]
    pub bill_type: BillType,
    #[serde(default)]
    pub message: String,
}

/// Body of `POST /bill/item`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BillItemAction {
    pub bill_id: String,
    pub model_number: String,
    pub quantity: u32,
}

/// One printed line of a persisted bill
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PrintedBillItem {
    pub item: String,
    pub quantity: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

/// Response of `GET /bill/{bill_id}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PrintBillResponse {
    pub bill_id: String,
    pub bill_type: BillType,
    #[serde(default)]
    pub items: Vec<PrintedBillItem>,
    #[serde(with = "rust_decimal::serde::float")]
    pub grand_total: Decimal,
}
