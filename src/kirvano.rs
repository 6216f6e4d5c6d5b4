// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Kirvano checkout webhooks turned into sale records.

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{LedgerError, LedgerResult};
use crate::models::{NewRecord, RecordKind};
use crate::reader::LedgerReader;
use crate::utils::parse_timestamp;

pub const DEFAULT_CATEGORY: &str = "kirvano";

static NOT_NUMERIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^0-9,.\-]").expect("static regex"));

#[derive(Debug, Clone, Deserialize)]
pub struct KirvanoProduct {
    pub name: String,
    #[serde(default)]
    pub offer_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KirvanoEvent {
    pub event: String,
    pub sale_id: String,
    pub created_at: String,
    pub total_price: Value,
    #[serde(rename = "type", default)]
    pub sale_type: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub products: Vec<KirvanoProduct>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub created: usize,
    pub duplicates: usize,
    pub skipped: usize,
}

/// A webhook body holds one event; exported batches hold an array.
pub fn parse_payloads(raw: &str) -> LedgerResult<Vec<KirvanoEvent>> {
    let v: Value = serde_json::from_str(raw)?;
    let events = match v {
        Value::Array(items) => items
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<KirvanoEvent>, _>>()?,
        other => vec![serde_json::from_value(other)?],
    };
    Ok(events)
}

/// Parses `97.00`, `R$ 97,00`, `1.234,56` or `1,234.56`. The last
/// separator is the decimal one.
pub fn parse_price(v: &Value) -> LedgerResult<Decimal> {
    let raw = match v {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        other => {
            return Err(LedgerError::validation(format!(
                "total_price must be a string or number, got {}",
                other
            )));
        }
    };
    let cleaned = NOT_NUMERIC.replace_all(&raw, "").to_string();
    let normalized = match (cleaned.rfind(','), cleaned.rfind('.')) {
        (Some(c), Some(d)) if c > d => cleaned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (Some(_), None) => cleaned.replace(',', "."),
        _ => cleaned,
    };
    let price = normalized
        .parse::<Decimal>()
        .map_err(|_| LedgerError::validation(format!("unparsable total_price '{}'", raw)))?;
    Ok(price.round_dp(2))
}

/// `None` for events that do not move money.
pub fn to_new_record(owner_id: i64, ev: &KirvanoEvent) -> LedgerResult<Option<NewRecord>> {
    let (sign, suffix) = match ev.event.trim().to_ascii_uppercase().as_str() {
        "SALE_APPROVED" => (Decimal::ONE, ""),
        "SALE_REFUNDED" => (Decimal::NEGATIVE_ONE, ":refund"),
        "SALE_CHARGEBACK" => (Decimal::NEGATIVE_ONE, ":chargeback"),
        _ => return Ok(None),
    };
    if ev.sale_id.trim().is_empty() {
        return Err(LedgerError::validation("sale_id must not be empty"));
    }
    let amount = parse_price(&ev.total_price)? * sign;
    let occurred_at = parse_timestamp(&ev.created_at).map_err(|e| {
        LedgerError::validation(format!("sale {}: {}", ev.sale_id, e))
    })?;
    let category = ev
        .products
        .first()
        .map(|p| p.name.trim())
        .filter(|n| !n.is_empty())
        .unwrap_or(DEFAULT_CATEGORY)
        .to_string();
    let is_recurring = ev
        .sale_type
        .as_deref()
        .is_some_and(|t| t.eq_ignore_ascii_case("RECURRING"));
    let description = match &ev.payment_method {
        Some(m) => format!("Kirvano {} ({})", ev.event.to_ascii_lowercase(), m.to_ascii_lowercase()),
        None => format!("Kirvano {}", ev.event.to_ascii_lowercase()),
    };
    Ok(Some(NewRecord {
        owner_id,
        kind: RecordKind::Sale,
        category,
        amount,
        occurred_at,
        is_recurring,
        description: Some(description),
        external_id: Some(format!("kirvano:{}{}", ev.sale_id.trim(), suffix)),
    }))
}

/// Records every money-moving event once; re-delivered events are counted
/// as duplicates.
pub fn ingest(reader: &LedgerReader<'_>, owner_id: i64, events: &[KirvanoEvent]) -> LedgerResult<IngestReport> {
    let mut report = IngestReport::default();
    for ev in events {
        let Some(new) = to_new_record(owner_id, ev)? else {
            debug!(event = %ev.event, sale_id = %ev.sale_id, "ignoring event");
            report.skipped += 1;
            continue;
        };
        let ext = new.external_id.clone().unwrap_or_default();
        if reader.has_external(owner_id, &ext)? {
            debug!(external_id = %ext, "already recorded");
            report.duplicates += 1;
            continue;
        }
        reader.record(new)?;
        report.created += 1;
    }
    info!(owner_id, created = report.created, duplicates = report.duplicates, skipped = report.skipped, "kirvano ingest done");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::NoCache;
    use crate::filter::RecordFilter;
    use crate::store::MemoryStore;
    use serde_json::json;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    const APPROVED: &str = r#"{
        "event": "SALE_APPROVED",
        "sale_id": "ABC123",
        "created_at": "2025-06-10 14:22:05",
        "total_price": "R$ 97,00",
        "type": "RECURRING",
        "payment_method": "PIX",
        "products": [{"name": "Curso de Tráfego", "offer_name": "Mensal"}]
    }"#;

    #[test]
    fn prices() {
        assert_eq!(parse_price(&json!("R$ 1.234,56")).unwrap(), d("1234.56"));
        assert_eq!(parse_price(&json!("1,234.56")).unwrap(), d("1234.56"));
        assert_eq!(parse_price(&json!("97.00")).unwrap(), d("97.00"));
        assert_eq!(parse_price(&json!(49.9)).unwrap(), d("49.90"));
        assert!(matches!(parse_price(&json!("grátis")), Err(LedgerError::Validation(_))));
        assert!(parse_price(&json!(null)).is_err());
    }

    #[test]
    fn approved_sale_maps_to_record() {
        let evs = parse_payloads(APPROVED).unwrap();
        let rec = to_new_record(3, &evs[0]).unwrap().unwrap();
        assert_eq!(rec.kind, RecordKind::Sale);
        assert_eq!(rec.category, "Curso de Tráfego");
        assert_eq!(rec.amount, d("97.00"));
        assert!(rec.is_recurring);
        assert_eq!(rec.external_id.as_deref(), Some("kirvano:ABC123"));
        assert_eq!(rec.occurred_at.to_rfc3339(), "2025-06-10T14:22:05+00:00");
    }

    #[test]
    fn refund_is_negative_and_distinct() {
        let mut ev = parse_payloads(APPROVED).unwrap().remove(0);
        ev.event = "SALE_REFUNDED".into();
        let rec = to_new_record(3, &ev).unwrap().unwrap();
        assert_eq!(rec.amount, d("-97.00"));
        assert_eq!(rec.external_id.as_deref(), Some("kirvano:ABC123:refund"));
    }

    #[test]
    fn other_events_skipped() {
        let mut ev = parse_payloads(APPROVED).unwrap().remove(0);
        ev.event = "ABANDONED_CART".into();
        assert!(to_new_record(3, &ev).unwrap().is_none());
    }

    #[test]
    fn ingest_is_idempotent() {
        let store = MemoryStore::new();
        let reader = LedgerReader::new(&store, &NoCache);
        let batch = format!("[{}, {}]", APPROVED, APPROVED);
        let evs = parse_payloads(&batch).unwrap();
        let report = ingest(&reader, 3, &evs).unwrap();
        assert_eq!(report.created, 1);
        assert_eq!(report.duplicates, 1);
        let again = ingest(&reader, 3, &evs).unwrap();
        assert_eq!(again.created, 0);
        assert_eq!(reader.records(3, &RecordFilter::new()).unwrap().len(), 1);
    }

    #[test]
    fn missing_products_fall_back() {
        let ev: KirvanoEvent = serde_json::from_value(json!({
            "event": "SALE_APPROVED",
            "sale_id": "X1",
            "created_at": "2025-06-10T10:00:00Z",
            "total_price": "10.00"
        }))
        .unwrap();
        let rec = to_new_record(1, &ev).unwrap().unwrap();
        assert_eq!(rec.category, DEFAULT_CATEGORY);
        assert!(!rec.is_recurring);
    }
}
