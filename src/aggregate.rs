// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Category aggregation over financial records.
//!
//! Totals are accumulated in `Decimal`, so the grand total is always the
//! exact sum of the category totals and of the input amounts.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{LedgerError, LedgerResult};
use crate::models::FinancialRecord;

/// Currency precision accepted on input.
pub const AMOUNT_SCALE: u32 = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotals {
    pub count: usize,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub category: String,
    pub count: usize,
    pub total: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSummary {
    pub by_category: BTreeMap<String, CategoryTotals>,
    pub total: Decimal,
    pub record_count: usize,
}

impl LedgerSummary {
    pub fn is_empty(&self) -> bool {
        self.by_category.is_empty()
    }

    pub fn get(&self, category: &str) -> Option<&CategoryTotals> {
        self.by_category.get(category)
    }

    /// Categories in name order.
    pub fn categories(&self) -> Vec<CategorySummary> {
        self.by_category
            .iter()
            .map(|(category, t)| CategorySummary {
                category: category.clone(),
                count: t.count,
                total: t.total,
            })
            .collect()
    }

    /// Categories by total, largest first; ties fall back to name order.
    pub fn ranked(&self) -> Vec<CategorySummary> {
        let mut items = self.categories();
        items.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.category.cmp(&b.category)));
        items
    }
}

fn validate(record: &FinancialRecord) -> LedgerResult<&str> {
    let category = record.category.trim();
    if category.is_empty() {
        return Err(LedgerError::validation(format!(
            "record {} has an empty category",
            record.id
        )));
    }
    if record.amount.normalize().scale() > AMOUNT_SCALE {
        return Err(LedgerError::validation(format!(
            "record {} amount {} has more than {} decimal places",
            record.id, record.amount, AMOUNT_SCALE
        )));
    }
    Ok(category)
}

pub fn aggregate<'a, I>(records: I) -> LedgerResult<LedgerSummary>
where
    I: IntoIterator<Item = &'a FinancialRecord>,
{
    let mut summary = LedgerSummary::default();
    for record in records {
        let category = validate(record)?;
        let entry = summary
            .by_category
            .entry(category.to_string())
            .or_default();
        entry.count += 1;
        entry.total += record.amount;
        summary.total += record.amount;
        summary.record_count += 1;
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecordKind;
    use chrono::{TimeZone, Utc};
    use std::str::FromStr;

    fn rec(id: i64, category: &str, amount: &str) -> FinancialRecord {
        FinancialRecord {
            id,
            owner_id: 1,
            kind: RecordKind::Expense,
            category: category.to_string(),
            amount: Decimal::from_str(amount).unwrap(),
            occurred_at: Utc.with_ymd_and_hms(2025, 1, id as u32, 0, 0, 0).unwrap(),
            is_recurring: false,
            description: None,
            external_id: None,
        }
    }

    #[test]
    fn groups_and_sums() {
        let records = vec![
            rec(1, "marketing", "123.45"),
            rec(2, "marketing", "10.00"),
            rec(3, "operational", "50.00"),
        ];
        let s = aggregate(&records).unwrap();
        assert_eq!(s.by_category.len(), 2);
        let m = s.get("marketing").unwrap();
        assert_eq!(m.count, 2);
        assert_eq!(format!("{:.2}", m.total), "133.45");
        let o = s.get("operational").unwrap();
        assert_eq!(o.count, 1);
        assert_eq!(format!("{:.2}", o.total), "50.00");
        assert_eq!(format!("{:.2}", s.total), "183.45");
        assert_eq!(s.record_count, 3);
    }

    #[test]
    fn empty_input() {
        let s = aggregate(&Vec::<FinancialRecord>::new()).unwrap();
        assert!(s.is_empty());
        assert_eq!(s.total, Decimal::ZERO);
    }

    #[test]
    fn no_float_drift() {
        let records: Vec<_> = (1..=10).map(|i| rec(i, "fees", "0.10")).collect();
        let s = aggregate(&records).unwrap();
        assert_eq!(s.total, Decimal::from_str("1.00").unwrap());
    }

    #[test]
    fn grand_total_matches_category_totals_with_signed_amounts() {
        let records = vec![
            rec(1, "sales", "97.00"),
            rec(2, "sales", "-97.00"),
            rec(3, "ads", "12.34"),
            rec(4, "tools", "-0.01"),
        ];
        let s = aggregate(&records).unwrap();
        let per_cat: Decimal = s.by_category.values().map(|t| t.total).sum();
        let input: Decimal = records.iter().map(|r| r.amount).sum();
        assert_eq!(per_cat, s.total);
        assert_eq!(input, s.total);
    }

    #[test]
    fn category_trimmed() {
        let records = vec![rec(1, " ads ", "1.00"), rec(2, "ads", "2.00")];
        let s = aggregate(&records).unwrap();
        assert_eq!(s.get("ads").unwrap().count, 2);
    }

    #[test]
    fn rejects_blank_category() {
        let err = aggregate(&[rec(1, "  ", "1.00")]).unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
    }

    #[test]
    fn rejects_sub_cent_amounts() {
        let err = aggregate(&[rec(1, "ads", "1.005")]).unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
        // trailing zeros beyond cents are fine
        assert!(aggregate(&[rec(1, "ads", "1.5000")]).is_ok());
    }

    #[test]
    fn ranked_orders_by_total() {
        let records = vec![
            rec(1, "a", "1.00"),
            rec(2, "b", "5.00"),
            rec(3, "c", "5.00"),
        ];
        let ranked = aggregate(&records).unwrap().ranked();
        let names: Vec<_> = ranked.iter().map(|c| c.category.as_str()).collect();
        assert_eq!(names, vec!["b", "c", "a"]);
    }
}
