// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{FinancialRecord, RecordKind};
use crate::settings::{TaxBasis, TaxRegime, TaxSettings};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overview {
    pub revenue: Decimal,
    pub expenses: Decimal,
    pub ad_spend: Decimal,
    pub gross_profit: Decimal,
    pub estimated_tax: Decimal,
    pub net_profit: Decimal,
    /// Revenue per unit of ad spend; absent without ad spend.
    pub roas: Option<Decimal>,
    /// Net profit as a percentage of revenue; absent without revenue.
    pub margin_percent: Option<Decimal>,
}

pub fn overview(records: &[FinancialRecord], tax: &TaxSettings) -> Overview {
    let mut o = Overview::default();
    for r in records {
        match r.kind {
            RecordKind::Sale => o.revenue += r.amount,
            RecordKind::Expense => o.expenses += r.amount,
            RecordKind::AdSpend => o.ad_spend += r.amount,
        }
    }
    o.gross_profit = o.revenue - o.expenses - o.ad_spend;
    o.estimated_tax = estimate_tax(o.revenue, o.gross_profit, tax);
    o.net_profit = o.gross_profit - o.estimated_tax;
    if !o.ad_spend.is_zero() {
        o.roas = Some((o.revenue / o.ad_spend).round_dp(2));
    }
    if o.revenue > Decimal::ZERO {
        o.margin_percent = Some((o.net_profit * Decimal::ONE_HUNDRED / o.revenue).round_dp(2));
    }
    o
}

fn estimate_tax(revenue: Decimal, gross_profit: Decimal, tax: &TaxSettings) -> Decimal {
    if tax.regime == TaxRegime::Exempt {
        return Decimal::ZERO;
    }
    let base = match tax.basis {
        TaxBasis::Revenue => revenue,
        TaxBasis::Profit => gross_profit,
    }
    .max(Decimal::ZERO);
    (base * tax.rate_percent / Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthFlow {
    pub month: String,
    pub revenue: Decimal,
    pub costs: Decimal,
    pub net: Decimal,
}

/// Per-month revenue against costs (expenses plus ad spend), newest month
/// first, at most `months` entries.
pub fn cashflow(records: &[FinancialRecord], months: usize) -> Vec<MonthFlow> {
    let mut map: BTreeMap<String, (Decimal, Decimal)> = BTreeMap::new();
    for r in records {
        let m = r.occurred_at.format("%Y-%m").to_string();
        let entry = map.entry(m).or_insert((Decimal::ZERO, Decimal::ZERO));
        match r.kind {
            RecordKind::Sale => entry.0 += r.amount,
            RecordKind::Expense | RecordKind::AdSpend => entry.1 += r.amount,
        }
    }
    map.into_iter()
        .rev()
        .take(months)
        .map(|(month, (revenue, costs))| MonthFlow {
            month,
            revenue,
            costs,
            net: revenue - costs,
        })
        .collect()
}
