//! Client-side aggregation over the raw transaction list.
//!
//! Everything here is a pure function of (transactions, filter): the
//! analytics and budget views can recompute their summaries at any time
//! without hidden state. Fetch failures upstream hand these functions an
//! empty list and they degrade to empty output instead of erroring.

use chrono::{Datelike, NaiveDate};
use shared::{
    Budget, BudgetStatus, CategoryAggregate, Stats, Transaction, TransactionFilter,
    TransactionKind,
};
use std::collections::HashMap;

/// Select the transactions matching a filter. Returns an empty list, not an
/// error, when nothing matches. Filtering its own output with the same
/// filter is a no-op.
pub fn filter_transactions(
    transactions: &[Transaction],
    filter: &TransactionFilter,
) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|transaction| filter.matches(transaction))
        .cloned()
        .collect()
}

/// Group a (pre-filtered) transaction list by category.
///
/// Groups keep first-encounter order while accumulating, amounts are
/// rounded to 2 decimals only after the sum, and the result is sorted by
/// amount descending with stable ties. An empty input short-circuits to an
/// empty result rather than dividing by a zero total.
pub fn aggregate_by_category(transactions: &[Transaction]) -> Vec<CategoryAggregate> {
    if transactions.is_empty() {
        return Vec::new();
    }

    let mut groups: Vec<(String, f64, usize)> = Vec::new();
    for transaction in transactions {
        match groups
            .iter_mut()
            .find(|(category, _, _)| *category == transaction.category)
        {
            Some((_, amount, count)) => {
                *amount += transaction.amount;
                *count += 1;
            }
            None => groups.push((transaction.category.clone(), transaction.amount, 1)),
        }
    }

    let total: f64 = groups.iter().map(|(_, amount, _)| round2(*amount)).sum();

    let mut aggregates: Vec<CategoryAggregate> = groups
        .into_iter()
        .map(|(category, amount, count)| {
            let amount = round2(amount);
            CategoryAggregate {
                category,
                amount,
                count,
                percentage: if total > 0.0 {
                    round1(amount / total * 100.0)
                } else {
                    0.0
                },
            }
        })
        .collect();

    // sort_by is stable, so equal amounts keep their encounter order
    aggregates.sort_by(|a, b| {
        b.amount
            .partial_cmp(&a.amount)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    aggregates
}

/// Roll every budget up against expense spending in the given calendar
/// month (the caller passes the *current* month and year: spending always
/// counts against this month, even for a budget tagged to a past one).
pub fn compute_budget_rollup(
    budgets: &[Budget],
    transactions: &[Transaction],
    month: u32,
    year: i32,
) -> Vec<BudgetStatus> {
    let mut spending: HashMap<&str, f64> = HashMap::new();
    for transaction in transactions {
        if transaction.kind != TransactionKind::Expense {
            continue;
        }
        let Some(date) = transaction.calendar_date() else {
            continue;
        };
        if date.month() != month || date.year() != year {
            continue;
        }
        *spending.entry(transaction.category.as_str()).or_insert(0.0) += transaction.amount;
    }

    budgets
        .iter()
        .map(|budget| {
            let spent = spending.get(budget.category.as_str()).copied().unwrap_or(0.0);
            let percent_used = if budget.amount > 0.0 {
                spent / budget.amount * 100.0
            } else {
                // a zero cap is treated as unused rather than infinitely over
                0.0
            };
            BudgetStatus {
                id: budget.id.clone(),
                category: budget.category.clone(),
                amount: budget.amount,
                spent,
                percent_used,
                remaining: budget.amount - spent,
                over_budget: budget.amount > 0.0 && spent > budget.amount,
                near_limit: percent_used > 80.0 && percent_used <= 100.0,
            }
        })
        .collect()
}

/// Headline figures for the dashboard: all-time and current-month totals
/// per kind.
pub fn compute_stats(transactions: &[Transaction], today: NaiveDate) -> Stats {
    let mut stats = Stats::default();
    for transaction in transactions {
        let this_month = transaction
            .calendar_date()
            .map(|date| date.month() == today.month() && date.year() == today.year())
            .unwrap_or(false);
        match transaction.kind {
            TransactionKind::Income => {
                stats.total_income += transaction.amount;
                if this_month {
                    stats.monthly_income += transaction.amount;
                }
            }
            TransactionKind::Expense => {
                stats.total_expenses += transaction.amount;
                if this_month {
                    stats.monthly_expenses += transaction.amount;
                }
            }
        }
    }
    stats.balance = stats.total_income - stats.total_expenses;
    stats
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
