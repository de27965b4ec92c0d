// Budget insights computed from a full snapshot of the expenses table.
// Every function is a pure pass over the rows; nothing is cached because
// the caller re-reads the store on each request anyway.

use std::collections::HashMap;

use crate::db::Expense;

/// Tunable thresholds for the insight heuristics. These encode budget
/// policy, not algorithmic necessity, so the server reads overrides from
/// the environment instead of hardcoding them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InsightConfig {
    /// An expense is anomalous when amount > ratio * its category mean.
    pub anomaly_ratio: f64,
    /// A category is flagged for overspending when its total is strictly
    /// above this threshold.
    pub overspend_threshold: f64,
}

impl Default for InsightConfig {
    fn default() -> Self {
        InsightConfig {
            anomaly_ratio: 1.5,
            overspend_threshold: 1000.0,
        }
    }
}

/// Sum of amounts per category.
pub fn category_totals(expenses: &[Expense]) -> HashMap<String, f64> {
    let mut totals: HashMap<String, f64> = HashMap::new();

    for expense in expenses {
        *totals.entry(expense.category.clone()).or_insert(0.0) += expense.amount;
    }

    totals
}

/// Mean amount per category. Categories only appear when at least one row
/// exists for them, so the count divisor is never zero.
pub fn category_averages(expenses: &[Expense]) -> HashMap<String, f64> {
    let mut totals: HashMap<String, f64> = HashMap::new();
    let mut counts: HashMap<String, usize> = HashMap::new();

    for expense in expenses {
        *totals.entry(expense.category.clone()).or_insert(0.0) += expense.amount;
        *counts.entry(expense.category.clone()).or_insert(0) += 1;
    }

    totals
        .into_iter()
        .map(|(category, total)| {
            let count = counts[&category] as f64;
            (category, total / count)
        })
        .collect()
}

/// Expenses whose amount exceeds `ratio` times their category mean.
/// A lone expense in a category equals its own mean, so it is never
/// flagged against itself.
pub fn find_anomalies(expenses: &[Expense], ratio: f64) -> Vec<Expense> {
    let averages = category_averages(expenses);

    expenses
        .iter()
        .filter(|expense| {
            averages
                .get(&expense.category)
                .map(|avg| expense.amount > ratio * avg)
                .unwrap_or(false)
        })
        .cloned()
        .collect()
}

/// One suggestion string per category whose total is strictly above the
/// threshold, sorted by category name for stable output.
pub fn overspending_suggestions(expenses: &[Expense], threshold: f64) -> Vec<String> {
    let totals = category_totals(expenses);

    let mut flagged: Vec<&String> = totals
        .iter()
        .filter(|(_, total)| **total > threshold)
        .map(|(category, _)| category)
        .collect();
    flagged.sort();

    flagged
        .into_iter()
        .map(|category| format!("Consider reducing spending in {}", category))
        .collect()
}
