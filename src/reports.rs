// Offline summary and trend reports for the CLI.

use std::collections::HashMap;

use crate::db::Expense;

/// Per-category slice of a summary report.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryLine {
    pub category: String,
    pub total: f64,
    /// Share of the overall total, 0-100.
    pub share: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryReport {
    pub total: f64,
    pub count: usize,
    pub average: f64,
    /// Categories sorted by total, largest first.
    pub categories: Vec<CategoryLine>,
}

/// Overall totals plus a per-category breakdown. None when there are no
/// expenses to report on.
pub fn summary_report(expenses: &[Expense]) -> Option<SummaryReport> {
    if expenses.is_empty() {
        return None;
    }

    let total: f64 = expenses.iter().map(|e| e.amount).sum();
    let count = expenses.len();

    let mut totals: HashMap<&str, (f64, usize)> = HashMap::new();
    for expense in expenses {
        let entry = totals.entry(expense.category.as_str()).or_insert((0.0, 0));
        entry.0 += expense.amount;
        entry.1 += 1;
    }

    let mut categories: Vec<CategoryLine> = totals
        .into_iter()
        .map(|(category, (cat_total, cat_count))| CategoryLine {
            category: category.to_string(),
            total: cat_total,
            share: if total != 0.0 {
                cat_total / total * 100.0
            } else {
                0.0
            },
            count: cat_count,
        })
        .collect();
    categories.sort_by(|a, b| b.total.total_cmp(&a.total).then(a.category.cmp(&b.category)));

    Some(SummaryReport {
        total,
        count,
        average: total / count as f64,
        categories,
    })
}

/// One month of spending, with its heaviest categories.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthTrend {
    /// `YYYY-MM` key taken from the expense date.
    pub month: String,
    pub total: f64,
    pub count: usize,
    /// Up to three largest categories, sorted by total descending.
    pub top_categories: Vec<CategoryLine>,
}

/// Month-by-month totals, oldest first. Rows with dates shorter than
/// `YYYY-MM` are ignored rather than grouped under a garbage key.
pub fn monthly_trends(expenses: &[Expense]) -> Vec<MonthTrend> {
    let mut by_month: HashMap<&str, Vec<&Expense>> = HashMap::new();
    for expense in expenses {
        if let Some(month) = expense.date.get(..7) {
            by_month.entry(month).or_default().push(expense);
        }
    }

    let mut months: Vec<&str> = by_month.keys().copied().collect();
    months.sort();

    months
        .into_iter()
        .map(|month| {
            let rows = &by_month[month];
            let total: f64 = rows.iter().map(|e| e.amount).sum();

            let mut totals: HashMap<&str, (f64, usize)> = HashMap::new();
            for expense in rows {
                let entry = totals.entry(expense.category.as_str()).or_insert((0.0, 0));
                entry.0 += expense.amount;
                entry.1 += 1;
            }

            let mut top_categories: Vec<CategoryLine> = totals
                .into_iter()
                .map(|(category, (cat_total, cat_count))| CategoryLine {
                    category: category.to_string(),
                    total: cat_total,
                    share: if total != 0.0 {
                        cat_total / total * 100.0
                    } else {
                        0.0
                    },
                    count: cat_count,
                })
                .collect();
            top_categories
                .sort_by(|a, b| b.total.total_cmp(&a.total).then(a.category.cmp(&b.category)));
            top_categories.truncate(3);

            MonthTrend {
                month: month.to_string(),
                total,
                count: rows.len(),
                top_categories,
            }
        })
        .collect()
}
