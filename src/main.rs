use anyhow::{bail, Result};
use rusqlite::Connection;
use std::env;

use expense_tracker::{
    get_all_expenses, get_expenses_for_month, insert_expense, monthly_trends, setup_database,
    summary_report, Expense, ExpensePayload,
};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(|s| s.as_str()) {
        Some("add") => run_add(&args[2..]),
        Some("list") => run_list(),
        Some("summary") => run_summary(),
        Some("trends") => run_trends(),
        Some("month") => run_month(&args[2..]),
        _ => {
            print_usage();
            Ok(())
        }
    }
}

fn print_usage() {
    println!("💰 Expense Tracker v{}", expense_tracker::VERSION);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Usage:");
    println!("  expense-tracker add <category> <amount> <date> [description]");
    println!("  expense-tracker list");
    println!("  expense-tracker summary");
    println!("  expense-tracker trends");
    println!("  expense-tracker month <YYYY-MM>");
    println!();
    println!("Database path is taken from EXPENSES_DB (default: expenses.db)");
    println!("Web UI: cargo run --bin expense-server");
}

fn open_database() -> Result<Connection> {
    let db_path = env::var("EXPENSES_DB").unwrap_or_else(|_| "expenses.db".to_string());
    let conn = Connection::open(&db_path)?;
    setup_database(&conn)?;
    Ok(conn)
}

fn parse_amount(raw: &str) -> Result<f64> {
    raw.parse::<f64>()
        .map_err(|_| anyhow::anyhow!("Invalid amount {:?}: expected a number", raw))
}

fn run_add(args: &[String]) -> Result<()> {
    if args.len() < 3 {
        bail!("Usage: expense-tracker add <category> <amount> <date> [description]");
    }

    let payload = ExpensePayload {
        category: Some(args[0].clone()),
        amount: Some(parse_amount(&args[1])?),
        date: Some(args[2].clone()),
        description: args.get(3).cloned(),
    };

    let expense = match payload.validate() {
        Ok(expense) => expense,
        Err(errors) => {
            eprintln!("❌ Invalid expense:");
            for error in &errors {
                eprintln!("   {}", error);
            }
            std::process::exit(1);
        }
    };

    let conn = open_database()?;
    let id = insert_expense(&conn, &expense)?;
    println!(
        "✓ Expense added: ${:.2} for {} (id {})",
        expense.amount, expense.category, id
    );

    Ok(())
}

fn print_expense_table(expenses: &[Expense]) {
    println!(
        "{:<6} {:<12} {:<15} {:>10}  Description",
        "ID", "Date", "Category", "Amount"
    );
    println!("{}", "-".repeat(70));

    for expense in expenses {
        println!(
            "{:<6} {:<12} {:<15} {:>10.2}  {}",
            expense.id,
            expense.date,
            expense.category,
            expense.amount,
            expense.description.as_deref().unwrap_or("")
        );
    }
}

fn run_list() -> Result<()> {
    let conn = open_database()?;
    let expenses = get_all_expenses(&conn)?;

    if expenses.is_empty() {
        println!("No expenses recorded yet.");
        return Ok(());
    }

    println!("📋 All Expenses ({})", expenses.len());
    println!("{}", "=".repeat(70));
    print_expense_table(&expenses);

    Ok(())
}

fn run_summary() -> Result<()> {
    let conn = open_database()?;
    let expenses = get_all_expenses(&conn)?;

    let Some(report) = summary_report(&expenses) else {
        println!("No expenses recorded yet.");
        return Ok(());
    };

    println!("📊 Expense Summary");
    println!("{}", "=".repeat(70));
    println!("Total Expenses: ${:.2}", report.total);
    println!("Number of Transactions: {}", report.count);
    println!("Average Transaction: ${:.2}", report.average);
    println!();
    println!("Expenses by Category");
    println!("{}", "-".repeat(70));

    for line in &report.categories {
        println!(
            "{:<20} ${:>10.2} ({:>5.1}%) - {} transactions",
            line.category, line.total, line.share, line.count
        );
    }

    Ok(())
}

fn run_trends() -> Result<()> {
    let conn = open_database()?;
    let expenses = get_all_expenses(&conn)?;

    let trends = monthly_trends(&expenses);
    if trends.is_empty() {
        println!("No expenses recorded yet.");
        return Ok(());
    }

    println!("📈 Monthly Trends");
    println!("{}", "=".repeat(70));

    for month in &trends {
        println!(
            "\n{} - Total: ${:.2} ({} transactions)",
            month.month, month.total, month.count
        );
        println!("  Top categories:");
        for line in &month.top_categories {
            println!(
                "    • {:<15} ${:>8.2} ({:>5.1}%)",
                line.category, line.total, line.share
            );
        }
    }

    Ok(())
}

fn run_month(args: &[String]) -> Result<()> {
    let Some(month) = args.first() else {
        bail!("Usage: expense-tracker month <YYYY-MM>");
    };

    let conn = open_database()?;
    let expenses = get_expenses_for_month(&conn, month)?;

    if expenses.is_empty() {
        println!("No expenses recorded for {}.", month);
        return Ok(());
    }

    let total: f64 = expenses.iter().map(|e| e.amount).sum();

    println!("📅 Expenses for {}", month);
    println!("{}", "=".repeat(70));
    print_expense_table(&expenses);
    println!("{}", "-".repeat(70));
    println!(
        "Total: ${:.2} ({} transactions)",
        total,
        expenses.len()
    );

    Ok(())
}
