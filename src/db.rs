use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

/// A recorded expense. `id` is assigned by SQLite on insert and never changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    pub category: String,
    pub amount: f64,
    pub date: String,
    pub description: Option<String>,
}

/// Field values for an insert or full-row update. Produced by
/// `schema::ExpensePayload::validate`, so `category` is non-empty and
/// `date` is a real `YYYY-MM-DD` date by the time it reaches the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewExpense {
    pub category: String,
    pub amount: f64,
    pub date: String,
    pub description: Option<String>,
}

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS expenses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            category TEXT NOT NULL,
            amount REAL NOT NULL,
            date TEXT NOT NULL,
            description TEXT
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_expenses_date ON expenses(date)",
        [],
    )?;

    Ok(())
}

fn expense_from_row(row: &Row) -> rusqlite::Result<Expense> {
    Ok(Expense {
        id: row.get(0)?,
        category: row.get(1)?,
        amount: row.get(2)?,
        date: row.get(3)?,
        description: row.get(4)?,
    })
}

pub fn get_all_expenses(conn: &Connection) -> Result<Vec<Expense>> {
    let mut stmt = conn.prepare(
        "SELECT id, category, amount, date, description
         FROM expenses
         ORDER BY date DESC, id DESC",
    )?;

    let expenses = stmt
        .query_map([], expense_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(expenses)
}

pub fn get_expense(conn: &Connection, id: i64) -> Result<Option<Expense>> {
    let expense = conn
        .query_row(
            "SELECT id, category, amount, date, description
             FROM expenses
             WHERE id = ?1",
            params![id],
            expense_from_row,
        )
        .optional()?;

    Ok(expense)
}

/// Insert one expense and return the id SQLite assigned to it.
pub fn insert_expense(conn: &Connection, expense: &NewExpense) -> Result<i64> {
    conn.execute(
        "INSERT INTO expenses (category, amount, date, description)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            expense.category,
            expense.amount,
            expense.date,
            expense.description,
        ],
    )?;

    Ok(conn.last_insert_rowid())
}

/// Overwrite all mutable fields of the row matching `id`.
/// Returns false when no row matched (the caller maps that to NotFound).
pub fn update_expense(conn: &Connection, id: i64, expense: &NewExpense) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE expenses
         SET category = ?1, amount = ?2, date = ?3, description = ?4
         WHERE id = ?5",
        params![
            expense.category,
            expense.amount,
            expense.date,
            expense.description,
            id,
        ],
    )?;

    Ok(changed > 0)
}

/// Returns false when no row matched.
pub fn delete_expense(conn: &Connection, id: i64) -> Result<bool> {
    let changed = conn.execute("DELETE FROM expenses WHERE id = ?1", params![id])?;

    Ok(changed > 0)
}

pub fn expense_count(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM expenses", [], |row| row.get(0))?;

    Ok(count)
}

/// Expenses whose date falls in the given `YYYY-MM` month. Exact prefix
/// comparison, so LIKE wildcards in the argument have no effect.
pub fn get_expenses_for_month(conn: &Connection, month: &str) -> Result<Vec<Expense>> {
    let mut stmt = conn.prepare(
        "SELECT id, category, amount, date, description
         FROM expenses
         WHERE substr(date, 1, 7) = ?1
         ORDER BY date DESC, id DESC",
    )?;

    let expenses = stmt
        .query_map(params![month], expense_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(expenses)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();
        conn
    }

    fn sample(category: &str, amount: f64, date: &str) -> NewExpense {
        NewExpense {
            category: category.to_string(),
            amount,
            date: date.to_string(),
            description: Some(format!("{} on {}", category, date)),
        }
    }

    #[test]
    fn test_setup_is_idempotent() {
        let conn = test_conn();
        setup_database(&conn).unwrap();
        setup_database(&conn).unwrap();
        assert_eq!(expense_count(&conn).unwrap(), 0);
    }

    #[test]
    fn test_insert_then_get_round_trip() {
        let conn = test_conn();

        let input = sample("Food", 42.50, "2024-11-15");
        let id = insert_expense(&conn, &input).unwrap();

        let fetched = get_expense(&conn, id).unwrap().unwrap();
        assert_eq!(fetched.id, id);
        assert_eq!(fetched.category, input.category);
        assert_eq!(fetched.amount, input.amount);
        assert_eq!(fetched.date, input.date);
        assert_eq!(fetched.description, input.description);
    }

    #[test]
    fn test_ids_are_unique_and_increasing() {
        let conn = test_conn();

        let id1 = insert_expense(&conn, &sample("Food", 10.0, "2024-11-01")).unwrap();
        let id2 = insert_expense(&conn, &sample("Food", 20.0, "2024-11-02")).unwrap();

        assert_ne!(id1, id2);
        assert!(id2 > id1);
        assert_eq!(expense_count(&conn).unwrap(), 2);
    }

    #[test]
    fn test_get_missing_id_returns_none() {
        let conn = test_conn();
        assert!(get_expense(&conn, 999).unwrap().is_none());
    }

    #[test]
    fn test_update_overwrites_all_fields() {
        let conn = test_conn();

        let id = insert_expense(&conn, &sample("Food", 10.0, "2024-11-01")).unwrap();

        let replacement = NewExpense {
            category: "Transport".to_string(),
            amount: 99.99,
            date: "2024-12-24".to_string(),
            description: None,
        };
        assert!(update_expense(&conn, id, &replacement).unwrap());

        let fetched = get_expense(&conn, id).unwrap().unwrap();
        assert_eq!(fetched.id, id);
        assert_eq!(fetched.category, "Transport");
        assert_eq!(fetched.amount, 99.99);
        assert_eq!(fetched.date, "2024-12-24");
        assert_eq!(fetched.description, None);
    }

    #[test]
    fn test_update_missing_id_leaves_store_unchanged() {
        let conn = test_conn();

        let id = insert_expense(&conn, &sample("Food", 10.0, "2024-11-01")).unwrap();
        let before = get_all_expenses(&conn).unwrap();

        assert!(!update_expense(&conn, id + 1, &sample("Transport", 5.0, "2024-11-02")).unwrap());

        let after = get_all_expenses(&conn).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_delete_twice_reports_not_found() {
        let conn = test_conn();

        let id = insert_expense(&conn, &sample("Food", 10.0, "2024-11-01")).unwrap();

        assert!(delete_expense(&conn, id).unwrap());
        assert!(!delete_expense(&conn, id).unwrap());
        assert!(!delete_expense(&conn, 999).unwrap());
        assert_eq!(expense_count(&conn).unwrap(), 0);
    }

    #[test]
    fn test_get_all_orders_by_date_descending() {
        let conn = test_conn();

        insert_expense(&conn, &sample("Food", 10.0, "2024-11-01")).unwrap();
        insert_expense(&conn, &sample("Food", 20.0, "2024-12-01")).unwrap();
        insert_expense(&conn, &sample("Food", 30.0, "2024-10-01")).unwrap();

        let expenses = get_all_expenses(&conn).unwrap();
        let dates: Vec<String> = expenses.iter().map(|e| e.date.clone()).collect();
        assert_eq!(dates, vec!["2024-12-01", "2024-11-01", "2024-10-01"]);
    }

    #[test]
    fn test_expense_wire_format() {
        let expense = Expense {
            id: 7,
            category: "Food".to_string(),
            amount: 12.5,
            date: "2024-11-15".to_string(),
            description: None,
        };

        // Absent description serializes as null, matching the nullable column
        assert_eq!(
            serde_json::to_value(&expense).unwrap(),
            serde_json::json!({
                "id": 7,
                "category": "Food",
                "amount": 12.5,
                "date": "2024-11-15",
                "description": null,
            })
        );
    }

    #[test]
    fn test_month_filter_matches_prefix_only() {
        let conn = test_conn();

        insert_expense(&conn, &sample("Food", 10.0, "2024-11-15")).unwrap();
        insert_expense(&conn, &sample("Food", 20.0, "2024-11-30")).unwrap();
        insert_expense(&conn, &sample("Food", 30.0, "2024-12-01")).unwrap();

        let november = get_expenses_for_month(&conn, "2024-11").unwrap();
        assert_eq!(november.len(), 2);
        assert!(november.iter().all(|e| e.date.starts_with("2024-11")));
    }

    #[test]
    fn test_month_filter_ignores_like_wildcards() {
        let conn = test_conn();

        insert_expense(&conn, &sample("Food", 10.0, "2024-11-15")).unwrap();
        insert_expense(&conn, &sample("Food", 20.0, "2024-12-01")).unwrap();

        assert!(get_expenses_for_month(&conn, "2024%").unwrap().is_empty());
        assert!(get_expenses_for_month(&conn, "2024-1_").unwrap().is_empty());
        assert!(get_expenses_for_month(&conn, "%").unwrap().is_empty());
    }
}
