//! Database operations for expenses.
//!
//! Every query that reads or changes an existing expense is scoped to a single user, so an
//! expense that belongs to another user is reported as missing.

use rusqlite::{Connection, Row};
use time::OffsetDateTime;

use crate::{
    Error,
    auth::UserID,
    expense::{Amount, Expense, ExpenseId, NewExpense},
};

/// Create the expense table.
///
/// Must be called after the user and category tables exist.
pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS expense (
            id INTEGER PRIMARY KEY,
            amount INTEGER NOT NULL,
            category_id INTEGER NOT NULL,
            user_id INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE CASCADE,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_expense_user_id ON expense(user_id)",
        (),
    )?;

    Ok(())
}

/// Store a new expense, stamping it with the current time.
///
/// # Errors
///
/// Returns an [Error::InvalidForeignKey] if the category or user does not exist.
pub fn create_expense(expense: &NewExpense, connection: &Connection) -> Result<Expense, Error> {
    let created_at = OffsetDateTime::now_utc();

    connection.execute(
        "INSERT INTO expense (amount, category_id, user_id, created_at) VALUES (?1, ?2, ?3, ?4)",
        (
            expense.amount.cents(),
            expense.category_id,
            expense.user_id.as_i64(),
            created_at,
        ),
    )?;

    Ok(Expense {
        id: connection.last_insert_rowid(),
        amount: expense.amount,
        category: expense.category_id,
        user: expense.user_id,
        created_at,
    })
}

/// Retrieve the expense with `expense_id` that belongs to `user_id`.
///
/// # Errors
///
/// Returns an [Error::ExpenseNotFound] if there is no such expense for the user.
pub fn get_expense(
    expense_id: ExpenseId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Expense, Error> {
    connection
        .prepare(
            "SELECT id, amount, category_id, user_id, created_at FROM expense
            WHERE id = :id AND user_id = :user_id",
        )?
        .query_row(
            &[(":id", &expense_id), (":user_id", &user_id.as_i64())],
            map_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::ExpenseNotFound,
            error => error.into(),
        })
}

/// Retrieve every expense of `user_id` in the order they were created.
pub fn get_expenses_by_user(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Expense>, Error> {
    connection
        .prepare(
            "SELECT id, amount, category_id, user_id, created_at FROM expense
            WHERE user_id = :user_id ORDER BY id ASC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_row)?
        .map(|maybe_expense| maybe_expense.map_err(Error::from))
        .collect()
}

/// Replace the fields of the expense with `expense_id` that belongs to `user_id`.
///
/// The creation time is kept.
///
/// # Errors
///
/// Returns an [Error::ExpenseNotFound] if there is no such expense for the user.
pub fn update_expense(
    expense_id: ExpenseId,
    user_id: UserID,
    expense: &NewExpense,
    connection: &Connection,
) -> Result<Expense, Error> {
    let rows_affected = connection.execute(
        "UPDATE expense SET amount = ?1, category_id = ?2, user_id = ?3
        WHERE id = ?4 AND user_id = ?5",
        (
            expense.amount.cents(),
            expense.category_id,
            expense.user_id.as_i64(),
            expense_id,
            user_id.as_i64(),
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::ExpenseNotFound);
    }

    get_expense(expense_id, expense.user_id, connection)
}

/// Delete the expense with `expense_id` that belongs to `user_id`.
///
/// # Errors
///
/// Returns an [Error::ExpenseNotFound] if there is no such expense for the user.
pub fn delete_expense(
    expense_id: ExpenseId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM expense WHERE id = ?1 AND user_id = ?2",
        (expense_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::ExpenseNotFound);
    }

    Ok(())
}

fn map_row(row: &Row) -> Result<Expense, rusqlite::Error> {
    Ok(Expense {
        id: row.get(0)?,
        amount: Amount::from_cents(row.get(1)?),
        category: row.get(2)?,
        user: UserID::new(row.get(3)?),
        created_at: row.get(4)?,
    })
}

#[cfg(test)]
mod expense_query_tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        auth::UserID,
        category::{CategoryName, create_category, delete_category},
        expense::{Amount, NewExpense},
        test_utils::{get_test_connection, insert_test_user},
    };

    use super::{
        create_expense, delete_expense, get_expense, get_expenses_by_user, update_expense,
    };

    fn new_expense(cents: i64, category_id: i64, user_id: UserID) -> NewExpense {
        NewExpense {
            amount: Amount::from_cents(cents),
            category_id,
            user_id,
        }
    }

    fn setup() -> (Connection, UserID, i64) {
        let connection = get_test_connection();
        let user = insert_test_user("alice", "averystrongandsecurepassword", &connection);
        let category = create_category(CategoryName::new_unchecked("Food"), &connection).unwrap();

        (connection, user.id, category.id)
    }

    #[test]
    fn create_then_get_expense() {
        let (connection, user_id, category_id) = setup();

        let created = create_expense(&new_expense(1050, category_id, user_id), &connection)
            .expect("Could not create expense");
        let fetched = get_expense(created.id, user_id, &connection).unwrap();

        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.amount, Amount::from_cents(1050));
        assert_eq!(fetched.category, category_id);
        assert_eq!(fetched.user, user_id);
    }

    #[test]
    fn create_expense_fails_on_missing_category() {
        let (connection, user_id, _) = setup();

        let result = create_expense(&new_expense(100, 999, user_id), &connection);

        assert_eq!(result, Err(Error::InvalidForeignKey));
    }

    #[test]
    fn get_expense_is_scoped_to_user() {
        let (connection, alice, category_id) = setup();
        let bob = insert_test_user("bob", "averystrongandsecurepassword", &connection).id;
        let expense = create_expense(&new_expense(100, category_id, alice), &connection).unwrap();

        assert_eq!(
            get_expense(expense.id, bob, &connection),
            Err(Error::ExpenseNotFound)
        );
        assert_eq!(
            delete_expense(expense.id, bob, &connection),
            Err(Error::ExpenseNotFound)
        );
    }

    #[test]
    fn get_expenses_by_user_only_returns_users_expenses() {
        let (connection, alice, category_id) = setup();
        let bob = insert_test_user("bob", "averystrongandsecurepassword", &connection).id;
        let first = create_expense(&new_expense(100, category_id, alice), &connection).unwrap();
        create_expense(&new_expense(200, category_id, bob), &connection).unwrap();
        let second = create_expense(&new_expense(300, category_id, alice), &connection).unwrap();

        let ids: Vec<_> = get_expenses_by_user(alice, &connection)
            .unwrap()
            .into_iter()
            .map(|expense| expense.id)
            .collect();

        assert_eq!(ids, vec![first.id, second.id]);
        assert_eq!(
            get_expenses_by_user(UserID::new(999), &connection),
            Ok(vec![])
        );
    }

    #[test]
    fn update_expense_replaces_fields() {
        let (connection, user_id, category_id) = setup();
        let rent = create_category(CategoryName::new_unchecked("Rent"), &connection).unwrap();
        let expense = create_expense(&new_expense(100, category_id, user_id), &connection).unwrap();

        let updated = update_expense(
            expense.id,
            user_id,
            &new_expense(2500, rent.id, user_id),
            &connection,
        )
        .unwrap();

        assert_eq!(updated.amount, Amount::from_cents(2500));
        assert_eq!(updated.category, rent.id);
        let fetched = get_expense(expense.id, user_id, &connection).unwrap();
        assert_eq!(updated.created_at, fetched.created_at);
    }

    #[test]
    fn update_missing_expense_fails() {
        let (connection, user_id, category_id) = setup();

        let result = update_expense(
            1,
            user_id,
            &new_expense(1, category_id, user_id),
            &connection,
        );

        assert_eq!(result, Err(Error::ExpenseNotFound));
    }

    #[test]
    fn deleting_category_cascades_to_expenses() {
        let (connection, user_id, category_id) = setup();
        let expense = create_expense(&new_expense(100, category_id, user_id), &connection).unwrap();

        delete_category(category_id, &connection).unwrap();

        assert_eq!(
            get_expense(expense.id, user_id, &connection),
            Err(Error::ExpenseNotFound)
        );
    }

    #[test]
    fn delete_expense_removes_row() {
        let (connection, user_id, category_id) = setup();
        let expense = create_expense(&new_expense(100, category_id, user_id), &connection).unwrap();

        delete_expense(expense.id, user_id, &connection).unwrap();

        assert_eq!(get_expenses_by_user(user_id, &connection), Ok(vec![]));
    }
}
