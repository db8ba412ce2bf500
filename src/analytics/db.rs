//! Aggregate queries over a user's expenses.

use rusqlite::Connection;
use serde::Serialize;

use crate::{Error, auth::UserID, expense::Amount};

/// How much a user has spent in one category.
///
/// Serializes as `{"category__name": ..., "amount__sum": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    /// The category name.
    #[serde(rename = "category__name")]
    pub category: String,
    /// The sum of the user's expenses in the category, in dollars.
    #[serde(rename = "amount__sum")]
    pub total: f64,
}

/// The sum of every expense of `user_id`, zero if they have none.
pub fn get_total_expense(user_id: UserID, connection: &Connection) -> Result<Amount, Error> {
    connection
        .query_row(
            "SELECT COALESCE(SUM(amount), 0) FROM expense WHERE user_id = ?1",
            (user_id.as_i64(),),
            |row| row.get(0),
        )
        .map(Amount::from_cents)
        .map_err(Error::from)
}

/// The sum of the expenses of `user_id` per category, ordered by category name.
///
/// Categories the user has no expenses in are left out.
pub fn get_category_totals(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<CategoryTotal>, Error> {
    connection
        .prepare(
            "SELECT category.name, SUM(expense.amount)
            FROM expense
            INNER JOIN category ON category.id = expense.category_id
            WHERE expense.user_id = :user_id
            GROUP BY category.id
            ORDER BY category.name ASC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], |row| {
            Ok(CategoryTotal {
                category: row.get(0)?,
                total: Amount::from_cents(row.get(1)?).as_f64(),
            })
        })?
        .map(|maybe_total| maybe_total.map_err(Error::from))
        .collect()
}

#[cfg(test)]
mod analytics_query_tests {
    use crate::{
        auth::UserID,
        category::{CategoryName, create_category},
        expense::{Amount, NewExpense, create_expense},
        test_utils::{get_test_connection, insert_test_user},
    };

    use super::{CategoryTotal, get_category_totals, get_total_expense};

    #[test]
    fn category_total_uses_aggregate_keys() {
        let total = CategoryTotal {
            category: "Food".to_owned(),
            total: 12.5,
        };

        assert_eq!(
            serde_json::to_value(&total).unwrap(),
            serde_json::json!({ "category__name": "Food", "amount__sum": 12.5 })
        );
    }

    #[test]
    fn totals_are_zero_without_expenses() {
        let connection = get_test_connection();

        assert_eq!(
            get_total_expense(UserID::new(1), &connection),
            Ok(Amount::from_cents(0))
        );
        assert_eq!(get_category_totals(UserID::new(1), &connection), Ok(vec![]));
    }

    #[test]
    fn sums_per_category_for_one_user() {
        let connection = get_test_connection();
        let alice = insert_test_user("alice", "averystrongandsecurepassword", &connection).id;
        let bob = insert_test_user("bob", "averystrongandsecurepassword", &connection).id;
        let rent = create_category(CategoryName::new_unchecked("Rent"), &connection).unwrap();
        let food = create_category(CategoryName::new_unchecked("Food"), &connection).unwrap();

        for (cents, category_id, user_id) in [
            (1000, food.id, alice),
            (2050, food.id, alice),
            (3000, rent.id, alice),
            (9900, rent.id, bob),
        ] {
            create_expense(
                &NewExpense {
                    amount: Amount::from_cents(cents),
                    category_id,
                    user_id,
                },
                &connection,
            )
            .unwrap();
        }

        assert_eq!(
            get_total_expense(alice, &connection),
            Ok(Amount::from_cents(6050))
        );
        assert_eq!(
            get_category_totals(alice, &connection),
            Ok(vec![
                CategoryTotal {
                    category: "Food".to_owned(),
                    total: 30.5,
                },
                CategoryTotal {
                    category: "Rent".to_owned(),
                    total: 30.0,
                },
            ])
        );
    }
}
