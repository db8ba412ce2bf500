//! Expenses recorded by users against categories.

mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod list;

pub use create::create_expense_endpoint;
pub use db::{
    create_expense, create_expense_table, delete_expense, get_expense, get_expenses_by_user,
    update_expense,
};
pub use delete::delete_expense_endpoint;
pub use domain::{Amount, Expense, ExpenseData, ExpenseId, NewExpense};
pub use edit::{get_expense_endpoint, update_expense_endpoint};
pub use list::list_expenses_endpoint;
