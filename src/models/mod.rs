mod bank_account;
mod credential;
mod rule;
mod task_run;
mod transaction;
mod user;

pub use bank_account::{AccountType, BankAccount};
pub use credential::StatementCredential;
pub use rule::RuleRow;
pub use task_run::{TaskRun, TaskStatus};
pub use transaction::{is_standard_field, Direction, ScalarValue, Transaction, TransactionFields};
pub use user::User;
