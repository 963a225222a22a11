pub mod bank_account_queries;
pub mod credential_queries;
pub mod retry;
pub mod rule_queries;
pub mod task_run_queries;
pub mod transaction_queries;
pub mod user_queries;
