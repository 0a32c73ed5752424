pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod services;

pub use config::{Config, DerivationRules};
pub use database::repositories::{BillingRepository, EmployeeRepository, PayrollRepository};
