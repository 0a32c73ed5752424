pub mod billing;
pub mod employee;
pub mod filter;
pub mod payroll;
pub mod position;
pub mod summary;

pub use billing::{BillingBatchItem, BillingBatchRequest, BillingInput, BillingRecord};
pub use employee::{Employee, EmployeeInput};
pub use filter::{BillingFilter, PayrollFilter};
pub use payroll::{
    BatchOutcome, PayrollBatchItem, PayrollBatchRequest, PayrollInput, PayrollRecord, SkippedItem,
};
pub use position::Position;
pub use summary::{BillingSummary, PayrollSummary, PositionBreakdown, PositionCount};
