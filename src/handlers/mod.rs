pub mod billing;
pub mod employees;
pub mod payroll;
pub mod shared;
