use chrono::NaiveDate;

use crate::database::models::Position;

pub mod billing;
pub mod employee;
pub mod payroll;

pub use billing::BillingRepository;
pub use employee::EmployeeRepository;
pub use payroll::PayrollRepository;

/// Human-readable month label used in duplicate errors and batch skip
/// reasons, e.g. "March 2025".
pub fn period_label(date: NaiveDate) -> String {
    date.format("%B %Y").to_string()
}

/// Report label for a stored position string, e.g. "cleaning_service" into
/// "Cleaning Service". Unknown strings pass through unchanged.
pub fn position_display(stored: &str) -> String {
    stored
        .parse::<Position>()
        .map(|p| p.display_name().to_string())
        .unwrap_or_else(|_| stored.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_label_is_month_and_year() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();
        assert_eq!(period_label(date), "March 2025");
    }

    #[test]
    fn position_display_maps_storage_strings() {
        assert_eq!(position_display("cleaning_service"), "Cleaning Service");
        assert_eq!(position_display("security"), "Security");
        assert_eq!(position_display("mystery_role"), "mystery_role");
    }
}
