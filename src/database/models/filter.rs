use chrono::NaiveDate;
use serde::Deserialize;

use super::Position;

/// Listing filters for payroll records. All supplied predicates are ANDed;
/// the same struct drives the summary aggregation so reports and listings
/// can never disagree on what "the filtered set" means.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollFilter {
    pub position: Option<Position>,
    pub paid: Option<bool>,
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub worker_id: Option<String>,
    pub national_id: Option<String>,
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Listing filters for billing records. Billing has no paid flag; the
/// period-defining date is `period_start`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingFilter {
    pub position: Option<Position>,
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub worker_id: Option<String>,
    pub national_id: Option<String>,
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

// Offsets are computed in i64: u32 page numbers straight off the query
// string would overflow the multiply.
pub fn page_bounds(page: Option<u32>, per_page: Option<u32>) -> (i64, i64) {
    let page = i64::from(page.unwrap_or(1)).max(1);
    let per_page = i64::from(per_page.unwrap_or(15)).clamp(1, 100);
    (per_page, (page - 1) * per_page)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_bounds_defaults() {
        assert_eq!(page_bounds(None, None), (15, 0));
    }

    #[test]
    fn page_bounds_clamps() {
        assert_eq!(page_bounds(Some(0), Some(1000)), (100, 0));
        assert_eq!(page_bounds(Some(3), Some(20)), (20, 40));
    }

    #[test]
    fn page_bounds_takes_the_largest_page_number() {
        let (limit, offset) = page_bounds(Some(u32::MAX), Some(100));
        assert_eq!(limit, 100);
        assert_eq!(offset, (i64::from(u32::MAX) - 1) * 100);
    }
}
