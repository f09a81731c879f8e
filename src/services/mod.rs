pub mod aggregator;
pub mod classifier;
pub mod filters;
pub mod report_service;
pub mod resolver;
pub mod ridership;
pub mod shift_service;

pub use report_service::ReportService;
pub use ridership::RidershipService;
pub use shift_service::ShiftService;
