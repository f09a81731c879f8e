pub mod reports;
pub mod shifts;
pub mod stations;

pub use reports::reports_config;
pub use shifts::shifts_config;
pub use stations::stations_config;
