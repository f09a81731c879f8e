pub mod penalty_records;
pub mod shift_sessions;
pub mod stations;
pub mod tickets;
pub mod validation_records;

pub use penalty_records as penalty_record_entity;
pub use shift_sessions as shift_session_entity;
pub use stations as station_entity;
pub use tickets as ticket_entity;
pub use validation_records as validation_record_entity;

pub use tickets::{TicketStatus, TicketType};
