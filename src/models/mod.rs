pub mod common;
pub mod pagination;
pub mod report;
pub mod shift;

pub use common::*;
pub use pagination::*;
pub use report::*;
pub use shift::*;
