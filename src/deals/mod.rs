pub mod duplicate;
pub mod lifecycle;

pub use duplicate::{DuplicateCheck, DuplicateDeal};
pub use lifecycle::{DealFilter, SubmitDeal, SubmittedDeal};
