//! Contact-form validation and animated stat counters for a product landing
//! page, driven by cancellable scheduled tasks.

pub mod counter;
pub mod feedback;
pub mod form;
pub mod motion;
pub mod prelude;
pub mod schedule;
pub mod stats;
pub mod view;
