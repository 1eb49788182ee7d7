//! Pure comparison helpers shared by every document check. No I/O.

pub mod dates;
pub mod names;

pub use dates::{dates_match, normalize_date, parse_date};
pub use names::is_name_match;
