//! Typed request and response payloads of the charges API.
//!
//! Wire names follow the API's Portuguese camelCase. Monetary values are
//! [`Decimal`](rust_decimal::Decimal) serialized as JSON numbers; calendar dates use the
//! `YYYY-MM-DD` form.

pub mod charge;
pub mod person;
pub mod webhook;

pub use charge::*;
pub use person::*;
pub use webhook::*;

time::serde::format_description!(pub(crate) iso_date, Date, "[year]-[month]-[day]");
