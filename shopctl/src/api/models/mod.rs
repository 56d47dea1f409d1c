//! Shop API payloads.
//!
//! Request bodies and the typed parts of responses. Every response also carries the
//! `{success, error}` envelope, which [`crate::upstream`] strips before these types are
//! deserialised from the same JSON object.
//!
//! - [`admin`]: benchmarks, data reset, company modules, email logs
//! - [`company`]: settings, SMS balance, pre-delete data check
//! - [`dashboard`]: headline stats and sales metrics
//! - [`pagination`]: page query and paged lists
//! - [`records`]: generic CRUD records
//! - [`reports`]: report previews
//! - [`sms`]: Paystack top-ups
//! - [`swaps`]: device swaps

pub mod admin;
pub mod company;
pub mod dashboard;
pub mod pagination;
pub mod records;
pub mod reports;
pub mod sms;
pub mod swaps;
