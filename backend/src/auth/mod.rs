//! Request authentication
//!
//! Automations belong to an account. The gateway in front of this service
//! authenticates the caller and forwards the account id; everything here
//! only reads it.

pub mod middleware;

pub use middleware::{ACCOUNT_HEADER, AccountOwner};
