//! # Expends
//!
//! `expends` is an expense ledger backend. Users authenticate with a paired
//! short-lived access token and long-lived refresh token; the refresh token
//! rotates on every use and exactly one session is live per user, which makes
//! replay of a superseded token detectable. Authenticated users manage their
//! ledger entries ("statements"), with the owner's statement-id list and the
//! statement collection kept consistent by the store layer.

pub mod cli;
pub mod expends;
pub mod store;
