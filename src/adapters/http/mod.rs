//! Downstream HTTP delivery

pub mod sender;

pub use sender::{BatchSender, DryRunSender, HttpSender, SendOutcome};
