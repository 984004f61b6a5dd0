//! Behavioural tests for the protocol crate.
