//! Shared helpers for integration tests.

#![allow(dead_code)]

pub mod pdf;
pub mod socket_guard;
