//! Domains module containing business logic organized by bounded contexts.
//!
//! The Whistle server exposes a single context: the tools that wrap the
//! backend REST API.

pub mod tools;
