//! Core module tests
//!
//! Contains test suites for core functionality:
//! - Key file parsing and classification
//! - Keyspace allocation
//! - Key usage and conflict detection
//! - Validation of binding fields
