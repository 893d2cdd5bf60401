//! Dialect parser tests
//!
//! Tests for:
//! - Script fragment extraction (modules, classes, methods, functions)
//! - Grammar fragment extraction (grammars, rules)
//! - Change-list fragment extraction
//! - Fragment tree invariants shared by all dialects

pub mod tests_invariants;
