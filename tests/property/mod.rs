//! Property-based tests over randomly generated plans

mod structure;
