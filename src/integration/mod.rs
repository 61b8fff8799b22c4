//! Integration scenarios run against local fixtures

pub mod e2e;
pub mod fixtures;
