//! Concrete storage implementation: a plain-JSON file per key with atomic
//! writes, backing the shared `StateStore` contract.

pub mod json_file_store;
