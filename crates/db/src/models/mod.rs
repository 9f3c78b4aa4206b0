//! Row structs mapping database tables to domain types.

pub mod todo;
