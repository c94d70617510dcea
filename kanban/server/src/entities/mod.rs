//! `SeaORM` entities for the kanban schema.

pub mod task;
