//! SeaORM entities
//!
//! Database models mapped to tables. Domain code never sees these directly,
//! adapters convert them into `domain::entities` types.

pub mod groups;
