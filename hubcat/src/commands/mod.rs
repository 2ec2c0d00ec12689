/// Catalog consolidation
pub mod consolidate;

/// Single repository inspection
pub mod inspect;
