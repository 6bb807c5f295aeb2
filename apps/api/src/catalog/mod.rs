// Job profile catalog: records, sources, the live snapshot store and the
// taxonomy views (families, filtered listings, comparison, job maps).

pub mod handlers;
pub mod models;
pub mod source;
pub mod store;
pub mod taxonomy;
