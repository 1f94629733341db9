// Job listing engine: industry classification, facet aggregation, pill filtering,
// fuzzy search and pagination over an immutable job snapshot.
// Everything below `handlers` is pure and synchronous; the only I/O is the bulk job fetch
// behind `store::JobStore`, driven by `catalog`.

pub mod classifier;
pub mod facets;
pub mod filters;
pub mod fuzzy;
pub mod handlers;
pub mod matcher;
pub mod pagination;
pub mod pipeline;
pub mod session;
pub mod snapshot;
pub mod taxonomy;
