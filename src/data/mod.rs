/// Data layer: record types, loading, caching, and the queries pages run.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → RawTable → Dataset<T>
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  store    │  one memoized Dataset per source file
///   └──────────┘
///        │
///        ▼
///   ┌──────────────────┐
///   │ filter / trend    │  rank proximity, exact lookup,
///   └──────────────────┘  per-group series, fuzzy search
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod store;
pub mod trend;
