/// Data layer: core types, loading, filtering and role classification.
///
/// Architecture:
/// ```text
///   URL / path
///        │
///        ▼
///   ┌──────────┐
///   │  source   │  fetch bytes, reject HTML, declare format
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse CSV / Excel, coerce, zero-fill → PlayerTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  cache    │  PlayerTable per source
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  FilterSpec → order-preserving sub-table
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  roles    │  best role per player
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ pipeline  │  project display columns → DisplayTable
///   └──────────┘
/// ```

pub mod cache;
pub mod filter;
pub mod loader;
pub mod model;
pub mod pipeline;
pub mod roles;
pub mod source;
