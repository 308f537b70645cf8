//! Data layer: core types, ingestion, and result export.
//!
//! Architecture:
//! ```text
//!  .csv / .json test record
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  resolve channels → Vec<Sample>
//!   └──────────┘
//!        │
//!        ▼
//!    analysis pipeline  (see crate::analysis)
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  export   │  cycle table / skeleton / envelope → .csv
//!   └──────────┘
//! ```
//!
//! The numeric core itself never touches a file handle; only this layer and
//! the binaries do.

pub mod export;
pub mod loader;
pub mod model;
