//! # Document Registry
//!
//! A file-backed document-metadata registry with three core operations:
//! durable ingestion of document records, keyword search with citation
//! evidence, and rule-based compliance alerting, all over a single evolving
//! collection without a database engine underneath.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌───────────┐   ┌──────────────┐
//! │  Codec   │──▶│   Store   │◀──│  JSON file    │
//! │ validate │   │ put/get/  │   │ (atomic swap) │
//! └──────────┘   │ snapshot  │   └──────────────┘
//!                └─────┬─────┘
//!            snapshot  │  snapshot
//!            ┌─────────┴──────────┐
//!            ▼                    ▼
//!       ┌─────────┐         ┌────────────┐
//!       │ Search  │         │ Compliance │
//!       │ ranked  │         │   alerts   │
//!       └─────────┘         └────────────┘
//! ```
//!
//! The store is the single source of truth; the query and compliance
//! engines hold no state and operate on a borrowed snapshot per call.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`error`] | Error taxonomy |
//! | [`models`] | Core data types |
//! | [`codec`] | Record validation and persisted representation |
//! | [`store`] | Durable document store |
//! | [`search`] | Keyword search with citations |
//! | [`compliance`] | Rule registry and evaluation |
//! | [`server`] | JSON HTTP server |

pub mod codec;
pub mod compliance;
pub mod config;
pub mod error;
pub mod models;
pub mod search;
pub mod server;
pub mod store;
