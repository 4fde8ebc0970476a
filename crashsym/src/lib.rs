//! # crashsym - Managed Crash-Dump Symbolication
//!
//! crashsym turns the raw stack frames of a captured crash report into
//! human-readable source locations. Managed frames arrive as
//! (module id, method token, IL offset) triples and are resolved against
//! per-scan-root symbol indexes; native frames arrive as raw addresses and
//! are resolved against an offline symbol index, with an external symbolizer
//! subprocess as the fallback.
//!
//! ## Architecture Overview
//!
//! ```text
//!  crash.json ──▶ report::request (parse) ──▶ SymbolicationRequest
//!                                                   │
//!                    ┌──────────────────────────────┴──────────┐
//!                    ▼                                          ▼
//!            managed frames                              native frames
//!                    │                                          │
//!          index::SymbolIndex × N                 native::NativeOffsetMap
//!          (priority order, each built            native::SymbolizerSession
//!           by scan:: or loaded from a            (lazily started subprocess)
//!           gzip cache)                                         │
//!                    └─────────────────┬────────────────────────┘
//!                                      ▼
//!                          report::output (annotated JSON)
//! ```
//!
//! ## Module Structure
//!
//! - [`index`]: the per-root symbol index (method key → identity + sequence
//!   table), its builder, and the gzip-compressed cache format
//! - [`scan`]: walking a scan root and feeding module symbol dumps into an
//!   index builder through the [`scan::ModuleReader`] boundary
//! - [`native`]: the offline native symbol index, the external symbolizer
//!   session, and the builder behind `--write-native-index`
//! - [`report`]: crash report parsing, frame resolution, and emission
//! - [`cli`]: command-line argument parsing
//! - [`domain`]: core identity types and structured errors
//!
//! The pipeline is strictly sequential: scan (or cache load), then parse,
//! then resolve, then emit. Indexes are immutable once built (the builder
//! type is consumed to produce them), so resolution needs no locking.

pub mod cli;
pub mod domain;
pub mod index;
pub mod native;
pub mod report;
pub mod scan;
