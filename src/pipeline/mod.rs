//! Pipeline stages for catalog-to-PDF generation.
//!
//! Each submodule implements exactly one transformation step, so each can
//! be tested on its own.
//!
//! ## Data Flow
//!
//! ```text
//! source ──▶ table ──────────────────────────▶ assemble ──▶ writer
//! (envelope)  │  group → rows                  (order)      (PDF)
//!             ├─ resolve   dotted JSON paths
//!             ├─ describe  HTML → bullets / paragraph
//!             └─ image     URL → embedded image / fallback
//! ```
//!
//! 1. [`source`]   : load and verify the `{status, data}` envelope
//! 2. [`resolve`]  : look up group, name, description, image and extra
//!    values by dotted path
//! 3. [`describe`] : normalise HTML descriptions
//! 4. [`image`]    : fetch, validate and cache product images; the only stage
//!    with per-item network I/O
//! 5. [`table`]    : bucket items into groups and build one table per group
//! 6. [`assemble`] : order title, sections and footer into a document

pub mod assemble;
pub mod describe;
pub mod image;
pub mod resolve;
pub mod source;
pub mod table;
