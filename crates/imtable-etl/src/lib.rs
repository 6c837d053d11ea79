//! Build pipeline stages for imtable.
//!
//! Implements the assemble and convert stages as treadle `Stage`
//! implementations, plus the standalone refinement transforms and
//! source-tree discovery.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod assemble;
pub mod config;
pub mod convert;
pub mod discover;
pub mod error;
pub mod pipeline;
pub mod refine;
pub mod work_item;

pub use assemble::{assemble_fragments, AssembleStage};
pub use config::Config;
pub use convert::{convert_table, ConvertStage};
pub use discover::discover_tables;
pub use error::{EtlError, EtlResult};
pub use pipeline::build_pipeline;
pub use work_item::TableJob;
