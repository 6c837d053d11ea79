pub mod assemble;
pub mod build;
pub mod config;
pub mod convert;
pub mod refine;
pub mod status;

pub use assemble::run_assemble;
pub use build::{run_build, run_build_all};
pub use convert::run_convert;
pub use refine::run_refine;
pub use status::show_status;
