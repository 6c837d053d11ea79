pub mod definition;
pub mod entry;
pub mod source;

pub use definition::Definition;
pub use entry::Entry;
pub use source::TableSource;
