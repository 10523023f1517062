pub mod output;
pub mod store;
pub mod walker;

pub use output::{create_writer, JsonWriter, OutputFormat, OutputWriter, TerminalWriter};
pub use store::{read_json, ResultStore};
pub use walker::{FileWalker, InMemoryTree, SourceTree};
