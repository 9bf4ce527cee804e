pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod fetch;
pub mod filters;
pub mod script;
pub mod selection;
pub mod session;
pub mod snapshot;
pub mod tree;
pub mod url_sync;
pub mod viewport;

pub use error::{BrowseError, Result};
pub use filters::{FilterComposer, FilterSet};
pub use selection::{SelectionController, SelectionPath};
pub use session::{BrowseEvent, BrowseSession};
pub use tree::CategoryTree;
