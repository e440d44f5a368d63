//! Selection context, navigation cursor, and the store binding them.

mod cursor;
mod selection;
mod store;

pub use cursor::{Classification, Cursor};
pub use selection::Selection;
pub use store::{Result, SharedStore, SourceStore, StoreError, StoreSnapshot};
