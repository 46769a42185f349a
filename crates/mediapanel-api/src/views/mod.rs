//! Server-rendered HTML: the library page, the picker fragment and the
//! embeddable picker components.

pub mod components;
pub mod layout;
pub mod library;

pub use components::{media_button, media_input, PickerOptions};
pub use library::{flatten_tree, index_page, modal_body, FolderOption, LibraryView};
