pub mod normalize;
pub mod path;

pub use normalize::{
    invert_artist, invert_record_artist, lower_function_words, lower_record, sanitize_title,
};
pub use path::{LibraryLayout, PlannedPath, create_folders, file_name};
