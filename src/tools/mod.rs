mod dated_path;
mod file_hasher;
mod file_scanner;
mod path_validator;
mod removable_media;

pub use dated_path::{date_folder_name, timestamped_file_name};
pub use file_hasher::{calculate_file_hash, files_match};
pub use file_scanner::{FileInfo, has_extension, normalize_extensions, scan_files_with_extensions};
pub use path_validator::{ensure_directory_exists, validate_directory_exists};
pub use removable_media::{
    MediaMonitor, RemovableMedia, diff_new_media, is_drive_mounted, list_removable_media,
};
