pub mod file_format;
pub mod file_utils;
pub mod log_setup;
pub mod test_utils;

pub use file_format::{
    deserialize, get_file_extension, read_config_file, serialize, FileExtensionError,
    FileFormatResult, SerdeFormat, SerdeFormatError, SerdeFormatResult,
};
pub use log_setup::setup_logging;
