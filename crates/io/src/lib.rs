// File I/O: spreadsheet + image ingestion, catalogue documents

pub mod csv;
pub mod data_file;
pub mod document;
pub mod error;
pub mod images;
pub mod json;
pub mod xlsx;

pub use data_file::{load_data_file, parse_data_file, parse_data_file_async, DataFormat};
pub use error::IoError;
pub use images::{load_image, load_images};
