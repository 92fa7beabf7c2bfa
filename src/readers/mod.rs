pub mod batch_validator;
pub mod record_parser;
pub mod upload_reader;

pub use batch_validator::BatchValidator;
pub use record_parser::RecordParser;
pub use upload_reader::UploadReader;
