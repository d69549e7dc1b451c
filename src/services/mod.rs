pub mod phone_parser;
pub mod uploader;

pub use phone_parser::parse_phone_numbers;
pub use uploader::{AttachmentUploader, EnqueueReport, StagedFile};
