pub mod draft;
pub mod session;
pub mod task;
pub mod wire;

pub use draft::{
    Attachment, AttachmentKind, Draft, DraftField, DraftKey, PreviewHandle, SubmitPhase,
    UploadState,
};
pub use session::WorkerSession;
pub use task::Task;
pub use wire::{
    ApiEnvelope, DeliveryAttachment, DeliveryPayload, LoginData, TaskPageData, TaskRecord,
    UploadData, WorkerInfoData,
};
