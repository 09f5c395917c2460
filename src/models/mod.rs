pub mod api;
pub mod asset;
pub mod review;

pub use api::{ReviewRequest, UploadResponse};
pub use asset::{Caption, CaptionedUpload, ImageAsset};
pub use review::{ReviewDecision, ReviewStatus};
