pub mod content_type;
pub mod upload_store;

pub use content_type::content_type_for;
pub use upload_store::{read_asset, ImageStore, UploadStore};
