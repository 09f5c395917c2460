pub mod review_recorder;

pub use review_recorder::ReviewRecorder;
