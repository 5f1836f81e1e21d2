pub mod client;
pub mod error;

pub use client::LessonPushClient;
pub use error::{SdkError, SdkResult};
pub use lessonpush_core::DeviceRegistrationRequest;
