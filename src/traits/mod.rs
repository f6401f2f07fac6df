pub mod media_provider;
pub mod recorder_delegate;
