pub mod content;
pub mod media;
pub mod time_serde;
