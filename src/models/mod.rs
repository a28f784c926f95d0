pub mod conversation;
pub mod enums;
pub mod profile;

pub use conversation::{ConversationMessage, ReplyMetadata, SymptomReport};
pub use enums::*;
pub use profile::HealthProfile;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },
}
