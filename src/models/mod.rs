pub mod attachment;
pub mod conversation;
pub mod feedback;
pub mod message;
pub mod profile;
pub mod reply;

pub use attachment::{ImageAttachment, PreviewId};
pub use conversation::Conversation;
pub use feedback::{FeedbackRequest, MadeStatus};
pub use message::{ImageRef, LocalId, Message, MessageId};
pub use profile::{Profile, ProfileField, ProfileRequest};
pub use reply::{AssistantReply, LongTermDelta, ParsedInfo, Recipe};
