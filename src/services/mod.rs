pub mod chat;
pub mod conversation;
pub mod ids;
pub mod pending;
pub mod preview;
pub mod profile;
pub mod timeline;

pub use chat::{SendJob, SendOutcome, SendPhase};
pub use conversation::{ConversationDirectory, ConversationGroup, DayBucket};
pub use ids::LocalIdAllocator;
pub use pending::PendingRegistry;
pub use preview::PreviewStore;
pub use profile::{ProfileDraft, ProfileEditError, ProfileState};
pub use timeline::Timeline;
