use crate::models::LocalId;

/// Hands out local message ids for the lifetime of the session.
#[derive(Debug, Default)]
pub struct LocalIdAllocator {
    last: u64,
}

impl LocalIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> LocalId {
        self.last += 1;
        LocalId::new(self.last)
    }
}
