use thiserror::Error;

use crate::backend::{Backend, BackendError};
use crate::models::{Profile, ProfileField};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileEditError {
    #[error("No {field} entry at index {index} (list has {len})")]
    IndexOutOfRange {
        field: &'static str,
        index: usize,
        len: usize,
    },
}

#[derive(Debug, Default)]
pub struct ProfileState {
    current: Profile,
    revision: u64,
}

impl ProfileState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> &Profile {
        &self.current
    }

    pub fn has_profile(&self) -> bool {
        self.current.has_data()
    }

    /// Bumped every time `current()` is replaced.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn apply_server_update(&mut self, profile: Profile) {
        self.current = profile;
        self.revision += 1;
    }

    pub fn clear(&mut self) {
        self.current = Profile::default();
        self.revision += 1;
    }

    pub fn begin_edit(&self) -> ProfileDraft {
        ProfileDraft {
            base: self.current.clone(),
            working: self.current.clone(),
        }
    }

    /// On success `current()` becomes the server's canonical copy. On failure nothing
    /// changes and the caller still owns the draft.
    pub async fn commit_edit(
        &mut self,
        backend: &dyn Backend,
        draft: &ProfileDraft,
    ) -> Result<&Profile, BackendError> {
        let canonical = backend.update_profile(&draft.working).await?;
        tracing::info!("Profile saved");
        self.apply_server_update(canonical);
        Ok(&self.current)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileDraft {
    base: Profile,
    working: Profile,
}

impl ProfileDraft {
    pub fn profile(&self) -> &Profile {
        &self.working
    }

    pub fn has_changes(&self) -> bool {
        self.base != self.working
    }

    pub fn set_item(
        &mut self,
        field: ProfileField,
        index: usize,
        value: impl Into<String>,
    ) -> Result<(), ProfileEditError> {
        let items = self.working.items_mut(field);
        let len = items.len();
        let slot = items.get_mut(index).ok_or(ProfileEditError::IndexOutOfRange {
            field: field.as_str(),
            index,
            len,
        })?;
        *slot = value.into();
        Ok(())
    }

    pub fn append_item(&mut self, field: ProfileField) -> usize {
        let items = self.working.items_mut(field);
        items.push(String::new());
        items.len() - 1
    }

    pub fn remove_item(
        &mut self,
        field: ProfileField,
        index: usize,
    ) -> Result<String, ProfileEditError> {
        let items = self.working.items_mut(field);
        if index >= items.len() {
            return Err(ProfileEditError::IndexOutOfRange {
                field: field.as_str(),
                index,
                len: items.len(),
            });
        }
        Ok(items.remove(index))
    }
}
