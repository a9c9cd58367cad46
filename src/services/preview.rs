use std::collections::HashMap;

use base64::Engine;

use crate::models::{ImageAttachment, PreviewId};

/// Ownership token for one preview. Not `Clone`: releasing it consumes it, so a preview
/// can only be released once.
#[derive(Debug)]
#[must_use = "a preview must be released with PreviewStore::release"]
pub struct ImagePreview {
    id: PreviewId,
}

impl ImagePreview {
    pub fn id(&self) -> PreviewId {
        self.id
    }
}

/// Displayable `data:` URIs for images that have not been uploaded yet.
#[derive(Debug, Default)]
pub struct PreviewStore {
    previews: HashMap<PreviewId, String>,
}

impl PreviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, image: &ImageAttachment) -> ImagePreview {
        let b64 = base64::engine::general_purpose::STANDARD.encode(&image.data);
        let uri = format!("data:{};base64,{}", image.mime_type, b64);
        let id = PreviewId::new();
        self.previews.insert(id, uri);
        ImagePreview { id }
    }

    pub fn release(&mut self, preview: ImagePreview) {
        if self.previews.remove(&preview.id).is_none() {
            tracing::warn!("Released an unknown image preview");
        }
    }

    pub fn data_uri(&self, id: PreviewId) -> Option<&str> {
        self.previews.get(&id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.previews.len()
    }

    pub fn is_empty(&self) -> bool {
        self.previews.is_empty()
    }
}
