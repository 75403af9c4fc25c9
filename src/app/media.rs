use bytes::Bytes;
use rand::RngCore;
use std::path::Path;

use crate::app::error::BoardError;
use crate::infra::storage::FileStorage;

pub const PUBLIC_PREFIX: &str = "/uploads";

const ALLOWED_IMAGE_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
];

#[derive(Clone)]
pub struct MediaService {
    storage: FileStorage,
}

impl MediaService {
    pub fn new(storage: FileStorage) -> Self {
        Self { storage }
    }

    /// Stores an image and returns its generated file name. Only the declared
    /// content type is checked.
    pub async fn store_image(
        &self,
        original_name: &str,
        content_type: &str,
        bytes: Bytes,
    ) -> Result<String, BoardError> {
        if !is_allowed_image(content_type) {
            return Err(BoardError::invalid("invalid file type"));
        }

        let file_name = generate_file_name(original_name);
        self.storage.put(&file_name, bytes).await?;
        tracing::info!(file_name = %file_name, content_type = %content_type, "image stored");
        Ok(file_name)
    }
}

pub fn is_allowed_image(content_type: &str) -> bool {
    ALLOWED_IMAGE_TYPES.contains(&content_type)
}

/// 32 random hex characters followed by the original extension, if any.
pub fn generate_file_name(original_name: &str) -> String {
    let mut random = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut random);
    let stem = hex::encode(random);

    match Path::new(original_name).extension().and_then(|ext| ext.to_str()) {
        Some(ext) if !ext.is_empty() => format!("{}.{}", stem, ext),
        _ => stem,
    }
}

pub fn public_url(file_name: &str) -> String {
    format!("{}/{}", PUBLIC_PREFIX, file_name)
}
