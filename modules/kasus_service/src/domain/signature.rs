//! Decoded signature / photo payloads and the image store seam
//!
//! Clients send images as data-URIs (`data:image/png;base64,...`). Decoding and format
//! checks live here and nowhere else; the rest of the service handles [`SignatureImage`].

use crate::contract::{SignatureInput, SignatureRef, SignatureSet, ValidationErrors};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::collections::HashSet;
use uuid::Uuid;

/// Accepted image subtypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
}

impl ImageFormat {
    /// Parse the subtype of a `data:image/{subtype}` header
    pub fn from_subtype(subtype: &str) -> Option<Self> {
        match subtype.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "gif" => Some(Self::Gif),
            _ => None,
        }
    }

    /// Accepted `image/*` media types
    pub fn from_mime(media_type: &mime::Mime) -> Option<Self> {
        if media_type.type_() != mime::IMAGE {
            return None;
        }
        Self::from_subtype(media_type.subtype().as_str())
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Gif => "gif",
        }
    }

    fn matches_magic(&self, bytes: &[u8]) -> bool {
        match self {
            Self::Png => bytes.starts_with(&[0x89, b'P', b'N', b'G']),
            Self::Jpeg => bytes.starts_with(&[0xFF, 0xD8, 0xFF]),
            Self::Gif => bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a"),
        }
    }
}

/// Why a payload was refused
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureDecodeError {
    #[error("payload is empty")]
    Empty,
    #[error("payload is not an image data-URI")]
    NotDataUri,
    #[error("image type '{0}' is not accepted (png, jpg, jpeg, gif)")]
    UnsupportedType(String),
    #[error("payload is not valid base64")]
    InvalidBase64,
    #[error("image exceeds {limit} bytes")]
    TooLarge { limit: usize },
    #[error("content does not look like a {0} image")]
    ContentMismatch(&'static str),
}

/// Validated image bytes with a known format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureImage {
    format: ImageFormat,
    bytes: Vec<u8>,
}

impl SignatureImage {
    /// Decode a `data:image/{type};base64,{payload}` string
    pub fn from_data_uri(input: &str, max_bytes: usize) -> Result<Self, SignatureDecodeError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(SignatureDecodeError::Empty);
        }

        let (media_type, payload) = input
            .strip_prefix("data:")
            .and_then(|rest| rest.split_once(";base64,"))
            .ok_or(SignatureDecodeError::NotDataUri)?;
        let media_type: mime::Mime = media_type.parse().map_err(|_| SignatureDecodeError::NotDataUri)?;
        if media_type.type_() != mime::IMAGE {
            return Err(SignatureDecodeError::NotDataUri);
        }
        let format = ImageFormat::from_mime(&media_type)
            .ok_or_else(|| SignatureDecodeError::UnsupportedType(media_type.subtype().to_string()))?;

        // base64 inflates by 4/3; refuse before allocating for oversized payloads
        if payload.len() / 4 * 3 > max_bytes + 3 {
            return Err(SignatureDecodeError::TooLarge { limit: max_bytes });
        }
        let bytes = STANDARD
            .decode(payload.trim())
            .map_err(|_| SignatureDecodeError::InvalidBase64)?;
        if bytes.is_empty() {
            return Err(SignatureDecodeError::Empty);
        }
        if bytes.len() > max_bytes {
            return Err(SignatureDecodeError::TooLarge { limit: max_bytes });
        }
        if !format.matches_magic(&bytes) {
            return Err(SignatureDecodeError::ContentMismatch(format.extension()));
        }

        Ok(Self { format, bytes })
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// File storage for decoded images
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persist an image and return an opaque reference to it
    async fn store(&self, category: &str, image: &SignatureImage) -> anyhow::Result<SignatureRef>;

    /// Remove a previously stored image; missing files are not an error
    async fn remove(&self, reference: &SignatureRef) -> anyhow::Result<()>;
}

/// Validate every signer entry of a batch.
///
/// Each entry needs a distinct user id belonging to `team_members` and a decodable payload. Problems
/// are recorded under `{field}.{index}.user_id` / `{field}.{index}.signature`.
pub fn decode_team_signatures(
    field: &str,
    inputs: &[SignatureInput],
    team_members: &[Uuid],
    max_bytes: usize,
    errors: &mut ValidationErrors,
) -> Vec<(Uuid, SignatureImage)> {
    let mut decoded = Vec::with_capacity(inputs.len());
    let mut seen = HashSet::with_capacity(inputs.len());
    for (i, input) in inputs.iter().enumerate() {
        let user_id = match input.user_id {
            // One file per signer; a repeated entry would leave an unreferenced file behind
            Some(id) if !seen.insert(id) => {
                errors.add(format!("{field}.{i}.user_id"), "duplicate signer");
                None
            }
            Some(id) if team_members.contains(&id) => Some(id),
            Some(_) => {
                errors.add(
                    format!("{field}.{i}.user_id"),
                    "signer is not a member of the assigned team",
                );
                None
            }
            None => {
                errors.add(format!("{field}.{i}.user_id"), "user_id is required");
                None
            }
        };

        let image = match input.signature.as_deref().map(str::trim) {
            None | Some("") => {
                errors.add(format!("{field}.{i}.signature"), "signature is required");
                None
            }
            Some(payload) => match SignatureImage::from_data_uri(payload, max_bytes) {
                Ok(image) => Some(image),
                Err(e) => {
                    errors.add(format!("{field}.{i}.signature"), e.to_string());
                    None
                }
            },
        };

        if let (Some(user_id), Some(image)) = (user_id, image) {
            decoded.push((user_id, image));
        }
    }
    decoded
}

/// Decode one optional standalone image field (survey photo, holder signature)
pub fn decode_single(
    field: &str,
    input: Option<&str>,
    required: bool,
    max_bytes: usize,
    errors: &mut ValidationErrors,
) -> Option<SignatureImage> {
    match input.map(str::trim) {
        None | Some("") => {
            if required {
                errors.add(field, format!("{field} is required"));
            }
            None
        }
        Some(payload) => match SignatureImage::from_data_uri(payload, max_bytes) {
            Ok(image) => Some(image),
            Err(e) => {
                errors.add(field, e.to_string());
                None
            }
        },
    }
}

/// Write a decoded batch to the store.
///
/// On failure every file written by this call is removed again before the error is returned.
pub async fn store_batch(
    store: &dyn ImageStore,
    category: &str,
    images: &[(Uuid, SignatureImage)],
) -> anyhow::Result<SignatureSet> {
    let mut stored: Vec<(Uuid, SignatureRef)> = Vec::with_capacity(images.len());
    for (user_id, image) in images {
        match store.store(category, image).await {
            Ok(reference) => stored.push((*user_id, reference)),
            Err(e) => {
                discard(store, stored.iter().map(|(_, r)| r).collect::<Vec<_>>()).await;
                return Err(e);
            }
        }
    }
    Ok(stored.into_iter().collect())
}

/// Best-effort removal of files that are no longer referenced
pub async fn discard<'a>(store: &dyn ImageStore, refs: impl IntoIterator<Item = &'a SignatureRef>) {
    for reference in refs {
        if let Err(e) = store.remove(reference).await {
            tracing::warn!(file = %reference, error = %e, "failed to remove image file");
        }
    }
}
