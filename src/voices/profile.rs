use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Built-in preset vs. user-created clone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceKind {
    Base,
    Custom,
}

/// A synthesizable voice: a built-in preset or a cloned reference recording.
#[derive(Debug, Clone, Serialize)]
pub struct VoiceProfile {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: VoiceKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Stored reference recording, present only for custom voices.
    #[serde(skip)]
    pub reference_audio: Option<PathBuf>,
}

impl VoiceProfile {
    pub fn builtin(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: None,
            kind: VoiceKind::Base,
            created_at: None,
            reference_audio: None,
        }
    }

    /// Fallback profile for a voice directory whose metadata record is
    /// missing or unreadable.
    pub fn degraded(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: id.to_string(),
            description: None,
            kind: VoiceKind::Custom,
            created_at: None,
            reference_audio: None,
        }
    }

    pub fn from_metadata(metadata: VoiceMetadata) -> Self {
        Self {
            id: metadata.id,
            name: metadata.name,
            description: Some(metadata.description),
            kind: VoiceKind::Custom,
            created_at: Some(metadata.created_at),
            reference_audio: None,
        }
    }
}

/// The metadata record persisted next to a clone's reference recording.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceMetadata {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub created_at: String,
}
