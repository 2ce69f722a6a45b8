pub mod profile;

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Utc;
use uuid::Uuid;

use crate::audio::{self, REFERENCE_SAMPLE_RATE};
use crate::error::AppError;

pub use profile::{VoiceKind, VoiceMetadata, VoiceProfile};

/// Built-in voices, in the order they are listed. These ids are reserved.
pub const BUILTIN_VOICES: &[(&str, &str)] = &[
    ("default", "Default"),
    ("warm", "Warm"),
    ("bright", "Bright"),
    ("calm", "Calm"),
];

const METADATA_FILE: &str = "metadata.json";
const REFERENCE_FILE: &str = "reference.wav";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn is_builtin(id: &str) -> bool {
    BUILTIN_VOICES.iter().any(|(builtin, _)| *builtin == id)
}

/// Directory-backed registry of voice profiles.
///
/// Owns one subdirectory per cloned voice, each holding a normalized
/// reference recording and a metadata record. Built-in voices are static
/// and never touch disk.
pub struct VoiceStore {
    root: PathBuf,
}

impl VoiceStore {
    pub fn new(root: PathBuf) -> Result<Self, AppError> {
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// All voices: built-ins first in declared order, then clones in
    /// directory order. Unreadable metadata degrades, it never fails the
    /// listing.
    pub fn list(&self) -> Vec<VoiceProfile> {
        let mut voices: Vec<VoiceProfile> = BUILTIN_VOICES
            .iter()
            .map(|(id, name)| VoiceProfile::builtin(id, name))
            .collect();

        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(
                    "Failed to read voices directory {}: {}",
                    self.root.display(),
                    e
                );
                return voices;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let id = entry.file_name().to_string_lossy().to_string();
            voices.push(self.read_profile(&path, &id));
        }

        voices
    }

    /// Register a new voice from an uploaded reference recording.
    ///
    /// The recording is normalized to mono at the reference rate before it
    /// is persisted. A failure at any step removes the partially created
    /// directory.
    pub fn clone_voice(
        &self,
        audio: &[u8],
        name: &str,
        description: &str,
    ) -> Result<VoiceProfile, AppError> {
        let id = self.generate_id();
        let dir = self.root.join(&id);
        fs::create_dir_all(&dir)?;

        match self.provision(&dir, &id, audio, name, description) {
            Ok(profile) => {
                tracing::info!("Cloned voice {} ({})", id, name);
                Ok(profile)
            }
            Err(err) => {
                if let Err(cleanup) = fs::remove_dir_all(&dir) {
                    tracing::error!(
                        "Failed to clean up voice directory {}: {}",
                        dir.display(),
                        cleanup
                    );
                }
                Err(err)
            }
        }
    }

    /// Look up a voice by id. Built-ins resolve statically; clones must
    /// have a directory containing a reference recording.
    pub fn resolve(&self, id: &str) -> Result<VoiceProfile, AppError> {
        if let Some((_, name)) = BUILTIN_VOICES.iter().find(|(builtin, _)| *builtin == id) {
            return Ok(VoiceProfile::builtin(id, name));
        }

        let dir = self.custom_dir(id)?;
        if !dir.is_dir() {
            return Err(AppError::VoiceNotFound(id.to_string()));
        }

        // A directory without a recording is a corrupted or half-deleted
        // clone, not a usable voice.
        let reference = find_reference(&dir)
            .ok_or_else(|| AppError::VoiceNotFound(id.to_string()))?;

        let mut profile = self.read_profile(&dir, id);
        profile.reference_audio = Some(reference);
        Ok(profile)
    }

    /// Remove a cloned voice and its directory. Built-ins are immutable.
    pub fn delete(&self, id: &str) -> Result<(), AppError> {
        if is_builtin(id) {
            return Err(AppError::ReservedVoice(id.to_string()));
        }

        let dir = self.custom_dir(id)?;
        if !dir.is_dir() {
            return Err(AppError::VoiceNotFound(id.to_string()));
        }

        // Drop the metadata record first so a racing resolve observes a
        // missing voice rather than a profile whose audio is gone.
        match fs::remove_file(dir.join(METADATA_FILE)) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        fs::remove_dir_all(&dir)?;

        tracing::info!("Deleted voice {}", id);
        Ok(())
    }

    fn provision(
        &self,
        dir: &Path,
        id: &str,
        audio: &[u8],
        name: &str,
        description: &str,
    ) -> Result<VoiceProfile, AppError> {
        let samples = audio::normalize(audio, REFERENCE_SAMPLE_RATE)?;
        let wav = audio::encode_wav(&samples, REFERENCE_SAMPLE_RATE)?;
        let reference_path = dir.join(REFERENCE_FILE);
        fs::write(&reference_path, wav)?;

        let metadata = VoiceMetadata {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            created_at: Utc::now().format(TIMESTAMP_FORMAT).to_string(),
        };
        fs::write(dir.join(METADATA_FILE), serde_json::to_vec(&metadata)?)?;

        let mut profile = VoiceProfile::from_metadata(metadata);
        profile.reference_audio = Some(reference_path);
        Ok(profile)
    }

    fn read_profile(&self, dir: &Path, id: &str) -> VoiceProfile {
        let record = fs::read(dir.join(METADATA_FILE))
            .ok()
            .and_then(|bytes| serde_json::from_slice::<VoiceMetadata>(&bytes).ok());

        match record {
            Some(metadata) => {
                let mut profile = VoiceProfile::from_metadata(metadata);
                profile.id = id.to_string();
                profile
            }
            None => {
                tracing::warn!("Missing or unreadable metadata for voice {}", id);
                VoiceProfile::degraded(id)
            }
        }
    }

    fn generate_id(&self) -> String {
        loop {
            let id = Uuid::new_v4().to_string();
            if !is_builtin(&id) && !self.root.join(&id).exists() {
                return id;
            }
        }
    }

    fn custom_dir(&self, id: &str) -> Result<PathBuf, AppError> {
        // Ids come straight from request paths; keep them inside the root.
        if id.is_empty() || id.contains(['/', '\\']) || id.contains("..") {
            return Err(AppError::VoiceNotFound(id.to_string()));
        }
        Ok(self.root.join(id))
    }
}

fn find_reference(dir: &Path) -> Option<PathBuf> {
    fs::read_dir(dir)
        .ok()?
        .flatten()
        .map(|entry| entry.path())
        .find(|path| path.extension().map(|ext| ext == "wav").unwrap_or(false))
}
