//! # Track Catalog
//!
//! Read-mostly registry of the ambient tracks the engine can play.
//!
//! Tracks are immutable once loaded. The catalog is never edited entry by
//! entry: [`TrackCatalog::load_tracks`] validates a complete new set and swaps
//! it in atomically, so a rejected load leaves the previous catalog intact.

use crate::error::{PlaybackError, Result};
use bridge_traits::SourceKind;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// One playable ambient track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Unique catalog key
    pub id: String,
    /// Display name
    pub name: String,
    /// Primary source URI
    pub source: String,
    /// Alternate source tried once when a local primary fails to start
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_source: Option<String>,
    /// Known duration, if any
    #[serde(
        default,
        rename = "duration_ms",
        with = "duration_ms",
        skip_serializing_if = "Option::is_none"
    )]
    pub duration: Option<Duration>,
}

impl Track {
    pub fn new(id: impl Into<String>, name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            source: source.into(),
            fallback_source: None,
            duration: None,
        }
    }

    pub fn with_fallback(mut self, uri: impl Into<String>) -> Self {
        self.fallback_source = Some(uri.into());
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Where the primary source lives.
    pub fn source_kind(&self) -> SourceKind {
        SourceKind::of(&self.source)
    }

    /// Fallback source, honoured only when the primary is bundled with the
    /// application. Remote primaries never fall back.
    pub fn effective_fallback(&self) -> Option<&str> {
        if self.source_kind().is_remote() {
            return None;
        }
        self.fallback_source
            .as_deref()
            .filter(|fallback| *fallback != self.source)
    }

    /// Ordered start attempts: the primary, then at most one fallback.
    pub fn candidates(&self) -> Vec<String> {
        std::iter::once(self.source.clone())
            .chain(self.effective_fallback().map(str::to_string))
            .collect()
    }

    fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(PlaybackError::InvalidTrack(format!(
                "track '{}' has an empty id",
                self.name
            )));
        }
        if self.source.trim().is_empty() {
            return Err(PlaybackError::InvalidTrack(format!(
                "track '{}' has an empty source",
                self.id
            )));
        }
        Ok(())
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(duration) => serializer.serialize_u64(duration.as_millis() as u64),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
    }
}

#[derive(Debug, Default)]
struct CatalogEntries {
    order: Vec<Track>,
    index: HashMap<String, usize>,
}

impl CatalogEntries {
    fn build(tracks: Vec<Track>) -> Result<Self> {
        let mut index = HashMap::with_capacity(tracks.len());
        for (position, track) in tracks.iter().enumerate() {
            track.validate()?;
            if index.insert(track.id.clone(), position).is_some() {
                return Err(PlaybackError::DuplicateTrack(track.id.clone()));
            }
        }
        Ok(Self {
            order: tracks,
            index,
        })
    }
}

/// Thread-safe, atomically replaceable track registry.
#[derive(Debug, Default)]
pub struct TrackCatalog {
    entries: RwLock<CatalogEntries>,
}

impl TrackCatalog {
    /// Empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog seeded with the built-in ambient tracks.
    pub fn with_default_tracks() -> Self {
        let entries = CatalogEntries::build(default_tracks()).unwrap_or_default();
        Self {
            entries: RwLock::new(entries),
        }
    }

    /// Catalog holding `tracks`, validated like [`TrackCatalog::load_tracks`].
    pub fn from_tracks(tracks: Vec<Track>) -> Result<Self> {
        Ok(Self {
            entries: RwLock::new(CatalogEntries::build(tracks)?),
        })
    }

    pub fn resolve(&self, track_id: &str) -> Option<Track> {
        let entries = self.entries.read();
        entries
            .index
            .get(track_id)
            .map(|&position| entries.order[position].clone())
    }

    /// Alternate source for `track_id`, only when its primary is local.
    pub fn fallback_for(&self, track_id: &str) -> Option<String> {
        self.resolve(track_id)
            .and_then(|track| track.effective_fallback().map(str::to_string))
    }

    /// Replace the whole catalog.
    ///
    /// Empty or duplicate ids reject the entire load and keep the current
    /// entries.
    pub fn load_tracks(&self, tracks: Vec<Track>) -> Result<()> {
        let entries = CatalogEntries::build(tracks)?;
        *self.entries.write() = entries;
        Ok(())
    }

    /// Parse a JSON array of tracks and load it.
    ///
    /// ```
    /// use core_playback::TrackCatalog;
    ///
    /// let catalog = TrackCatalog::new();
    /// catalog
    ///     .load_tracks_json(r#"[{ "id": "x", "name": "X", "source": "/local/x.mp3",
    ///                            "fallback_source": "https://cdn/x.ogg" }]"#)
    ///     .unwrap();
    /// assert_eq!(catalog.fallback_for("x").as_deref(), Some("https://cdn/x.ogg"));
    /// ```
    pub fn load_tracks_json(&self, json: &str) -> Result<()> {
        let tracks: Vec<Track> = serde_json::from_str(json)?;
        self.load_tracks(tracks)
    }

    /// Tracks in load order.
    pub fn tracks(&self) -> Vec<Track> {
        self.entries.read().order.clone()
    }

    pub fn contains(&self, track_id: &str) -> bool {
        self.entries.read().index.contains_key(track_id)
    }

    pub fn len(&self) -> usize {
        self.entries.read().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The six ambient tracks offered on the healing page.
pub fn default_tracks() -> Vec<Track> {
    vec![
        Track::new("rain-ambient", "Rain Ambience", "/audio/rain.mp3")
            .with_fallback("https://actions.google.com/sounds/v1/weather/rain_heavy_loud.ogg"),
        Track::new(
            "soft-piano",
            "Soft Piano",
            "https://actions.google.com/sounds/v1/ambiences/magical_chime.ogg",
        ),
        Track::new(
            "sleep-music",
            "Sleep Music",
            "https://actions.google.com/sounds/v1/ambiences/overnight_silence.ogg",
        ),
        Track::new(
            "nature-sounds",
            "Nature Sounds",
            "https://actions.google.com/sounds/v1/weather/thunder_crack.ogg",
        ),
        Track::new(
            "meditation",
            "Meditation",
            "https://actions.google.com/sounds/v1/ambiences/rolling_brook.ogg",
        ),
        Track::new(
            "relaxing-nature",
            "Relaxing Nature",
            "https://actions.google.com/sounds/v1/weather/wind.ogg",
        ),
    ]
}
