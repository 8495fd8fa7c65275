use std::{
    fmt, fs,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use serde::{Deserialize, Serialize};

use crate::{PlayerError, Result};

/// Play statistics tracked per record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayStats {
    pub play_count: u32,
    /// Unix seconds of the most recent selection.
    #[serde(default)]
    pub last_played: Option<u64>,
}

impl PlayStats {
    fn record_play(&mut self) {
        self.play_count = self.play_count.saturating_add(1);
        self.last_played = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .ok()
            .map(|elapsed| elapsed.as_secs());
    }
}

/// One selectable catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRecord {
    pub artist: String,
    pub title: String,
    pub difficulty: String,
    pub creator: String,
    #[serde(default)]
    pub play_stats: PlayStats,
}

impl ContentRecord {
    pub fn new(
        artist: impl Into<String>,
        title: impl Into<String>,
        difficulty: impl Into<String>,
        creator: impl Into<String>,
    ) -> Self {
        Self {
            artist: artist.into(),
            title: title.into(),
            difficulty: difficulty.into(),
            creator: creator.into(),
            play_stats: PlayStats::default(),
        }
    }

    /// Whether both records describe the same entry, ignoring statistics.
    pub fn same_entry(&self, other: &ContentRecord) -> bool {
        self.artist == other.artist
            && self.title == other.title
            && self.difficulty == other.difficulty
            && self.creator == other.creator
    }
}

impl fmt::Display for ContentRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {} [{}]", self.artist, self.title, self.difficulty)
    }
}

/// Optional selection fields. An empty field matches every record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub artist: String,
    pub title: String,
    pub creator: String,
    pub difficulty: String,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        self.artist.is_empty()
            && self.title.is_empty()
            && self.creator.is_empty()
            && self.difficulty.is_empty()
    }

    /// Exact, case-sensitive comparison of every non-empty field.
    pub fn matches(&self, record: &ContentRecord) -> bool {
        field_matches(&self.artist, &record.artist)
            && field_matches(&self.title, &record.title)
            && field_matches(&self.difficulty, &record.difficulty)
            && field_matches(&self.creator, &record.creator)
    }
}

fn field_matches(wanted: &str, actual: &str) -> bool {
    wanted.is_empty() || wanted == actual
}

impl fmt::Display for FilterCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = [
            ("artist", &self.artist),
            ("title", &self.title),
            ("creator", &self.creator),
            ("difficulty", &self.difficulty),
        ];
        let mut first = true;
        for (name, value) in fields.iter().filter(|(_, value)| !value.is_empty()) {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{name}={value:?}")?;
            first = false;
        }
        if first {
            f.write_str("any")?;
        }
        Ok(())
    }
}

/// Storage collaborator that owns the records.
pub trait Catalog {
    fn load(&mut self) -> Result<Vec<ContentRecord>>;

    /// Persists the updated play statistics of `record`.
    fn record_played(&mut self, record: &ContentRecord) -> Result<()>;
}

/// Index of the first record satisfying `criteria`, in catalog order.
pub fn find_match(criteria: &FilterCriteria, records: &[ContentRecord]) -> Option<usize> {
    records.iter().position(|record| criteria.matches(record))
}

/// Picks exactly one record, bumps its play statistics and persists them.
///
/// The first match in catalog order wins, so all-empty criteria select the
/// first record.
pub fn select_one<C: Catalog + ?Sized>(
    criteria: &FilterCriteria,
    catalog: &mut C,
) -> Result<ContentRecord> {
    let mut records = catalog.load()?;
    let index = find_match(criteria, &records).ok_or_else(|| PlayerError::NotFound {
        criteria: criteria.to_string(),
    })?;

    let mut record = records.swap_remove(index);
    record.play_stats.record_play();
    catalog.record_played(&record)?;

    tracing::info!(
        artist = %record.artist,
        title = %record.title,
        difficulty = %record.difficulty,
        plays = record.play_stats.play_count,
        "beatmap selected"
    );
    Ok(record)
}

/// Catalog stored as a JSON array of records.
#[derive(Debug, Clone)]
pub struct JsonCatalog {
    path: PathBuf,
}

impl JsonCatalog {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn store(&self, records: &[ContentRecord]) -> Result<()> {
        let json = serde_json::to_string_pretty(records)?;
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, json)?;
        fs::rename(&staging, &self.path)?;
        Ok(())
    }
}

impl Catalog for JsonCatalog {
    fn load(&mut self) -> Result<Vec<ContentRecord>> {
        if !self.path.exists() {
            tracing::warn!(path = ?self.path, "catalog file missing, treating as empty");
            return Ok(Vec::new());
        }
        let contents = fs::read_to_string(&self.path)?;
        let records: Vec<ContentRecord> = serde_json::from_str(&contents)?;
        tracing::debug!(path = ?self.path, count = records.len(), "catalog loaded");
        Ok(records)
    }

    fn record_played(&mut self, record: &ContentRecord) -> Result<()> {
        let mut records = self.load()?;
        let slot = records
            .iter_mut()
            .find(|stored| stored.same_entry(record))
            .ok_or_else(|| {
                PlayerError::msg(format!("`{record}` disappeared from the catalog"))
            })?;
        slot.play_stats = record.play_stats.clone();
        self.store(&records)
    }
}
