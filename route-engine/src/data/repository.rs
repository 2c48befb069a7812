//! Station and line repository.
//!
//! The repository owns the reference data the engine routes over: railway
//! lines, the stations derived from them, and walking links between nearby
//! stations. Data is loaded once from a directory of JSON documents and
//! only reloaded by an explicit [`RailwayData::refresh_data`] call.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::error::DataError;
use super::files::{
    INTERCHANGE_FILE, InterchangeDocument, LINE_INDEX_FILE, LineDocument, LineIndex,
    LineIndexEntry, StationRecord, WalkingLink,
};
use crate::domain::{RailwayLine, Station};

/// Read access to the loaded network, as consumed by the routing engine.
///
/// The engine only ever talks to its data through this trait, so tests and
/// embedders can supply their own source.
pub trait RailwayData {
    /// All stations, sorted by name.
    fn load_stations(&self) -> &[Station];

    /// All railway lines, in load order.
    fn load_railway_lines(&self) -> &[RailwayLine];

    /// Walking links between nearby stations.
    fn walking_links(&self) -> &[WalkingLink];

    /// Look up a station by exact name.
    fn get_station_by_name(&self, name: &str) -> Option<&Station>;

    /// Look up a line by exact name.
    fn get_railway_line_by_name(&self, name: &str) -> Option<&RailwayLine>;

    /// Names of the lines calling at a station, in load order.
    fn get_lines_serving_station(&self, name: &str) -> Vec<String>;

    /// When the current data generation was loaded.
    fn loaded_at(&self) -> DateTime<Utc>;

    /// Reload from the backing store.
    fn refresh_data(&mut self) -> Result<LoadSummary, DataError>;

    /// Lines serving both stations, in load order.
    fn get_common_lines(&self, a: &str, b: &str) -> Vec<String> {
        let b_lines = self.get_lines_serving_station(b);
        self.get_lines_serving_station(a)
            .into_iter()
            .filter(|line| b_lines.contains(line))
            .collect()
    }

    /// Stations where two or more lines meet.
    fn get_interchange_stations(&self) -> Vec<&Station> {
        self.load_stations()
            .iter()
            .filter(|s| s.is_interchange())
            .collect()
    }

    fn validate_station_exists(&self, name: &str) -> bool {
        self.get_station_by_name(name).is_some()
    }

    fn validate_line_exists(&self, name: &str) -> bool {
        self.get_railway_line_by_name(name).is_some()
    }

    fn get_all_station_names(&self) -> Vec<&str> {
        self.load_stations().iter().map(|s| s.name.as_str()).collect()
    }

    /// Stations at either end of some line, in line order.
    fn get_terminus_stations(&self) -> Vec<&Station> {
        let mut termini: Vec<&Station> = Vec::new();
        for line in self.load_railway_lines() {
            let ends = [line.stations().first(), line.stations().last()];
            for station in ends.into_iter().flatten().filter_map(|name| self.get_station_by_name(name)) {
                if !termini.iter().any(|t| t.name == station.name) {
                    termini.push(station);
                }
            }
        }
        termini
    }

    fn get_london_stations(&self) -> Vec<&Station> {
        self.load_stations().iter().filter(|s| s.is_london()).collect()
    }

    /// Stations whose names match `query`, best match first.
    ///
    /// Matching ignores case. An exact name beats a prefix, which beats a
    /// match anywhere else in the name; ties keep name order.
    fn search_stations_by_name(&self, query: &str, limit: usize) -> Vec<&Station> {
        best_matches(self.load_stations(), |s| s.name.as_str(), query, limit)
    }

    /// Lines whose names match `query`, ranked as for stations. Ties keep
    /// load order.
    fn search_lines_by_name(&self, query: &str, limit: usize) -> Vec<&RailwayLine> {
        best_matches(self.load_railway_lines(), RailwayLine::name, query, limit)
    }

    /// Summary counts for the loaded network.
    fn get_network_statistics(&self) -> NetworkStatistics {
        NetworkStatistics {
            total_stations: self.load_stations().len(),
            total_lines: self.load_railway_lines().len(),
            interchange_stations: self.get_interchange_stations().len(),
            walking_links: self.walking_links().len(),
            loaded_at: self.loaded_at(),
        }
    }
}

/// How well a name matches a lowercased query; higher is better.
fn match_score(name: &str, query: &str) -> Option<u8> {
    let name = name.to_lowercase();
    if name == query {
        Some(3)
    } else if name.starts_with(query) {
        Some(2)
    } else if name.contains(query) {
        Some(1)
    } else {
        None
    }
}

fn best_matches<'a, T>(items: &'a [T], name: impl Fn(&T) -> &str, query: &str, limit: usize) -> Vec<&'a T> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<(u8, &T)> = items
        .iter()
        .filter_map(|item| match_score(name(item), &query).map(|score| (score, item)))
        .collect();
    // Stable, so equal scores stay in source order
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().take(limit).map(|(_, item)| item).collect()
}

/// Counts describing the loaded network.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkStatistics {
    pub total_stations: usize,
    pub total_lines: usize,
    pub interchange_stations: usize,
    pub walking_links: usize,
    pub loaded_at: DateTime<Utc>,
}

/// Outcome of loading a data directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    pub lines: usize,
    pub stations: usize,
    pub walking_links: usize,
    /// Files that could not be read, parsed or validated
    pub skipped_files: usize,
}

/// Repository backed by a directory of JSON documents (or built in memory).
#[derive(Debug, Clone)]
pub struct StationLineRepository {
    data_dir: Option<PathBuf>,
    lines: Vec<RailwayLine>,
    stations: Vec<Station>,
    station_index: HashMap<String, usize>,
    line_index: HashMap<String, usize>,
    lines_by_station: HashMap<String, Vec<usize>>,
    walking: Vec<WalkingLink>,
    loaded_at: DateTime<Utc>,
}

/// Everything read from a data directory in one pass.
struct LoadedData {
    lines: Vec<RailwayLine>,
    records: Vec<StationRecord>,
    walking: Vec<WalkingLink>,
    skipped_files: usize,
}

impl StationLineRepository {
    /// Load from a data directory laid out as:
    ///
    /// ```text
    /// <dir>/lines/*.json
    /// <dir>/railway_lines_index_comprehensive.json   (optional)
    /// <dir>/interchange_connections.json             (optional)
    /// ```
    ///
    /// Only a missing directory is an error: unreadable or malformed files
    /// are logged and skipped.
    pub fn load(data_dir: impl Into<PathBuf>) -> Result<Self, DataError> {
        let data_dir = data_dir.into();
        let loaded = load_directory(&data_dir)?;

        let mut repo = Self::index(loaded.lines, loaded.records, loaded.walking);
        repo.data_dir = Some(data_dir);

        info!(
            lines = repo.lines.len(),
            stations = repo.stations.len(),
            walking_links = repo.walking.len(),
            skipped_files = loaded.skipped_files,
            "Loaded network data"
        );
        Ok(repo)
    }

    /// Build a repository from lines already in memory.
    pub fn from_lines(lines: Vec<RailwayLine>) -> Self {
        let records = lines
            .iter()
            .flat_map(|line| line.stations())
            .map(|name| StationRecord {
                name: name.clone(),
                zone: None,
                coordinates: None,
            })
            .collect();
        Self::index(lines, records, Vec::new())
    }

    /// Attach zone/coordinates to a station already on a line.
    ///
    /// Ignored for stations no line serves.
    pub fn with_station_details(mut self, details: Station) -> Self {
        if let Some(&idx) = self.station_index.get(&details.name) {
            let station = &mut self.stations[idx];
            station.zone = details.zone.or(station.zone);
            station.coordinates = details.coordinates.or(station.coordinates);
        }
        self
    }

    /// Add a walking link.
    pub fn with_walking_link(mut self, link: WalkingLink) -> Self {
        self.walking.push(link);
        self
    }

    /// Directory this repository was loaded from, if any.
    pub fn data_dir(&self) -> Option<&Path> {
        self.data_dir.as_deref()
    }

    fn index(lines: Vec<RailwayLine>, records: Vec<StationRecord>, walking: Vec<WalkingLink>) -> Self {
        let mut line_index = HashMap::new();
        let mut lines_by_station: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, line) in lines.iter().enumerate() {
            if line_index.insert(line.name().to_string(), idx).is_some() {
                warn!(line = line.name(), "Duplicate line name; later definition wins lookups");
            }
            for station in line.stations() {
                lines_by_station.entry(station.clone()).or_default().push(idx);
            }
        }

        // First record carrying a detail wins
        let mut by_name: BTreeMap<String, Station> = BTreeMap::new();
        for record in records {
            let station = by_name
                .entry(record.name.clone())
                .or_insert_with(|| Station::new(record.name.clone()));
            station.zone = station.zone.or(record.zone);
            station.coordinates = station.coordinates.or(record.coordinates);
        }

        let stations: Vec<Station> = by_name
            .into_values()
            .map(|mut station| {
                let serving = lines_by_station.get(&station.name).map_or(&[][..], Vec::as_slice);
                if serving.len() >= 2 {
                    station.interchange = serving.iter().map(|&i| lines[i].name().to_string()).collect();
                }
                station
            })
            .collect();

        let station_index = stations
            .iter()
            .enumerate()
            .map(|(idx, s)| (s.name.clone(), idx))
            .collect();

        Self {
            data_dir: None,
            lines,
            stations,
            station_index,
            line_index,
            lines_by_station,
            walking,
            loaded_at: Utc::now(),
        }
    }
}

impl RailwayData for StationLineRepository {
    fn load_stations(&self) -> &[Station] {
        &self.stations
    }

    fn load_railway_lines(&self) -> &[RailwayLine] {
        &self.lines
    }

    fn walking_links(&self) -> &[WalkingLink] {
        &self.walking
    }

    fn get_station_by_name(&self, name: &str) -> Option<&Station> {
        self.station_index.get(name).map(|&idx| &self.stations[idx])
    }

    fn get_railway_line_by_name(&self, name: &str) -> Option<&RailwayLine> {
        self.line_index.get(name).map(|&idx| &self.lines[idx])
    }

    fn get_lines_serving_station(&self, name: &str) -> Vec<String> {
        self.lines_by_station
            .get(name)
            .map(|idxs| idxs.iter().map(|&i| self.lines[i].name().to_string()).collect())
            .unwrap_or_default()
    }

    fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    fn refresh_data(&mut self) -> Result<LoadSummary, DataError> {
        let data_dir = self.data_dir.clone().ok_or(DataError::NotRefreshable)?;
        let loaded = load_directory(&data_dir)?;
        let skipped_files = loaded.skipped_files;

        let mut fresh = Self::index(loaded.lines, loaded.records, loaded.walking);
        fresh.data_dir = Some(data_dir);
        *self = fresh;

        let summary = LoadSummary {
            lines: self.lines.len(),
            stations: self.stations.len(),
            walking_links: self.walking.len(),
            skipped_files,
        };
        info!(?summary, "Refreshed network data");
        Ok(summary)
    }
}

/// Read every document in a data directory, skipping bad files.
fn load_directory(data_dir: &Path) -> Result<LoadedData, DataError> {
    if !data_dir.is_dir() {
        return Err(DataError::MissingDirectory {
            path: data_dir.display().to_string(),
        });
    }

    let mut skipped_files = 0;
    let index = match read_optional::<LineIndex>(&data_dir.join(LINE_INDEX_FILE)) {
        Ok(index) => index.unwrap_or_default(),
        Err(e) => {
            error!(error = %e, "Ignoring unreadable line index");
            skipped_files += 1;
            LineIndex::default()
        }
    };
    let index_by_file: HashMap<&str, &LineIndexEntry> =
        index.lines.iter().map(|entry| (entry.file.as_str(), entry)).collect();

    let mut lines = Vec::new();
    let mut records = Vec::new();
    for path in line_files(&data_dir.join("lines")) {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        match read_line_file(&path, &stem, index_by_file.get(file_name.as_str()).copied()) {
            Ok(parsed) => {
                debug!(line = parsed.line.name(), stations = parsed.line.stations().len(), "Loaded line");
                lines.push(parsed.line);
                records.extend(parsed.stations);
            }
            Err(e @ DataError::Invalid { .. }) => {
                warn!(error = %e, "Skipping line file");
                skipped_files += 1;
            }
            Err(e) => {
                error!(error = %e, "Skipping line file");
                skipped_files += 1;
            }
        }
    }

    let walking = match read_optional::<InterchangeDocument>(&data_dir.join(INTERCHANGE_FILE)) {
        Ok(doc) => doc.map(InterchangeDocument::walking_links).unwrap_or_default(),
        Err(e) => {
            error!(error = %e, "Ignoring unreadable interchange connections");
            skipped_files += 1;
            Vec::new()
        }
    };

    Ok(LoadedData {
        lines,
        records,
        walking,
        skipped_files,
    })
}

/// JSON files in the lines directory, sorted by name, backups excluded.
fn line_files(lines_dir: &Path) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(lines_dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(dir = %lines_dir.display(), error = %e, "Lines directory unavailable");
            return Vec::new();
        }
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .filter(|path| {
            path.file_name()
                .is_some_and(|name| !name.to_string_lossy().contains(".backup"))
        })
        .collect();
    files.sort();
    files
}

fn read_line_file(
    path: &Path,
    stem: &str,
    index: Option<&LineIndexEntry>,
) -> Result<super::files::ParsedLine, DataError> {
    let display = path.display().to_string();
    let contents = std::fs::read_to_string(path).map_err(|e| DataError::Io {
        path: display.clone(),
        message: e.to_string(),
    })?;
    let doc: LineDocument = serde_json::from_str(&contents).map_err(|e| DataError::Json {
        path: display.clone(),
        message: e.to_string(),
    })?;
    doc.into_parsed(stem, index).map_err(|e| DataError::Invalid {
        path: display,
        message: e.to_string(),
    })
}

/// Parse an optional JSON document. A missing file is `Ok(None)`.
pub(crate) fn read_optional<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>, DataError> {
    if !path.exists() {
        return Ok(None);
    }
    let display = path.display().to_string();
    let contents = std::fs::read_to_string(path).map_err(|e| DataError::Io {
        path: display.clone(),
        message: e.to_string(),
    })?;
    serde_json::from_str(&contents)
        .map(Some)
        .map_err(|e| DataError::Json {
            path: display,
            message: e.to_string(),
        })
}
