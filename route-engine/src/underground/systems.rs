//! Underground systems and their station lists.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::data::{DataError, read_optional};
use crate::termini::LONDON_TERMINALS;

/// File name of the underground systems document in the data directory.
pub const UNDERGROUND_FILE: &str = "uk_underground_stations.json";

/// One of the UK's urban rail systems routed as a black box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UndergroundSystem {
    London,
    Glasgow,
    TyneWear,
}

impl UndergroundSystem {
    /// Systems in classification order.
    pub const ALL: [UndergroundSystem; 3] = [Self::London, Self::Glasgow, Self::TyneWear];

    /// Short key: "london", "glasgow", "tyne_wear".
    pub fn key(&self) -> &'static str {
        match self {
            Self::London => "london",
            Self::Glasgow => "glasgow",
            Self::TyneWear => "tyne_wear",
        }
    }

    /// Display name, also used as the line name of macro segments.
    pub fn system_name(&self) -> &'static str {
        match self {
            Self::London => "London Underground",
            Self::Glasgow => "Glasgow Subway",
            Self::TyneWear => "Tyne and Wear Metro",
        }
    }

    /// Service id for macro segments on this system.
    pub fn service_id(&self) -> String {
        format!("{}_UNDERGROUND_SERVICE", self.key().to_ascii_uppercase())
    }

    /// Look up a system by its display name.
    pub fn from_system_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.system_name() == name)
    }
}

impl fmt::Display for UndergroundSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.system_name())
    }
}

/// Stations and terminals of one system.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SystemStations {
    pub operator: Option<String>,
    pub stations: BTreeSet<String>,
    /// Stations where the system meets national rail
    pub terminals: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SystemDocument {
    #[serde(default)]
    operator: Option<String>,
    #[serde(default)]
    stations: Vec<String>,
    #[serde(default)]
    terminals: Vec<String>,
}

/// Station lists for every underground system.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UndergroundNetworks {
    systems: BTreeMap<UndergroundSystem, SystemStations>,
}

impl UndergroundNetworks {
    /// No systems known.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a system's stations.
    pub fn with_system(mut self, system: UndergroundSystem, stations: &[&str], terminals: &[&str]) -> Self {
        self.systems.insert(
            system,
            SystemStations {
                operator: None,
                stations: stations.iter().map(|s| s.to_string()).collect(),
                terminals: terminals.iter().map(|s| s.to_string()).collect(),
            },
        );
        self
    }

    /// Load from `<data_dir>/uk_underground_stations.json`.
    ///
    /// A missing file means no underground routing; an unreadable one is
    /// reported so the caller can decide to continue without it.
    pub fn load(data_dir: &Path) -> Result<Self, DataError> {
        let path = data_dir.join(UNDERGROUND_FILE);
        let Some(doc) = read_optional::<BTreeMap<String, SystemDocument>>(&path)? else {
            warn!(path = %path.display(), "No underground systems file; black-box routing disabled");
            return Ok(Self::new());
        };

        let mut networks = Self::new();
        for (name, system_doc) in doc {
            let Some(system) = UndergroundSystem::from_system_name(&name) else {
                warn!(system = %name, "Ignoring unknown underground system");
                continue;
            };
            networks.systems.insert(
                system,
                SystemStations {
                    operator: system_doc.operator,
                    stations: system_doc.stations.into_iter().collect(),
                    terminals: system_doc.terminals,
                },
            );
        }

        info!(
            systems = networks.systems.len(),
            stations = networks.systems.values().map(|s| s.stations.len()).sum::<usize>(),
            "Loaded underground systems"
        );
        Ok(networks)
    }

    /// Stations of a system, if loaded.
    pub fn system(&self, system: UndergroundSystem) -> Option<&SystemStations> {
        self.systems.get(&system)
    }

    /// Loaded systems in classification order.
    pub fn systems(&self) -> impl Iterator<Item = (UndergroundSystem, &SystemStations)> {
        self.systems.iter().map(|(k, v)| (*k, v))
    }

    /// Terminal stations of a system.
    ///
    /// London's terminals are the national-rail termini; other systems
    /// take theirs from the data.
    pub fn terminals(&self, system: UndergroundSystem) -> Vec<String> {
        match system {
            UndergroundSystem::London => LONDON_TERMINALS.iter().map(|s| s.to_string()).collect(),
            _ => self
                .system(system)
                .map(|s| s.terminals.clone())
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn keys_and_names() {
        assert_eq!(UndergroundSystem::TyneWear.key(), "tyne_wear");
        assert_eq!(UndergroundSystem::Glasgow.system_name(), "Glasgow Subway");
        assert_eq!(UndergroundSystem::London.service_id(), "LONDON_UNDERGROUND_SERVICE");
        assert_eq!(
            UndergroundSystem::from_system_name("Tyne and Wear Metro"),
            Some(UndergroundSystem::TyneWear)
        );
        assert_eq!(UndergroundSystem::from_system_name("Paris Metro"), None);
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(UNDERGROUND_FILE),
            r#"{
                "London Underground": {"system_name": "London Underground", "operator": "TfL",
                    "stations": ["Oxford Circus", "Bank"], "terminals": ["ignored"]},
                "Glasgow Subway": {"stations": ["St Enoch", "Buchanan Street", "Hillhead"],
                    "terminals": ["St Enoch", "Buchanan Street"]},
                "Paris Metro": {"stations": ["Chatelet"]}
            }"#,
        )
        .unwrap();

        let networks = UndergroundNetworks::load(dir.path()).unwrap();
        let london = networks.system(UndergroundSystem::London).unwrap();
        assert_eq!(london.operator.as_deref(), Some("TfL"));
        assert!(london.stations.contains("Bank"));

        assert_eq!(
            networks.terminals(UndergroundSystem::Glasgow),
            vec!["St Enoch", "Buchanan Street"]
        );
        // London terminals are fixed, not read from the file
        assert_eq!(networks.terminals(UndergroundSystem::London).len(), 12);
        assert!(networks.system(UndergroundSystem::TyneWear).is_none());
        assert!(networks.terminals(UndergroundSystem::TyneWear).is_empty());
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let networks = UndergroundNetworks::load(dir.path()).unwrap();
        assert_eq!(networks.systems().count(), 0);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(UNDERGROUND_FILE), "[1, 2").unwrap();
        assert!(matches!(
            UndergroundNetworks::load(dir.path()),
            Err(DataError::Json { .. })
        ));
    }
}
