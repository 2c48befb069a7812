//! Distance and time estimates for journeys the graph doesn't model.
//!
//! Underground journeys are never searched station by station, so their
//! length comes from coarse per-system heuristics. Long national-rail
//! legs between terminals that share no line get a city-pair estimate.

use crate::data::RailwayData;

use super::systems::UndergroundSystem;

const CENTRAL_LONDON: [&str; 17] = [
    "Central",
    "City",
    "Covent Garden",
    "Oxford",
    "Piccadilly",
    "Leicester",
    "Charing Cross",
    "Westminster",
    "Victoria",
    "Liverpool Street",
    "Kings Cross",
    "Euston",
    "Paddington",
    "Waterloo",
    "London Bridge",
    "Bank",
    "Monument",
];

const INNER_LONDON: [&str; 9] = [
    "Clapham",
    "Camden",
    "Islington",
    "Hammersmith",
    "Kensington",
    "Chelsea",
    "Canary Wharf",
    "Greenwich",
    "Wimbledon",
];

const OUTER_LONDON: [&str; 6] = ["Heathrow", "Stanmore", "Epping", "Upminster", "Croydon", "Richmond"];

/// Average long-distance rail speed (km/h).
const NATIONAL_RAIL_SPEED_KMH: f64 = 110.0;

/// Rough band of London a station sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum LondonZone {
    Central,
    Inner,
    Outer,
}

impl LondonZone {
    fn of(station: &str) -> Self {
        let mentions = |names: &[&str]| names.iter().any(|n| station.contains(n));
        if mentions(&CENTRAL_LONDON) {
            LondonZone::Central
        } else if mentions(&INNER_LONDON) {
            LondonZone::Inner
        } else if mentions(&OUTER_LONDON) {
            LondonZone::Outer
        } else {
            LondonZone::Inner
        }
    }
}

/// Pure journey estimates.
#[derive(Debug, Clone, Copy, Default)]
pub struct JourneyEstimator;

impl JourneyEstimator {
    pub fn new() -> Self {
        Self
    }

    /// Estimated length of an underground journey (km).
    pub fn underground_distance(&self, from: &str, to: &str, system: UndergroundSystem) -> f64 {
        match system {
            UndergroundSystem::Glasgow => 3.0,
            UndergroundSystem::TyneWear => 8.0,
            UndergroundSystem::London => {
                use LondonZone::*;
                match (LondonZone::of(from), LondonZone::of(to)) {
                    (Central, Central) => 2.5,
                    (Central, Inner) | (Inner, Central) => 5.0,
                    (Inner, Inner) => 7.0,
                    (Outer, Outer) => 15.0,
                    _ => 12.0,
                }
            }
        }
    }

    /// Estimated duration of an underground journey (minutes).
    ///
    /// London runs at 22 km/h with 5 minutes for a change beyond 10 km,
    /// clamped to 10–40. Glasgow runs at 18 km/h clamped to 5–20. Tyne and
    /// Wear runs at 27 km/h with 3 minutes for a change beyond 8 km,
    /// clamped to 8–35.
    pub fn underground_time(&self, from: &str, to: &str, system: UndergroundSystem) -> u32 {
        let km = self.underground_distance(from, to, system);
        let (speed, change_after_km, change_mins, min, max) = match system {
            UndergroundSystem::London => (22.0, 10.0, 5.0, 10, 40),
            UndergroundSystem::Glasgow => (18.0, f64::INFINITY, 0.0, 5, 20),
            UndergroundSystem::TyneWear => (27.0, 8.0, 3.0, 8, 35),
        };

        let mut minutes = km * 60.0 / speed;
        if km > change_after_km {
            minutes += change_mins;
        }
        (minutes as u32).clamp(min, max)
    }

    /// Estimated distance between two national-rail terminals (km).
    pub fn national_rail_distance(&self, from: &str, to: &str) -> f64 {
        let (a, b) = (RailCity::of(from), RailCity::of(to));
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        match (lo, hi) {
            (RailCity::London, RailCity::Glasgow) => 650.0,
            (RailCity::London, RailCity::Newcastle) => 450.0,
            (RailCity::Glasgow, RailCity::Newcastle) => 250.0,
            _ => 400.0,
        }
    }

    /// Estimated duration between two national-rail terminals (minutes).
    pub fn national_rail_time(&self, from: &str, to: &str) -> u32 {
        (self.national_rail_distance(from, to) * 60.0 / NATIONAL_RAIL_SPEED_KMH) as u32
    }

    /// The line to name on a national-rail leg between two stations.
    ///
    /// The first line serving both wins; otherwise a main line is guessed
    /// from the cities at either end.
    pub fn line_between(&self, from: &str, to: &str, data: &dyn RailwayData) -> String {
        if let Some(line) = data.get_common_lines(from, to).into_iter().next() {
            return line;
        }

        let links = |city: &str| {
            (from.contains("London") && to.contains(city)) || (from.contains(city) && to.contains("London"))
        };
        let guess = [
            ("Glasgow", "West Coast Main Line"),
            ("Edinburgh", "East Coast Main Line"),
            ("Southampton", "South Western Main Line"),
            ("Brighton", "Brighton Main Line"),
            ("Bristol", "Great Western Main Line"),
        ]
        .into_iter()
        .find(|(city, _)| links(city))
        .map_or("National Rail", |(_, line)| line);

        guess.to_string()
    }
}

/// City a terminal belongs to, for the national-rail distance table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum RailCity {
    London,
    Glasgow,
    Newcastle,
}

impl RailCity {
    fn of(station: &str) -> Self {
        if station.contains("London") {
            RailCity::London
        } else if ["Glasgow", "Buchanan", "St Enoch"].iter().any(|n| station.contains(n)) {
            RailCity::Glasgow
        } else {
            RailCity::Newcastle
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::StationLineRepository;
    use crate::domain::RailwayLine;

    #[test]
    fn london_zone_bands() {
        let e = JourneyEstimator::new();
        let london = UndergroundSystem::London;

        assert_eq!(e.underground_distance("Bank", "Oxford Circus", london), 2.5);
        assert_eq!(e.underground_distance("Bank", "Camden Town", london), 5.0);
        assert_eq!(e.underground_distance("Camden Town", "Brixton", london), 7.0);
        assert_eq!(e.underground_distance("Bank", "Heathrow Terminal 5", london), 12.0);
        assert_eq!(e.underground_distance("Epping", "Heathrow Terminal 5", london), 15.0);
    }

    #[test]
    fn london_times_are_clamped() {
        let e = JourneyEstimator::new();
        let london = UndergroundSystem::London;

        // 2.5 km at 22 km/h is under the 10 minute floor
        assert_eq!(e.underground_time("Bank", "Monument", london), 10);
        // 15 km: 40.9 + 5 minutes, capped
        assert_eq!(e.underground_time("Epping", "Upminster", london), 40);
        // 12 km: 32.7 + 5
        assert_eq!(e.underground_time("Bank", "Stanmore", london), 37);
    }

    #[test]
    fn other_systems_are_flat() {
        let e = JourneyEstimator::new();

        assert_eq!(e.underground_distance("Hillhead", "St Enoch", UndergroundSystem::Glasgow), 3.0);
        assert_eq!(e.underground_time("Hillhead", "St Enoch", UndergroundSystem::Glasgow), 10);
        assert_eq!(e.underground_distance("Jesmond", "Airport", UndergroundSystem::TyneWear), 8.0);
        assert_eq!(e.underground_time("Jesmond", "Airport", UndergroundSystem::TyneWear), 17);

        for system in UndergroundSystem::ALL {
            let t = e.underground_time("Anywhere", "Elsewhere", system);
            assert!((5..=40).contains(&t));
        }
    }

    #[test]
    fn national_rail_city_pairs() {
        let e = JourneyEstimator::new();

        assert_eq!(e.national_rail_distance("London Euston", "Glasgow Central"), 650.0);
        assert_eq!(e.national_rail_distance("Buchanan Street", "London Euston"), 650.0);
        assert_eq!(e.national_rail_distance("London Kings Cross", "Newcastle"), 450.0);
        assert_eq!(e.national_rail_distance("Glasgow Central", "Newcastle"), 250.0);
        assert_eq!(e.national_rail_distance("London Waterloo", "London Euston"), 400.0);
        assert_eq!(e.national_rail_time("London Euston", "Glasgow Central"), 354);
    }

    #[test]
    fn line_between_prefers_common_line() {
        let e = JourneyEstimator::new();
        let wcml = RailwayLine::new("West Coast Main Line", ["London Euston", "Preston", "Glasgow Central"]).unwrap();
        let repo = StationLineRepository::from_lines(vec![wcml]);

        assert_eq!(e.line_between("London Euston", "Preston", &repo), "West Coast Main Line");
        assert_eq!(
            e.line_between("London Kings Cross", "Edinburgh Waverley", &repo),
            "East Coast Main Line"
        );
        assert_eq!(e.line_between("Bristol Temple Meads", "London Paddington", &repo), "Great Western Main Line");
        assert_eq!(e.line_between("Leeds", "York", &repo), "National Rail");
    }
}
