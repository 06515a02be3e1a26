use crate::model::Place;

/// What the most recent search was anchored to. Exactly one variant is
/// authoritative at a time: retry and unit-change refetch replay from
/// here without re-asking the user.
#[derive(Debug, Clone, PartialEq)]
pub enum Provenance {
    Query(String),
    Coordinates { lat: f64, lon: f64, label: String },
}

/// Most recent resolved search target. Written only by the search
/// orchestrator, and always replaced whole — a query search and a
/// coordinate search can never leave mixed state behind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchSession {
    provenance: Option<Provenance>,
}

impl SearchSession {
    pub fn begin_query(&mut self, query: impl Into<String>) {
        self.provenance = Some(Provenance::Query(query.into()));
    }

    pub fn begin_coordinates(&mut self, lat: f64, lon: f64, label: impl Into<String>) {
        self.provenance = Some(Provenance::Coordinates {
            lat,
            lon,
            label: label.into(),
        });
    }

    /// Upgrade a query-anchored session once geocoding resolved it. A
    /// later failure (or unit change) then replays by coordinates
    /// instead of paying for another geocode round-trip.
    pub fn resolve_to(&mut self, place: &Place) {
        self.begin_coordinates(place.latitude, place.longitude, place.label());
    }

    pub fn provenance(&self) -> Option<&Provenance> {
        self.provenance.as_ref()
    }

    pub fn coordinates(&self) -> Option<(f64, f64, &str)> {
        match &self.provenance {
            Some(Provenance::Coordinates { lat, lon, label }) => {
                Some((*lat, *lon, label.as_str()))
            }
            _ => None,
        }
    }

    pub fn place_label(&self) -> Option<&str> {
        match &self.provenance {
            Some(Provenance::Coordinates { label, .. }) => Some(label.as_str()),
            _ => None,
        }
    }
}
