use crate::congestion::{CongestionCategory, classify};
use crate::interpolate::{LatLng, interpolate};
use crate::odpt_types::{Station, TrainInformation};
use crate::state::Snapshot;
use chrono::{DateTime, Utc};
use compact_str::CompactString;
use serde::Serialize;
use std::collections::HashMap;

pub const DEFAULT_CENTER: LatLng = LatLng::new(35.6812, 139.7671);
pub const DEFAULT_ZOOM: f64 = 11.0;
pub const TRAIN_RADIUS: f64 = 8.0;
pub const STATION_COLOR: &str = "blue";

/// Station marker radius: grows linearly above zoom 9, never below 1.
pub fn station_radius(zoom: f64) -> f64 {
    ((zoom - 9.0) * 0.8).max(1.0)
}

#[derive(Debug, Clone, Serialize)]
pub struct Viewport {
    pub center: LatLng,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StationPoint {
    pub id: Option<CompactString>,
    pub position: LatLng,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrainPoint {
    pub id: Option<CompactString>,
    pub position: LatLng,
    pub railway: Option<CompactString>,
    pub train_number: Option<CompactString>,
    pub origin_name: Option<String>,
    pub delay: Option<i64>,
    pub category: CongestionCategory,
    pub color: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderFrame {
    pub generated_at: DateTime<Utc>,
    pub progress: f64,
    pub zoom: f64,
    pub station_radius: f64,
    pub station_color: &'static str,
    pub train_radius: f64,
    pub stations: Vec<StationPoint>,
    pub trains: Vec<TrainPoint>,
}

/// One row of the plain train list; raw identifiers, no joins.
#[derive(Debug, Clone, Serialize)]
pub struct TrainSummary {
    pub id: Option<CompactString>,
    pub railway: Option<CompactString>,
    pub train_number: Option<CompactString>,
    pub from_station: Option<CompactString>,
}

fn position(station: &Station) -> Option<LatLng> {
    Some(LatLng::new(station.lat?, station.long?))
}

pub fn build_frame(snapshot: &Snapshot, zoom: f64, lang: &str) -> RenderFrame {
    // First record wins on duplicate identifiers.
    let mut by_id: HashMap<&str, (&Station, LatLng)> = HashMap::new();
    for station in snapshot.stations.iter() {
        if let (Some(id), Some(pos)) = (station.same_as.as_deref(), position(station)) {
            by_id.entry(id).or_insert((station, pos));
        }
    }

    let mut status_by_railway: HashMap<&str, &TrainInformation> = HashMap::new();
    for info in snapshot.congestion.iter() {
        if let Some(railway) = info.railway.as_deref() {
            status_by_railway.entry(railway).or_insert(info);
        }
    }

    let stations = snapshot
        .stations
        .iter()
        .filter_map(|s| {
            Some(StationPoint {
                id: s.same_as.clone(),
                position: position(s)?,
                name: s.name(lang).map(str::to_string),
            })
        })
        .collect();

    let t = snapshot.progress.value();
    let trains = snapshot
        .trains
        .iter()
        .filter_map(|train| {
            let (origin, from) = by_id.get(train.from_station.as_deref()?).copied()?;

            let position = match train.to_station.as_deref().and_then(|id| by_id.get(id)) {
                Some(&(_, to)) => interpolate(from, to, t),
                None => from,
            };

            let status = train
                .railway
                .as_deref()
                .and_then(|r| status_by_railway.get(r))
                .and_then(|info| info.status_text(lang));
            let category = classify(status);

            Some(TrainPoint {
                id: train.id.clone(),
                position,
                railway: train.railway.clone(),
                train_number: train.train_number.clone(),
                origin_name: origin.name(lang).map(str::to_string),
                delay: train.delay,
                category,
                color: category.color(),
            })
        })
        .collect();

    RenderFrame {
        generated_at: snapshot.taken_at,
        progress: t,
        zoom,
        station_radius: station_radius(zoom),
        station_color: STATION_COLOR,
        train_radius: TRAIN_RADIUS,
        stations,
        trains,
    }
}

pub fn train_list(snapshot: &Snapshot) -> Vec<TrainSummary> {
    snapshot
        .trains
        .iter()
        .map(|t| TrainSummary {
            id: t.id.clone(),
            railway: t.railway.clone(),
            train_number: t.train_number.clone(),
            from_station: t.from_station.clone(),
        })
        .collect()
}
