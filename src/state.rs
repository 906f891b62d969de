use crate::odpt_types::{RailwayShape, Station, Train, TrainInformation};
use crate::progress::AnimationProgress;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::watch;

pub type Records<T> = Arc<Vec<T>>;

/// Write ends of the live slots. Each sender has exactly one owner: the
/// task that polls that slot's source. Split it with a destructuring
/// pattern when handing senders to tasks.
pub struct Slots {
    pub stations: watch::Sender<Records<Station>>,
    pub trains: watch::Sender<Records<Train>>,
    pub congestion: watch::Sender<Records<TrainInformation>>,
    pub railway_shapes: watch::Sender<Records<RailwayShape>>,
    pub progress: watch::Sender<AnimationProgress>,
}

/// Read ends of the live slots. Cheap to clone; never writes.
#[derive(Clone)]
pub struct LiveState {
    pub(crate) stations: watch::Receiver<Records<Station>>,
    pub(crate) trains: watch::Receiver<Records<Train>>,
    pub(crate) congestion: watch::Receiver<Records<TrainInformation>>,
    pub(crate) railway_shapes: watch::Receiver<Records<RailwayShape>>,
    pub(crate) progress: watch::Receiver<AnimationProgress>,
}

/// Everything one render pass reads, captured at one instant. The slots
/// are independent, so the train list may be newer than the stations it is
/// joined against.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub stations: Records<Station>,
    pub trains: Records<Train>,
    pub congestion: Records<TrainInformation>,
    pub progress: AnimationProgress,
    pub taken_at: DateTime<Utc>,
}

pub fn channel() -> (Slots, LiveState) {
    let (stations_tx, stations_rx) = watch::channel(Records::default());
    let (trains_tx, trains_rx) = watch::channel(Records::default());
    let (congestion_tx, congestion_rx) = watch::channel(Records::default());
    let (shapes_tx, shapes_rx) = watch::channel(Records::default());
    let (progress_tx, progress_rx) = watch::channel(AnimationProgress::ZERO);

    (
        Slots {
            stations: stations_tx,
            trains: trains_tx,
            congestion: congestion_tx,
            railway_shapes: shapes_tx,
            progress: progress_tx,
        },
        LiveState {
            stations: stations_rx,
            trains: trains_rx,
            congestion: congestion_rx,
            railway_shapes: shapes_rx,
            progress: progress_rx,
        },
    )
}

impl LiveState {
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            stations: self.stations(),
            trains: self.trains(),
            congestion: self.congestion.borrow().clone(),
            progress: *self.progress.borrow(),
            taken_at: Utc::now(),
        }
    }

    pub fn stations(&self) -> Records<Station> {
        self.stations.borrow().clone()
    }

    pub fn trains(&self) -> Records<Train> {
        self.trains.borrow().clone()
    }

    pub fn railway_shapes(&self) -> Records<RailwayShape> {
        self.railway_shapes.borrow().clone()
    }
}
