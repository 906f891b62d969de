use crate::fetcher::OdptClient;
use crate::odpt_types::Station;
use crate::progress::AnimationProgress;
use crate::state::{Records, Slots};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub train_refresh: Duration,
    pub tick: Duration,
    /// `None` fetches congestion once at start.
    pub congestion_refresh: Option<Duration>,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            train_refresh: Duration::from_millis(5000),
            tick: Duration::from_millis(100),
            congestion_refresh: None,
        }
    }
}

/// Owns every polling task. Tasks live exactly as long as the monitor:
/// dropping it aborts them, `shutdown` aborts and waits.
pub struct Monitor {
    tasks: JoinSet<()>,
}

impl Monitor {
    pub fn start(client: Arc<OdptClient>, slots: Slots, schedule: Schedule) -> Self {
        let Slots {
            stations,
            trains,
            congestion,
            railway_shapes,
            progress,
        } = slots;

        let mut tasks = JoinSet::new();

        let c = client.clone();
        tasks.spawn(async move {
            match c.fetch_stations().await {
                Ok(all) => {
                    let total = all.len();
                    let renderable = renderable_stations(all);
                    info!(total, renderable = renderable.len(), "loaded stations");
                    if stations.send(Arc::new(renderable)).is_err() {
                        debug!("no readers left for stations");
                    }
                }
                Err(e) => warn!(error = %e, "station fetch failed"),
            }
        });

        let c = client.clone();
        tasks.spawn(async move {
            match c.fetch_railway_shapes().await {
                Ok(shapes) => {
                    info!(count = shapes.len(), "loaded railway shapes");
                    if railway_shapes.send(Arc::new(shapes)).is_err() {
                        debug!("no readers left for railway shapes");
                    }
                }
                Err(e) => warn!(error = %e, "railway shape fetch failed"),
            }
        });

        let c = client.clone();
        match schedule.congestion_refresh {
            None => {
                tasks.spawn(async move {
                    let info = c.fetch_train_information().await;
                    if congestion.send(Arc::new(info)).is_err() {
                        debug!("no readers left for congestion");
                    }
                });
            }
            Some(every) => {
                tasks.spawn(poll(every, congestion, move || {
                    let c = c.clone();
                    async move { Some(c.fetch_train_information().await) }
                }));
            }
        }

        let c = client;
        tasks.spawn(poll(schedule.train_refresh, trains, move || {
            let c = c.clone();
            async move {
                match c.fetch_trains().await {
                    Ok(trains) => {
                        debug!(count = trains.len(), "refreshed train positions");
                        Some(trains)
                    }
                    Err(e) => {
                        warn!(error = %e, "train fetch failed");
                        None
                    }
                }
            }
        }));

        tasks.spawn(run_clock(schedule.tick, progress));

        info!(
            train_refresh = ?schedule.train_refresh,
            tick = ?schedule.tick,
            congestion_refresh = ?schedule.congestion_refresh,
            "monitor started"
        );

        Self { tasks }
    }

    pub async fn shutdown(mut self) {
        self.tasks.shutdown().await;
        info!("monitor stopped");
    }
}

/// Runs `fetch` now and then every `every`, publishing each `Some` result.
/// A `None` keeps the previous value until the next tick. Exits once nobody
/// is reading the slot.
async fn poll<T, F, Fut>(every: Duration, slot: watch::Sender<Records<T>>, mut fetch: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<Vec<T>>>,
{
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        if slot.is_closed() {
            break;
        }
        if let Some(records) = fetch().await {
            if slot.send(Arc::new(records)).is_err() {
                break;
            }
        }
    }
}

async fn run_clock(tick: Duration, slot: watch::Sender<AnimationProgress>) {
    let mut ticker = interval(tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; the clock starts at zero.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        let next = slot.borrow().advance();
        if slot.send(next).is_err() {
            break;
        }
    }
}

pub fn renderable_stations(stations: Vec<Station>) -> Vec<Station> {
    stations.into_iter().filter(Station::is_renderable).collect()
}
