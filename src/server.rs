use crate::render::{DEFAULT_ZOOM, Viewport, build_frame, train_list};
use crate::state::LiveState;
use compact_str::CompactString;
use serde::Deserialize;
use warp::{Filter, Rejection, Reply};

#[derive(Debug, Deserialize)]
struct FrameQuery {
    zoom: Option<f64>,
}

/// Read-only HTTP surface over the live slots. Every route answers from a
/// fresh snapshot; nothing here writes.
pub fn routes(
    live: LiveState,
    language: CompactString,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let state = warp::any().map(move || live.clone());
    let lang = warp::any().map(move || language.clone());

    // GET /frame?zoom=
    let frame = warp::path("frame")
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<FrameQuery>())
        .and(state.clone())
        .and(lang)
        .map(|q: FrameQuery, live: LiveState, lang: CompactString| {
            let zoom = q.zoom.unwrap_or(DEFAULT_ZOOM);
            warp::reply::json(&build_frame(&live.snapshot(), zoom, &lang))
        });

    // GET /stations
    let stations = warp::path("stations")
        .and(warp::path::end())
        .and(warp::get())
        .and(state.clone())
        .map(|live: LiveState| warp::reply::json(&*live.stations()));

    // GET /trains
    let trains = warp::path("trains")
        .and(warp::path::end())
        .and(warp::get())
        .and(state.clone())
        .map(|live: LiveState| warp::reply::json(&*live.trains()));

    // GET /railways
    let railways = warp::path("railways")
        .and(warp::path::end())
        .and(warp::get())
        .and(state.clone())
        .map(|live: LiveState| warp::reply::json(&*live.railway_shapes()));

    // GET /train-list
    let list = warp::path("train-list")
        .and(warp::path::end())
        .and(warp::get())
        .and(state)
        .map(|live: LiveState| warp::reply::json(&train_list(&live.snapshot())));

    // GET /viewport
    let viewport = warp::path("viewport")
        .and(warp::path::end())
        .and(warp::get())
        .map(|| warp::reply::json(&Viewport::default()));

    let healthz = warp::path("healthz")
        .and(warp::path::end())
        .and(warp::get())
        .map(|| "ok");

    frame
        .or(stations)
        .or(trains)
        .or(railways)
        .or(list)
        .or(viewport)
        .or(healthz)
        .with(warp::cors().allow_any_origin().allow_method("GET"))
        .with(warp::trace::request())
}
