use crate::odpt_types::{RailwayShape, Station, Train, TrainInformation};
use compact_str::CompactString;
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info};

pub const DEFAULT_BASE_URL: &str = "https://api.odpt.org/api/v4";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataKind {
    Train,
    Station,
    TrainInformation,
    RailwayShape,
}

impl DataKind {
    fn path(self) -> &'static str {
        match self {
            DataKind::Train => "odpt:Train",
            DataKind::Station => "odpt:Station",
            DataKind::TrainInformation => "odpt:TrainInformation",
            DataKind::RailwayShape => "odpt:RailwayShape",
        }
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataKind::Train => "Train",
            DataKind::Station => "Station",
            DataKind::TrainInformation => "TrainInformation",
            DataKind::RailwayShape => "RailwayShape",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{kind} API request failed: {source}")]
    Transport {
        kind: DataKind,
        #[source]
        source: reqwest::Error,
    },

    #[error("{kind} API failed: {status}")]
    Status {
        kind: DataKind,
        status: reqwest::StatusCode,
    },

    #[error("{kind} API returned an unexpected body: {source}")]
    Decode {
        kind: DataKind,
        #[source]
        source: serde_json::Error,
    },
}

/// Client for the ODPT open-data API. One instance is shared by every
/// polling task.
#[derive(Debug, Clone)]
pub struct OdptClient {
    http: reqwest::Client,
    base_url: String,
    consumer_key: String,
    language: CompactString,
}

impl OdptClient {
    pub fn new(
        base_url: impl Into<String>,
        consumer_key: impl Into<String>,
        language: impl Into<CompactString>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            consumer_key: consumer_key.into(),
            language: language.into(),
        })
    }

    fn url(&self, kind: DataKind) -> String {
        // The key is appended verbatim; an empty key still goes out and the
        // API answers with its own auth error.
        format!(
            "{}/{}?acl:consumerKey={}",
            self.base_url,
            kind.path(),
            self.consumer_key
        )
    }

    pub async fn fetch_trains(&self) -> Result<Vec<Train>, FetchError> {
        self.get_records(DataKind::Train).await
    }

    pub async fn fetch_stations(&self) -> Result<Vec<Station>, FetchError> {
        self.get_records(DataKind::Station).await
    }

    pub async fn fetch_railway_shapes(&self) -> Result<Vec<RailwayShape>, FetchError> {
        self.get_records(DataKind::RailwayShape).await
    }

    /// Line status used for congestion colouring. Never fails: it is
    /// decoration, so any error is logged and yields an empty list. Records
    /// without status text in the configured language are dropped.
    pub async fn fetch_train_information(&self) -> Vec<TrainInformation> {
        let records: Vec<TrainInformation> =
            match self.get_records(DataKind::TrainInformation).await {
                Ok(records) => records,
                Err(e) => {
                    error!(error = %e, "congestion fetch failed");
                    return Vec::new();
                }
            };

        let fetched = records.len();
        let kept: Vec<TrainInformation> = records
            .into_iter()
            .filter(|r| r.status_text(&self.language).is_some())
            .collect();

        info!(fetched, kept = kept.len(), "fetched congestion records");
        kept
    }

    async fn get_records<T: DeserializeOwned>(&self, kind: DataKind) -> Result<Vec<T>, FetchError> {
        let res = self
            .http
            .get(self.url(kind))
            .send()
            .await
            .map_err(|source| FetchError::Transport { kind, source })?;

        let status = res.status();
        if !status.is_success() {
            return Err(FetchError::Status { kind, status });
        }

        let body = res
            .bytes()
            .await
            .map_err(|source| FetchError::Transport { kind, source })?;

        decode_records(kind, &body)
    }
}

/// Decodes a JSON array element by element. Elements that cannot be read as
/// `T` at all are skipped; a body that is not an array is an error.
fn decode_records<T: DeserializeOwned>(kind: DataKind, body: &[u8]) -> Result<Vec<T>, FetchError> {
    let raw: Vec<serde_json::Value> =
        serde_json::from_slice(body).map_err(|source| FetchError::Decode { kind, source })?;

    let total = raw.len();
    let records: Vec<T> = raw
        .into_iter()
        .filter_map(|v| serde_json::from_value(v).ok())
        .collect();

    if records.len() < total {
        debug!(%kind, skipped = total - records.len(), "skipped undecodable records");
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockOdpt, unreachable_base_url};
    use serde_json::json;

    fn client(base_url: &str) -> OdptClient {
        OdptClient::new(base_url, "test-key", "ja", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_url_carries_consumer_key() {
        let c = OdptClient::new("https://api.odpt.org/api/v4/", "abc", "ja", Duration::from_secs(1))
            .unwrap();
        assert_eq!(
            c.url(DataKind::Station),
            "https://api.odpt.org/api/v4/odpt:Station?acl:consumerKey=abc"
        );
    }

    #[test]
    fn test_decode_skips_malformed_elements() {
        let body = br#"[{"odpt:trainNumber": "A1"}, 42, {"odpt:trainNumber": "B2"}]"#;
        let trains: Vec<Train> = decode_records(DataKind::Train, body).unwrap();
        assert_eq!(trains.len(), 2);
        assert_eq!(trains[1].train_number.as_deref(), Some("B2"));
    }

    #[test]
    fn test_decode_drops_only_mistyped_fields() {
        let body = br#"[
            {"@id": "T1", "odpt:fromStation": "S1", "odpt:delay": 30.5},
            {"@id": "T2", "odpt:fromStation": "S1", "odpt:delay": "60"},
            {"@id": "T3", "odpt:fromStation": "S1", "odpt:delay": null}
        ]"#;
        let trains: Vec<Train> = decode_records(DataKind::Train, body).unwrap();
        let ids: Vec<_> = trains.iter().map(|t| t.id.as_deref()).collect();
        assert_eq!(ids, vec![Some("T1"), Some("T2"), Some("T3")]);
        assert!(trains.iter().all(|t| t.delay.is_none()));
        assert!(trains.iter().all(|t| t.from_station.as_deref() == Some("S1")));

        let body = br#"[
            {"owl:sameAs": "S1", "geo:lat": 35.0, "geo:long": 139.0, "odpt:stationCode": 5},
            {"owl:sameAs": "S2", "geo:lat": "35.1", "geo:long": 139.1,
             "odpt:stationTitle": {"ja": "B", "ko": 1}},
            {"owl:sameAs": "S3", "odpt:stationTitle": "C"}
        ]"#;
        let stations: Vec<Station> = decode_records(DataKind::Station, body).unwrap();
        assert_eq!(stations.len(), 3);
        assert!(stations[0].station_code.is_none());
        assert!(stations[0].is_renderable());
        assert!(stations[1].lat.is_none());
        assert_eq!(stations[1].name("ja"), Some("B"));
        assert_eq!(stations[1].name("ko"), None);
        assert!(stations[2].title.is_none());
    }

    #[test]
    fn test_decode_rejects_non_array() {
        let err = decode_records::<Train>(DataKind::Train, br#"{"title": "Unauthorized"}"#)
            .unwrap_err();
        assert!(matches!(err, FetchError::Decode { kind: DataKind::Train, .. }));
    }

    #[tokio::test]
    async fn test_fetch_stations_parses_records() {
        let mock = MockOdpt::new()
            .respond(
                "odpt:Station",
                200,
                json!([
                    { "owl:sameAs": "S1", "geo:lat": 35.0, "geo:long": 139.0,
                      "odpt:stationTitle": { "ja": "東京", "en": "Tokyo" } },
                    { "owl:sameAs": "S2" }
                ]),
            )
            .spawn();

        let stations = client(&mock.base_url).fetch_stations().await.unwrap();
        assert_eq!(stations.len(), 2);
        assert_eq!(stations[0].name("en"), Some("Tokyo"));
        assert!(stations[1].lat.is_none());
        assert_eq!(mock.last_query().as_deref(), Some("acl:consumerKey=test-key"));
    }

    #[tokio::test]
    async fn test_station_status_error_carries_code() {
        let mock = MockOdpt::new()
            .respond("odpt:Station", 503, json!({ "error": "maintenance" }))
            .spawn();

        let err = client(&mock.base_url).fetch_stations().await.unwrap_err();
        assert!(matches!(err, FetchError::Status { kind: DataKind::Station, .. }));
        assert!(err.to_string().contains("503"), "message: {err}");
    }

    #[tokio::test]
    async fn test_train_status_error_carries_code() {
        let mock = MockOdpt::new()
            .respond("odpt:Train", 403, json!({ "title": "Forbidden" }))
            .spawn();

        let err = client(&mock.base_url).fetch_trains().await.unwrap_err();
        assert_eq!(err.to_string(), "Train API failed: 403 Forbidden");
    }

    #[tokio::test]
    async fn test_shapes_transport_error_propagates() {
        let err = client(&unreachable_base_url())
            .fetch_railway_shapes()
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Transport { kind: DataKind::RailwayShape, .. }));
    }

    #[tokio::test]
    async fn test_congestion_status_error_yields_empty() {
        let mock = MockOdpt::new()
            .respond("odpt:TrainInformation", 500, json!({}))
            .spawn();

        let info = client(&mock.base_url).fetch_train_information().await;
        assert!(info.is_empty());
    }

    #[tokio::test]
    async fn test_congestion_transport_error_yields_empty() {
        let info = client(&unreachable_base_url())
            .fetch_train_information()
            .await;
        assert!(info.is_empty());
    }

    #[tokio::test]
    async fn test_congestion_keeps_only_records_with_text() {
        let mock = MockOdpt::new()
            .respond(
                "odpt:TrainInformation",
                200,
                json!([
                    { "odpt:railway": "R1", "odpt:trainInformationText": { "ja": "平常どおり運転しています。" } },
                    { "odpt:railway": "R2", "odpt:trainInformationText": { "en": "Delayed" } },
                    { "odpt:railway": "R3", "odpt:trainInformationText": { "ja": "" } },
                    { "odpt:railway": "R4" }
                ]),
            )
            .spawn();

        let info = client(&mock.base_url).fetch_train_information().await;
        assert_eq!(info.len(), 1);
        assert_eq!(info[0].railway.as_deref(), Some("R1"));
    }
}
