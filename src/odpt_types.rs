use compact_str::CompactString;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Reads a field that may have drifted upstream: a value of the wrong type
/// decodes as `None` instead of failing the whole record.
fn lenient<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(de)?;
    Ok(serde_json::from_value(value).ok())
}

/// Text keyed by language code (`"ja"`, `"en"`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct LocalizedText(pub HashMap<CompactString, Option<String>>);

impl<'de> Deserialize<'de> for LocalizedText {
    fn deserialize<D: Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
        let raw = HashMap::<CompactString, serde_json::Value>::deserialize(de)?;
        Ok(Self(
            raw.into_iter()
                .map(|(lang, v)| match v {
                    serde_json::Value::String(s) => (lang, Some(s)),
                    _ => (lang, None),
                })
                .collect(),
        ))
    }
}

impl LocalizedText {
    /// Empty strings count as absent.
    pub fn get(&self, lang: &str) -> Option<&str> {
        self.0
            .get(lang)
            .and_then(|s| s.as_deref())
            .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Station {
    #[serde(rename = "@id", default, deserialize_with = "lenient")]
    pub id: Option<CompactString>,
    #[serde(rename = "owl:sameAs", default, deserialize_with = "lenient")]
    pub same_as: Option<CompactString>,
    #[serde(rename = "geo:lat", default, deserialize_with = "lenient")]
    pub lat: Option<f64>,
    #[serde(rename = "geo:long", default, deserialize_with = "lenient")]
    pub long: Option<f64>,
    #[serde(rename = "odpt:stationTitle", default, deserialize_with = "lenient")]
    pub title: Option<LocalizedText>,
    #[serde(rename = "odpt:railway", default, deserialize_with = "lenient")]
    pub railway: Option<CompactString>,
    #[serde(rename = "odpt:stationCode", default, deserialize_with = "lenient")]
    pub station_code: Option<CompactString>,
}

impl Station {
    /// Both coordinates present and non-zero. Zero is what the API sends for
    /// stations it has no survey point for.
    pub fn is_renderable(&self) -> bool {
        matches!((self.lat, self.long), (Some(lat), Some(long)) if lat != 0.0 && long != 0.0)
    }

    pub fn name(&self, lang: &str) -> Option<&str> {
        self.title.as_ref().and_then(|t| t.get(lang))
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Train {
    #[serde(rename = "@id", default, deserialize_with = "lenient")]
    pub id: Option<CompactString>,
    #[serde(rename = "owl:sameAs", default, deserialize_with = "lenient")]
    pub same_as: Option<CompactString>,
    #[serde(rename = "odpt:railway", default, deserialize_with = "lenient")]
    pub railway: Option<CompactString>,
    #[serde(rename = "odpt:fromStation", default, deserialize_with = "lenient")]
    pub from_station: Option<CompactString>,
    #[serde(rename = "odpt:toStation", default, deserialize_with = "lenient")]
    pub to_station: Option<CompactString>,
    #[serde(rename = "odpt:trainNumber", default, deserialize_with = "lenient")]
    pub train_number: Option<CompactString>,
    #[serde(rename = "odpt:railDirection", default, deserialize_with = "lenient")]
    pub rail_direction: Option<CompactString>,
    // Seconds.
    #[serde(rename = "odpt:delay", default, deserialize_with = "lenient")]
    pub delay: Option<i64>,
    #[serde(rename = "dc:date", default, deserialize_with = "lenient")]
    pub date: Option<String>,
}

/// Line-level operating status. The free text is what congestion is
/// classified from.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TrainInformation {
    #[serde(rename = "@id", default, deserialize_with = "lenient")]
    pub id: Option<CompactString>,
    #[serde(rename = "odpt:operator", default, deserialize_with = "lenient")]
    pub operator: Option<CompactString>,
    #[serde(rename = "odpt:railway", default, deserialize_with = "lenient")]
    pub railway: Option<CompactString>,
    #[serde(rename = "odpt:trainInformationText", default, deserialize_with = "lenient")]
    pub text: Option<LocalizedText>,
    #[serde(rename = "dc:date", default, deserialize_with = "lenient")]
    pub date: Option<String>,
}

impl TrainInformation {
    pub fn status_text(&self, lang: &str) -> Option<&str> {
        self.text.as_ref().and_then(|t| t.get(lang))
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RailwayShape {
    #[serde(rename = "@id", default, deserialize_with = "lenient")]
    pub id: Option<CompactString>,
    #[serde(rename = "owl:sameAs", default, deserialize_with = "lenient")]
    pub same_as: Option<CompactString>,
    #[serde(rename = "odpt:railway", default, deserialize_with = "lenient")]
    pub railway: Option<CompactString>,
    #[serde(rename = "dc:title", default, deserialize_with = "lenient")]
    pub title: Option<String>,
    // GeoJSON, passed through untouched.
    #[serde(rename = "ug:region", default)]
    pub region: Option<serde_json::Value>,
}
