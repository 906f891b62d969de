use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CongestionCategory {
    Severe,
    Moderate,
    Clear,
    Unknown,
}

// Checked in order, first hit wins. "やや混雑" contains "混雑", so it lands in
// Severe before the Moderate rule is reached.
const RULES: &[(CongestionCategory, &[&str])] = &[
    (CongestionCategory::Severe, &["遅延", "混雑"]),
    (CongestionCategory::Moderate, &["やや混雑", "注意"]),
    (CongestionCategory::Clear, &["平常", "通常"]),
];

impl CongestionCategory {
    pub fn color(self) -> &'static str {
        match self {
            CongestionCategory::Severe => "red",
            CongestionCategory::Moderate => "orange",
            CongestionCategory::Clear => "green",
            CongestionCategory::Unknown => "gray",
        }
    }
}

pub fn classify(text: Option<&str>) -> CongestionCategory {
    let Some(text) = text.filter(|t| !t.is_empty()) else {
        return CongestionCategory::Unknown;
    };

    RULES
        .iter()
        .find(|(_, markers)| markers.iter().any(|m| text.contains(m)))
        .map(|(category, _)| *category)
        .unwrap_or(CongestionCategory::Unknown)
}
