use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};

/// Timestamp shapes found in stored documents: RFC 3339 strings, epoch
/// milliseconds and `{seconds, nanoseconds}` objects.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Text(String),
    Millis(i64),
    FractionalMillis(f64),
    Seconds {
        seconds: i64,
        #[serde(default, alias = "nanoseconds")]
        nanos: u32,
    },
}

impl RawTimestamp {
    fn normalize(self) -> Result<DateTime<Utc>, String> {
        match self {
            RawTimestamp::Text(text) => DateTime::parse_from_rfc3339(&text)
                .map(|x| x.with_timezone(&Utc))
                .map_err(|e| format!("invalid timestamp {text:?}: {e}")),
            RawTimestamp::Millis(millis) => Utc.timestamp_millis_opt(millis).single()
                .ok_or_else(|| format!("timestamp out of range: {millis}")),
            RawTimestamp::FractionalMillis(millis) => Utc.timestamp_millis_opt(millis as i64).single()
                .ok_or_else(|| format!("timestamp out of range: {millis}")),
            RawTimestamp::Seconds { seconds, nanos } => Utc.timestamp_opt(seconds, nanos).single()
                .ok_or_else(|| format!("timestamp out of range: {seconds}s")),
        }
    }
}

pub fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    RawTimestamp::deserialize(deserializer)?
        .normalize()
        .map_err(serde::de::Error::custom)
}
