use chrono::NaiveTime;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Start time of a bookable interval, `HH:MM` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Slot(pub NaiveTime);

impl Slot {
    /// Parse `HH:MM`.
    pub fn parse(value: &str) -> Option<Self> {
        NaiveTime::parse_from_str(value.trim(), "%H:%M").ok().map(Slot)
    }

    pub fn time(&self) -> NaiveTime {
        self.0
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

impl Serialize for Slot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Slot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Slot::parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid slot: {:?}", raw)))
    }
}

/// `GET /agendamentos/disponibilidade` response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AvailabilityResponse {
    Wrapped {
        #[serde(rename = "horarios")]
        slots: Vec<Slot>,
    },
    Bare(Vec<Slot>),
}

impl AvailabilityResponse {
    pub fn into_slots(self) -> Vec<Slot> {
        match self {
            AvailabilityResponse::Wrapped { slots } => slots,
            AvailabilityResponse::Bare(slots) => slots,
        }
    }
}
