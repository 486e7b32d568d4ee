use chrono::{Duration, NaiveDateTime};

pub const DATE_FMT: &str = "%Y-%m-%dT%H:%M:%S%.f";

pub const DISPLAY_DATE_FMT: &str = "%Y-%m-%d";

// whole calendar days `now` is past `due_at`, zero when not yet due
pub fn days_late(due_at: NaiveDateTime, now: NaiveDateTime) -> i64 {
    let days = (now.date() - due_at.date()).num_days();
    days.max(0)
}

pub fn add_days(date: NaiveDateTime, days: i64) -> NaiveDateTime {
    date + Duration::days(days)
}

pub mod serializer {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};
    use serde::de::Error;
    use crate::utils::date::DATE_FMT;

    pub fn serialize<S: Serializer>(time: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(time.format(DATE_FMT).to_string().as_str())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let str_time: String = Deserialize::deserialize(deserializer)?;
        let time = NaiveDateTime::parse_from_str(&str_time, DATE_FMT).map_err(D::Error::custom)?;
        Ok(time)
    }
}
