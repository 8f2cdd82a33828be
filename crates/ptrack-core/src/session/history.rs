use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Record of one exercise finished (every set done).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub name: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl HistoryEntry {
    pub fn now(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    pub fn completed_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.timestamp).unwrap_or_default()
    }
}

/// Entries completed on one calendar day, newest first.
///
/// Each entry keeps its position in the full history so it can be deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryDay<'a> {
    pub date: NaiveDate,
    pub entries: Vec<(usize, &'a HistoryEntry)>,
}

/// Group a newest-first history by local calendar day.
pub fn group_by_day(history: &[HistoryEntry]) -> Vec<HistoryDay<'_>> {
    group_by_day_in(history, &Local)
}

pub fn group_by_day_in<'a, Tz: TimeZone>(history: &'a [HistoryEntry], tz: &Tz) -> Vec<HistoryDay<'a>> {
    let mut days: Vec<HistoryDay<'a>> = Vec::new();
    for (index, entry) in history.iter().enumerate() {
        let date = entry.completed_at().with_timezone(tz).date_naive();
        match days.iter_mut().find(|day| day.date == date) {
            Some(day) => day.entries.push((index, entry)),
            None => days.push(HistoryDay {
                date,
                entries: vec![(index, entry)],
            }),
        }
    }
    days
}
