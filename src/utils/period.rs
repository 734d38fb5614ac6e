use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};

use crate::app::error::{AppError, AppResult};

/// Half-open window `[from, to)` over `processed_at`. Either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Period {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl Period {
    pub fn parse(date_from: Option<&str>, date_to: Option<&str>) -> AppResult<Self> {
        let from = date_from.map(|raw| parse_bound(raw, false)).transpose()?;
        let to = date_to.map(|raw| parse_bound(raw, true)).transpose()?;

        if let (Some(from), Some(to)) = (from, to) {
            if from >= to {
                return Err(AppError::InvalidInput(
                    "dateFrom must be before dateTo".to_string(),
                ));
            }
        }

        Ok(Self { from, to })
    }

    pub fn day_of(now: DateTime<Utc>) -> Self {
        let start = start_of_day(now.date_naive());
        Self {
            from: Some(start),
            to: Some(start + Duration::days(1)),
        }
    }

    pub fn month_of(now: DateTime<Utc>) -> Self {
        let date = now.date_naive();
        let first = NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date);
        let next = if date.month() == 12 {
            NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
        }
        .unwrap_or(first + Duration::days(31));

        Self {
            from: Some(start_of_day(first)),
            to: Some(start_of_day(next)),
        }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.from.map_or(true, |from| at >= from) && self.to.map_or(true, |to| at < to)
    }
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).unwrap_or_default())
}

// Date-only upper bounds cover the whole day.
fn parse_bound(raw: &str, inclusive_end: bool) -> AppResult<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        let at = at.with_timezone(&Utc);
        return Ok(if inclusive_end { at + Duration::nanoseconds(1) } else { at });
    }

    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppError::InvalidInput(format!("invalid date: {raw}")))?;
    let start = start_of_day(date);
    Ok(if inclusive_end { start + Duration::days(1) } else { start })
}
