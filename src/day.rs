use chrono::{Datelike, Days, NaiveDate, Weekday};
use std::fmt::Display;

/// Label used when the menu for the current day is requested
pub const TODAY_LABEL: &str = "오늘";

/// Day selection as given in the `day` query parameter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DayToken {
    #[default]
    Today,
    Weekday(Weekday),
}

impl DayToken {
    /// Parse a query token. Missing or empty means today, anything not recognized falls back to
    /// Monday. This never fails.
    pub fn parse(token: Option<&str>) -> Self {
        match token.map(str::trim) {
            None | Some("") | Some("today") => Self::Today,
            Some("mon") => Self::Weekday(Weekday::Mon),
            Some("tue") => Self::Weekday(Weekday::Tue),
            Some("wed") => Self::Weekday(Weekday::Wed),
            Some("thu") => Self::Weekday(Weekday::Thu),
            Some("fri") => Self::Weekday(Weekday::Fri),
            Some(_) => Self::Weekday(Weekday::Mon),
        }
    }
}

impl Display for DayToken {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Today => write!(f, "today"),
            Self::Weekday(w) => write!(f, "{}", w.to_string().to_lowercase()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDay {
    /// Always Mon..Fri
    pub weekday: Weekday,
    /// Either "오늘" or the Korean weekday name
    pub label: &'static str,
    /// Calendar date the menu is for
    pub date: NaiveDate,
}

impl ResolvedDay {
    /// 1 for Monday through 5 for Friday
    pub fn weekday_index(&self) -> u32 {
        self.weekday.number_from_monday()
    }

    /// Zero based menu table column
    pub fn target_column(&self) -> usize {
        self.weekday_index().saturating_sub(1) as usize
    }

    pub fn formatted_date(&self) -> String {
        format!("{} ({})", self.date.format("%Y-%m-%d"), self.label)
    }
}

/// Korean name of the given weekday
pub fn korean_name(w: Weekday) -> &'static str {
    match w {
        Weekday::Mon => "월요일",
        Weekday::Tue => "화요일",
        Weekday::Wed => "수요일",
        Weekday::Thu => "목요일",
        Weekday::Fri => "금요일",
        Weekday::Sat => "토요일",
        Weekday::Sun => "일요일",
    }
}

/// Map a day token onto a weekday column, relative to `today`.
///
/// Weekend requests for today roll forward to Monday, but keep the "오늘" label.
pub fn resolve(token: DayToken, today: NaiveDate) -> ResolvedDay {
    match token {
        DayToken::Today => match today.weekday() {
            Weekday::Sat => rolled_to_monday(today, 2),
            Weekday::Sun => rolled_to_monday(today, 1),
            weekday => ResolvedDay {
                weekday,
                label: TODAY_LABEL,
                date: today,
            },
        },
        DayToken::Weekday(weekday) => {
            // days from sunday, matching how the week is laid out upstream
            let target = weekday.num_days_from_sunday() as i64;
            let current = today.weekday().num_days_from_sunday() as i64;
            let mut diff = target - current;
            if diff < 0 {
                diff += 7;
            }
            ResolvedDay {
                weekday,
                label: korean_name(weekday),
                date: today + Days::new(diff as u64),
            }
        }
    }
}

fn rolled_to_monday(today: NaiveDate, days: u64) -> ResolvedDay {
    ResolvedDay {
        weekday: Weekday::Mon,
        label: TODAY_LABEL,
        date: today + Days::new(days),
    }
}
