use crate::day::{ResolvedDay, TODAY_LABEL};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

pub const NO_LUNCH: &str = "해당 요일 중식 정보가 없습니다.";
pub const NO_DINNER: &str = "해당 요일 석식 정보가 없습니다.";
pub const UNAVAILABLE: &str = "학식 정보를 가져올 수 없습니다. 잠시 후 다시 시도해주세요.";
pub const SERVER_ERROR_PREFIX: &str = "서버 내부 오류로 학식 정보를 가져올 수 없습니다";

/// Which of the two daily meals a table row holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Meal {
    Lunch,
    Dinner,
}

impl Meal {
    /// Row index in the menu table body
    pub fn row(self) -> usize {
        match self {
            Self::Lunch => 1,
            Self::Dinner => 2,
        }
    }

    /// What to show when a day has no menu for this meal
    pub fn sentinel(self) -> &'static str {
        match self {
            Self::Lunch => NO_LUNCH,
            Self::Dinner => NO_DINNER,
        }
    }
}

impl Display for Meal {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Lunch => write!(f, "lunch"),
            Self::Dinner => write!(f, "dinner"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct MealResult {
    /// Date header from the menu table, or the requested day label
    pub date: String,
    /// Newline separated menu items
    pub lunch: String,
    /// Newline separated menu items
    pub dinner: String,
}

impl MealResult {
    /// A result where both meals carry the same message
    pub fn placeholder(date: &str, message: &str) -> Self {
        Self {
            date: date.into(),
            lunch: message.into(),
            dinner: message.into(),
        }
    }
}

/// Outcome of a menu lookup. Both variants serialize to the same shape, so clients can tell them
/// apart by the presence of `error`.
#[derive(Debug, Clone, PartialEq)]
pub enum Menu {
    Served(MealResult),
    Degraded {
        reason: String,
        placeholder: MealResult,
    },
}

impl Menu {
    /// Upstream could not be reached or did not look like the menu page at all
    pub fn unavailable(err: impl Display) -> Self {
        Self::Degraded {
            reason: format!("{SERVER_ERROR_PREFIX}: {err}"),
            placeholder: MealResult::placeholder(TODAY_LABEL, UNAVAILABLE),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    pub fn into_response(self, day: &ResolvedDay) -> MenuResponse {
        match self {
            Self::Served(meals) => MenuResponse {
                error: None,
                date: meals.date,
                lunch: meals.lunch,
                dinner: meals.dinner,
                day_of_week: day.label.into(),
                formatted_date: day.formatted_date(),
            },
            Self::Degraded {
                reason,
                placeholder,
            } => MenuResponse {
                error: Some(reason),
                // the day of week follows the placeholder, which is "오늘" when nothing was fetched
                day_of_week: placeholder.date.clone(),
                date: placeholder.date,
                lunch: placeholder.lunch,
                dinner: placeholder.dinner,
                formatted_date: day.formatted_date(),
            },
        }
    }
}

/// JSON body of `GET /api/hansik`
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MenuResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub date: String,
    pub lunch: String,
    pub dinner: String,
    pub day_of_week: String,
    pub formatted_date: String,
}
