// The whole lookup happens per request: resolve the day, load the page, pull out the column.
// Nothing is kept between requests.

use crate::{
    day::{self, DayToken, ResolvedDay},
    extract::{self, Extraction, TABLE_MARKER},
    fetch::Fetcher,
    models::{MealResult, Menu, MenuResponse},
};
use chrono::{Local, NaiveDate};
use std::time::{Duration, Instant};
use tracing::{debug, error, trace};
use url::Url;

pub static DEFAULT_URL: &str =
    "https://www.hanbat.ac.kr/prog/carteGuidance/kor/sub06_030301/C1/calendar.do";

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The page loaded, but it's not the menu page we know
    #[error("학식 정보 테이블을 찾을 수 없습니다.")]
    MissingTable,
    #[error("menu lookup timed out after {0:?}")]
    Timeout(Duration),
    #[error(transparent)]
    Fetch(#[from] anyhow::Error),
}

/// Menu lookup service, constructed once and shared by all request handlers
#[derive(Clone)]
pub struct Hansik {
    fetcher: Fetcher,
    url: Url,
    /// Upper bound for fetch plus extraction
    timeout: Duration,
}

impl Hansik {
    pub fn new(fetcher: Fetcher, url: Url, timeout: Duration) -> Self {
        Self {
            fetcher,
            url,
            timeout,
        }
    }

    /// Look up the menu for the given day, relative to the local date
    pub async fn menu(&self, token: DayToken) -> MenuResponse {
        self.menu_on(token, Local::now().date_naive()).await
    }

    /// Look up the menu for the given day, relative to `today`.
    /// Failures never escape, they end up as a degraded response with placeholder text.
    #[tracing::instrument(skip(self), fields(fetcher = self.fetcher.name()))]
    pub async fn menu_on(&self, token: DayToken, today: NaiveDate) -> MenuResponse {
        let day = day::resolve(token, today);
        debug!(
            weekday = day.weekday_index(),
            column = day.target_column(),
            label = day.label,
            "Resolved day"
        );

        // the fetch future is dropped on expiry, which also tells a browser job to give up
        let res = tokio::time::timeout(self.timeout, self.lookup(&day))
            .await
            .unwrap_or_else(|_| Err(Error::Timeout(self.timeout)));
        let menu = match res {
            Ok(menu) => menu,
            Err(err) => {
                let err = format!("{err:#}");
                error!(%err, url = %self.url, "Failed to get menu");
                Menu::unavailable(err)
            }
        };
        if menu.is_degraded() {
            debug!("Responding with placeholder menu");
        }
        menu.into_response(&day)
    }

    async fn lookup(&self, day: &ResolvedDay) -> Result<Menu, Error> {
        let start = Instant::now();
        let html = self.fetcher.fetch(self.url.as_str()).await?;
        trace!("Page loaded in {:?}", start.elapsed());

        if !html.contains(TABLE_MARKER) {
            return Err(Error::MissingTable);
        }

        let start = Instant::now();
        let menu = match extract::extract(&html, day.target_column(), day.label) {
            Extraction::Found(mut meals) => {
                if meals.date.trim().is_empty() {
                    meals.date = day.label.into();
                }
                Menu::Served(meals)
            }
            Extraction::Structural { reason } => Menu::Degraded {
                reason: reason.into(),
                placeholder: MealResult::placeholder(day.label, reason),
            },
        };
        trace!("Extraction done in {:?}", start.elapsed());
        Ok(menu)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        day::TODAY_LABEL,
        extract::{ERR_BAD_FORMAT, ERR_TABLE_NOT_FOUND},
        fixtures::page,
        models::{NO_DINNER, NO_LUNCH, SERVER_ERROR_PREFIX, UNAVAILABLE},
    };
    use std::path::PathBuf;

    fn hansik(fetcher: Fetcher) -> Hansik {
        Hansik::new(fetcher, Url::parse(DEFAULT_URL).unwrap(), Duration::from_secs(5))
    }

    fn inline(html: &str) -> Hansik {
        hansik(Fetcher::Inline(html.into()))
    }

    // a Sunday
    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    #[tokio::test]
    async fn wednesday_menu() {
        let html = page(
            &["A", "B", "제육덮밥<br>김치찌개", "D", "E"],
            &["a", "b", "", "d", "e"],
        );
        let r = inline(&html)
            .menu_on(DayToken::parse(Some("wed")), today())
            .await;
        assert_eq!(None, r.error);
        assert_eq!("10.14(수)", r.date);
        assert_eq!("제육덮밥\n김치찌개", r.lunch);
        assert_eq!(NO_DINNER, r.dinner);
        assert_eq!("수요일", r.day_of_week);
        assert_eq!("2026-10-21 (수요일)", r.formatted_date);
    }

    #[tokio::test]
    async fn weekend_today_serves_monday() {
        let html = page(&["월밥", "", "", "", ""], &["", "", "", "", ""]);
        let r = inline(&html).menu_on(DayToken::Today, today()).await;
        assert_eq!("월밥", r.lunch);
        assert_eq!(NO_DINNER, r.dinner);
        assert_eq!(TODAY_LABEL, r.day_of_week);
        assert_eq!("2026-10-19 (오늘)", r.formatted_date);
    }

    #[tokio::test]
    async fn empty_cells_get_sentinels() {
        let html = page(&[""; 5], &[""; 5]);
        let r = inline(&html)
            .menu_on(DayToken::parse(Some("fri")), today())
            .await;
        assert_eq!(None, r.error);
        assert_eq!(NO_LUNCH, r.lunch);
        assert_eq!(NO_DINNER, r.dinner);
    }

    #[tokio::test]
    async fn missing_marker_is_degraded() {
        let r = inline("<html><body>maintenance</body></html>")
            .menu_on(DayToken::parse(Some("mon")), today())
            .await;
        let err = r.error.expect("error should be set");
        assert!(err.starts_with(SERVER_ERROR_PREFIX));
        assert!(err.ends_with(&Error::MissingTable.to_string()));
        assert_eq!(UNAVAILABLE, r.lunch);
        assert_eq!(UNAVAILABLE, r.dinner);
        assert_eq!(TODAY_LABEL, r.day_of_week);
    }

    #[tokio::test]
    async fn structural_failures_keep_day_label() {
        // marker present, table missing
        let r = inline("<div id=\"coltable-wrapper\"></div>")
            .menu_on(DayToken::parse(Some("tue")), today())
            .await;
        assert_eq!(Some(ERR_TABLE_NOT_FOUND.to_string()), r.error);
        assert_eq!(ERR_TABLE_NOT_FOUND, r.lunch);
        assert_eq!("화요일", r.date);
        assert_eq!("화요일", r.day_of_week);

        let r = inline("<table id=\"coltable\"><tbody><tr><td>x</td></tr></tbody></table>")
            .menu_on(DayToken::parse(Some("thu")), today())
            .await;
        assert_eq!(Some(ERR_BAD_FORMAT.to_string()), r.error);
        assert_eq!(ERR_BAD_FORMAT, r.dinner);
        assert_eq!("목요일", r.day_of_week);
    }

    #[tokio::test]
    async fn fetch_failure_is_degraded() {
        let r = hansik(Fetcher::File(PathBuf::from("/nonexistent/hansik.html")))
            .menu_on(DayToken::Today, today())
            .await;
        assert!(r.error.unwrap().starts_with(SERVER_ERROR_PREFIX));
        assert_eq!(TODAY_LABEL, r.date);
        assert_eq!(UNAVAILABLE, r.lunch);
    }

    #[tokio::test]
    async fn stalled_fetch_times_out_as_placeholder() {
        let h = Hansik::new(
            Fetcher::Stalled,
            Url::parse(DEFAULT_URL).unwrap(),
            Duration::from_millis(50),
        );
        let r = h.menu_on(DayToken::parse(Some("wed")), today()).await;
        let err = r.error.expect("error should be set");
        assert!(err.starts_with(SERVER_ERROR_PREFIX));
        assert!(err.contains("timed out"));
        assert_eq!(UNAVAILABLE, r.lunch);
        assert_eq!(UNAVAILABLE, r.dinner);
        assert_eq!(TODAY_LABEL, r.day_of_week);
        assert_eq!("2026-10-21 (수요일)", r.formatted_date);
    }

    #[tokio::test]
    async fn repeated_lookups_are_identical() {
        let html = page(&["A<br>B", "", "", "", ""], &["C, D", "", "", "", ""]);
        let h = inline(&html);
        let first = h.menu_on(DayToken::parse(Some("mon")), today()).await;
        let second = h.menu_on(DayToken::parse(Some("mon")), today()).await;
        assert_eq!(first, second);
        assert_eq!("A\nB", first.lunch);
        assert_eq!("C, D", first.dinner);
    }
}
