//! Menu extraction from the cafeteria's weekly menu table.
//!
//! The table looks roughly like this, with one column per weekday, Monday first:
//!
//! ```html
//! <table id="coltable">
//!   <thead><tr><th><div>10.13(월)</div></th>...</tr></thead>
//!   <tbody>
//!     <tr><th>10.13(월)</th>...</tr>       <!-- dates -->
//!     <tr><td>rice<br>soup</td>...</tr>    <!-- lunch -->
//!     <tr><td>...</td>...</tr>             <!-- dinner -->
//!   </tbody>
//! </table>
//! ```
//!
//! Menu cells are not consistently formatted, so each one runs through an ordered list of
//! strategies until one of them comes up with something.

use crate::{
    markup::{decode_entities, split_br, split_items, strip_tags},
    models::{Meal, MealResult},
    util::*,
};
use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, trace, warn};

/// Present somewhere in the raw page whenever the menu table is
pub const TABLE_MARKER: &str = "coltable";
pub const ERR_TABLE_NOT_FOUND: &str = "학식 정보를 찾을 수 없습니다.";
pub const ERR_BAD_FORMAT: &str = "학식 정보 형식이 올바르지 않습니다.";

const MIN_ROWS: usize = 3;

lazy_static! {
    static ref SEL_TABLE_BODY: Selector = sel("#coltable tbody");
    static ref SEL_ROW: Selector = sel("tr");
    static ref SEL_TH: Selector = sel("th");
    static ref SEL_TD: Selector = sel("td");
    static ref SEL_MENU_ITEM: Selector = sel(".obj");
}

#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    Found(MealResult),
    /// The page didn't have the expected table layout
    Structural { reason: &'static str },
}

/// A single menu cell, as found in the table
#[derive(Debug, Clone)]
pub struct MenuCell<'a> {
    el: ElementRef<'a>,
    inner_html: String,
}

impl<'a> MenuCell<'a> {
    pub fn new(el: ElementRef<'a>) -> Self {
        Self {
            inner_html: el.inner_html(),
            el,
        }
    }
}

type Strategy = fn(&MenuCell<'_>) -> Option<String>;

/// Tried in order, first non-blank result wins
const STRATEGIES: [(&str, Strategy); 4] = [
    ("br-split", br_split),
    ("class", class_items),
    ("plain-text", plain_text),
    ("decoded-html", decoded_html),
];

/// Extract the menu for the given zero based weekday column.
/// `fallback_date` is used when no date header can be found for the column.
pub fn extract(html: &str, column: usize, fallback_date: &str) -> Extraction {
    let doc = Html::parse_document(html);

    let body = match doc.select(&SEL_TABLE_BODY).next() {
        Some(b) => b,
        None => {
            warn!("Menu table not found");
            return Extraction::Structural {
                reason: ERR_TABLE_NOT_FOUND,
            };
        }
    };

    let rows: Vec<ElementRef> = body.select(&SEL_ROW).collect();
    if rows.len() < MIN_ROWS {
        warn!(rows = rows.len(), "Too few rows in menu table");
        return Extraction::Structural {
            reason: ERR_BAD_FORMAT,
        };
    }

    let date = header_date(&doc, column)
        .or_else(|| row_date(&rows[0], column))
        .unwrap_or_else(|| fallback_date.into());
    trace!(%date, column, "Resolved date label");

    Extraction::Found(MealResult {
        date,
        lunch: meal_text(&rows, column, Meal::Lunch),
        dinner: meal_text(&rows, column, Meal::Dinner),
    })
}

/// Same lookup as the XPath `//*[@id="coltable"]/thead/tr/th[n]/div`
fn header_date(doc: &Html, column: usize) -> Option<String> {
    let selector = try_sel(&format!(
        "#coltable > thead > tr > th:nth-of-type({}) > div",
        column + 1
    ))?;
    doc.select(&selector).next().and_then(|e| trimmed_text(&e))
}

fn row_date(row: &ElementRef, column: usize) -> Option<String> {
    row.select(&SEL_TH)
        .nth(column)
        .and_then(|e| trimmed_text(&e))
}

fn meal_text(rows: &[ElementRef], column: usize, meal: Meal) -> String {
    let cell = rows
        .get(meal.row())
        .and_then(|row| row.select(&SEL_TD).nth(column))
        .map(MenuCell::new);

    match cell.and_then(|c| run_cascade(&c, meal)) {
        Some(text) => text,
        None => {
            debug!(%meal, column, "No menu found, using placeholder");
            meal.sentinel().into()
        }
    }
}

/// Run all strategies in order, returning the first non-blank result
pub fn run_cascade(cell: &MenuCell, meal: Meal) -> Option<String> {
    for (name, strategy) in STRATEGIES {
        match strategy(cell) {
            Some(text) if !text.trim().is_empty() => {
                trace!(%meal, strategy = name, "Menu extracted");
                return Some(text);
            }
            _ => trace!(%meal, strategy = name, "Strategy found nothing"),
        }
    }
    None
}

fn join_nonempty<I, S>(items: I) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let joined = items
        .into_iter()
        .filter(|v| !v.as_ref().is_empty())
        .fold(String::new(), |mut acc, v| {
            if !acc.is_empty() {
                acc.push('\n');
            }
            acc.push_str(v.as_ref());
            acc
        });
    (!joined.is_empty()).then_some(joined)
}

/// Items separated by `<br>` tags
fn br_split(cell: &MenuCell) -> Option<String> {
    join_nonempty(
        split_br(&cell.inner_html)
            .into_iter()
            .map(|v| strip_tags(v).trim().to_string()),
    )
}

/// Items wrapped in elements with the `obj` class
fn class_items(cell: &MenuCell) -> Option<String> {
    join_nonempty(cell.el.select(&SEL_MENU_ITEM).filter_map(|e| trimmed_text(&e)))
}

/// Items separated by commas, slashes or newlines in the text content
fn plain_text(cell: &MenuCell) -> Option<String> {
    let text = trimmed_text(&cell.el)?;
    join_nonempty(split_items(&text, &['\n', ',', '/'])).or(Some(text))
}

/// Last resort for cells with markup but no text: decode entities and try again
fn decoded_html(cell: &MenuCell) -> Option<String> {
    if cell.inner_html.is_empty() || trimmed_text(&cell.el).is_some() {
        return None;
    }
    join_nonempty(
        split_br(&cell.inner_html)
            .into_iter()
            .map(|v| decode_entities(strip_tags(v).trim())),
    )
    .or_else(|| {
        let full = decode_entities(&cell.inner_html);
        join_nonempty(split_items(&full, &['\n', ',', '/'])).or(Some(full))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{DAYS, page};
    use crate::models::{NO_DINNER, NO_LUNCH};

    fn single(cell: &str) -> String {
        page(&[cell, "", "", "", ""], &["", "", "", "", ""])
    }

    fn found(e: Extraction) -> MealResult {
        match e {
            Extraction::Found(m) => m,
            other => panic!("expected menu, got {other:?}"),
        }
    }

    #[test]
    fn br_split_drops_empty_fragments() {
        let m = found(extract(&single("A<br>B<br>  <br>C"), 0, "월요일"));
        assert_eq!("A\nB\nC", m.lunch);
    }

    #[test]
    fn br_split_strips_nested_tags() {
        let m = found(extract(&single("<b>A</b><br/><span>B</span>"), 0, "월요일"));
        assert_eq!("A\nB", m.lunch);
    }

    fn cell_of(html: &Html) -> MenuCell<'_> {
        MenuCell::new(html.select(&sel("div")).next().unwrap())
    }

    #[test]
    fn plain_text_splits_on_commas_and_slashes() {
        let doc = Html::parse_fragment("<div>A, B/C</div>");
        assert_eq!(Some("A\nB\nC".into()), plain_text(&cell_of(&doc)));
    }

    #[test]
    fn plain_text_keeps_raw_text_when_nothing_survives() {
        let doc = Html::parse_fragment("<div> , / </div>");
        assert_eq!(Some(", /".into()), plain_text(&cell_of(&doc)));
    }

    #[test]
    fn single_fragment_is_kept_whole() {
        // br-split runs first, so a cell without breaks is one item
        let m = found(extract(&single("A, B/C"), 0, "월요일"));
        assert_eq!("A, B/C", m.lunch);
    }

    #[test]
    fn class_items_collects_marked_elements() {
        let doc = Html::parse_fragment(
            r#"<div><span class="obj">A</span><span class="obj"> </span><p class="obj">B</p><span>C</span></div>"#,
        );
        assert_eq!(Some("A\nB".into()), class_items(&cell_of(&doc)));

        let doc = Html::parse_fragment("<div><span>A</span></div>");
        assert_eq!(None, class_items(&cell_of(&doc)));
    }

    #[test]
    fn empty_cell_gets_sentinel() {
        let m = found(extract(&single(""), 0, "월요일"));
        assert_eq!(NO_LUNCH, m.lunch);
        assert_eq!(NO_DINNER, m.dinner);
    }

    #[test]
    fn whitespace_cell_gets_sentinel() {
        let m = found(extract(&single("  <br>  "), 0, "월요일"));
        assert_eq!(NO_LUNCH, m.lunch);
    }

    #[test]
    fn missing_cell_gets_sentinel() {
        let html = r#"<table id="coltable"><tbody>
            <tr><th>a</th></tr><tr><td>A</td></tr><tr><td>B</td></tr>
            </tbody></table>"#;
        let m = found(extract(html, 3, "목요일"));
        assert_eq!(NO_LUNCH, m.lunch);
        assert_eq!(NO_DINNER, m.dinner);
        assert_eq!("목요일", m.date);
    }

    #[test]
    fn picks_target_column() {
        let html = page(&["L0", "L1", "L2", "L3", "L4"], &["D0", "D1", "D2", "D3", "D4"]);
        for column in 0..5 {
            let m = found(extract(&html, column, "x"));
            assert_eq!(format!("L{column}"), m.lunch);
            assert_eq!(format!("D{column}"), m.dinner);
            assert_eq!(format!("10.{}({})", 12 + column, DAYS[column]), m.date);
        }
    }

    #[test]
    fn date_falls_back_to_body_row() {
        let html = r#"<table id="coltable"><tbody>
            <tr><th>10.12(월)</th><th>10.13(화)</th></tr>
            <tr><td>A</td><td>B</td></tr><tr><td>C</td><td>D</td></tr>
            </tbody></table>"#;
        let m = found(extract(html, 1, "화요일"));
        assert_eq!("10.13(화)", m.date);
        assert_eq!("B", m.lunch);
    }

    #[test]
    fn date_falls_back_to_label() {
        let html = r#"<table id="coltable"><tbody>
            <tr><td>x</td></tr><tr><td>A</td></tr><tr><td>C</td></tr>
            </tbody></table>"#;
        let m = found(extract(html, 0, "오늘"));
        assert_eq!("오늘", m.date);
    }

    #[test]
    fn missing_table_is_structural() {
        assert_eq!(
            Extraction::Structural {
                reason: ERR_TABLE_NOT_FOUND
            },
            extract("<html><body><p>coltable</p></body></html>", 0, "x")
        );
    }

    #[test]
    fn too_few_rows_is_structural() {
        let html = r#"<table id="coltable"><tbody><tr><th>a</th></tr><tr><td>A</td></tr></tbody></table>"#;
        assert_eq!(
            Extraction::Structural {
                reason: ERR_BAD_FORMAT
            },
            extract(html, 0, "x")
        );
    }

    #[test]
    fn decoded_html_only_without_text() {
        let doc = Html::parse_fragment("<div><img alt=\"x\"><br><img alt=\"y\"></div>");
        let cell = cell_of(&doc);
        assert_eq!(None, br_split(&cell));
        assert_eq!(None, plain_text(&cell));
        // nothing but markup decodes down to nothing
        assert_eq!(None, run_cascade(&cell, Meal::Lunch));

        let doc = Html::parse_fragment("<div>A</div>");
        assert_eq!(None, decoded_html(&cell_of(&doc)));
    }

    #[test]
    fn entities_survive_br_split() {
        // serialized markup keeps entities escaped, like innerHTML does
        let m = found(extract(&single("A &amp; B<br>C"), 0, "월요일"));
        assert_eq!("A &amp; B\nC", m.lunch);
    }
}
