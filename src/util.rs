use scraper::{ElementRef, Selector};

pub fn sel(selector: &str) -> Selector {
    Selector::parse(selector).unwrap()
}

/// Like `sel`, but for selectors built at runtime
pub fn try_sel(selector: &str) -> Option<Selector> {
    Selector::parse(selector).ok()
}

/// All text content of an element, like the DOM's `textContent`
pub fn text_content(e: &ElementRef) -> String {
    e.text().collect()
}

/// Trimmed text content, or None if there's nothing but whitespace
pub fn trimmed_text(e: &ElementRef) -> Option<String> {
    let text = text_content(e);
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    Some(text.into())
}
