// Small helpers for picking apart raw cell markup. The upstream page is not consistent in how it
// separates menu items, so these work on the serialized inner HTML rather than the DOM.

use nom::{
    IResult, Parser,
    bytes::complete::{tag_no_case, take_till},
    character::complete::{char, multispace0},
    combinator::{opt, recognize},
};

/// Matches `<br>`, `<br/>`, `<BR />` and friends
fn br_tag(input: &str) -> IResult<&str, &str> {
    recognize((tag_no_case("<br"), multispace0, opt(char('/')), char('>'))).parse(input)
}

/// Matches any complete `<...>` tag
fn any_tag(input: &str) -> IResult<&str, &str> {
    recognize((char('<'), take_till(|c: char| c == '>'), char('>'))).parse(input)
}

/// Run `parser` at every `<` in `s`, returning the byte ranges of all matches
fn find_all<'a, F>(s: &'a str, parser: F) -> Vec<(usize, usize)>
where
    F: Fn(&'a str) -> IResult<&'a str, &'a str>,
{
    let mut found = Vec::new();
    let mut pos = 0;
    while let Some(off) = s[pos..].find('<') {
        let at = pos + off;
        match parser(&s[at..]) {
            Ok((rest, _)) => {
                let end = s.len() - rest.len();
                found.push((at, end));
                pos = end;
            }
            // '<' is a single byte, so this stays on a char boundary
            Err(_) => pos = at + 1,
        }
    }
    found
}

/// Split markup on line break tags. Fragments are returned as is, including empty ones.
pub fn split_br(html: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    for (at, end) in find_all(html, br_tag) {
        parts.push(&html[start..at]);
        start = end;
    }
    parts.push(&html[start..]);
    parts
}

/// Remove all tags, leaving text content. An unterminated `<` is kept.
pub fn strip_tags(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut start = 0;
    for (at, end) in find_all(s, any_tag) {
        out.push_str(&s[start..at]);
        start = end;
    }
    out.push_str(&s[start..]);
    out
}

/// Decode the handful of entities the upstream page emits, then flatten line breaks to newlines
/// and drop whatever markup is left.
pub fn decode_entities(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let decoded = text
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'");
    let decoded = decoded.strip_suffix("</div>").unwrap_or(&decoded);
    strip_tags(&split_br(decoded).join("\n"))
}

/// Split on any run of the given separators, trimming pieces and dropping empty ones
pub fn split_items<'a>(s: &'a str, separators: &[char]) -> Vec<&'a str> {
    s.split(|c: char| separators.contains(&c))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .collect()
}
