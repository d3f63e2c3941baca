// Menu pages shaped like the upstream calendar page, for tests

pub const DAYS: [&str; 5] = ["월", "화", "수", "목", "금"];

/// Build a menu page with the given lunch and dinner cells, one per weekday
pub fn page(lunch: &[&str; 5], dinner: &[&str; 5]) -> String {
    let head: String = DAYS
        .iter()
        .enumerate()
        .map(|(i, d)| format!("<th><div>10.{}({d})</div></th>", 12 + i))
        .collect();
    let dates: String = DAYS
        .iter()
        .enumerate()
        .map(|(i, d)| format!("<th>10.{}({d})</th>", 12 + i))
        .collect();
    let tds = |cells: &[&str; 5]| -> String { cells.iter().map(|c| format!("<td>{c}</td>")).collect() };
    format!(
        r#"<html><body><table id="coltable">
        <thead><tr>{head}</tr></thead>
        <tbody><tr>{dates}</tr><tr>{}</tr><tr>{}</tr></tbody>
        </table></body></html>"#,
        tds(lunch),
        tds(dinner)
    )
}
