use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Terminal cells needed to show `s`; a tab counts as 4
pub fn display_width(s: &str) -> usize {
    s.graphemes(true).map(grapheme_display_width).sum()
}

const ELLIPSIS: char = '\u{2026}';

/// Shorten `s` to at most `max_cells` cells, ending in `…` when anything was cut.
/// Never splits a grapheme.
pub fn truncate_to_width(s: &str, max_cells: usize) -> String {
    if display_width(s) <= max_cells {
        return s.to_string();
    }
    let Some(budget) = max_cells.checked_sub(1) else {
        return String::new();
    };
    let mut used = 0;
    let mut out: String = s
        .graphemes(true)
        .take_while(|g| {
            used += grapheme_display_width(g);
            used <= budget
        })
        .collect();
    out.push(ELLIPSIS);
    out
}

/// Column-align a title: truncate, then pad with spaces to exactly `cells`
pub fn fit_to_width(s: &str, cells: usize) -> String {
    let out = truncate_to_width(s, cells);
    let pad = cells.saturating_sub(display_width(&out));
    format!("{}{}", out, " ".repeat(pad))
}

fn grapheme_display_width(g: &str) -> usize {
    match g {
        "\t" => 4,
        _ => g.width(),
    }
}
