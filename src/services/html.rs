use scraper::Html;

/// Reduce an HTML fragment to readable text: tags dropped, entities decoded,
/// whitespace collapsed. Element boundaries become spaces.
pub fn to_plain_text(fragment: &str) -> String {
    if !fragment.contains('<') {
        return collapse(&html_escape::decode_html_entities(fragment));
    }
    let parsed = Html::parse_fragment(fragment);
    let text = parsed.root_element().text().collect::<Vec<_>>().join(" ");
    collapse(&text)
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
