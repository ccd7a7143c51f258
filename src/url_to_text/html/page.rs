use super::extractors::decode_html_symbols;
use scraper::{ElementRef, Html, Node, Selector};

/// What the heuristic strategy reads off a fetched page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageSummary {
    pub title: String,
    pub image: String,
    /// Visible text, one line per block element
    pub text: String,
}

impl PageSummary {
    pub fn from_html(html: &str) -> Self {
        let document = Html::parse_document(html);
        Self {
            title: page_title(&document),
            image: meta_content(&document, "og:image"),
            text: visible_text(&document).join("\n"),
        }
    }
}

fn page_title(document: &Html) -> String {
    let og = meta_content(document, "og:title");
    if !og.is_empty() {
        return og;
    }
    Selector::parse("title")
        .ok()
        .and_then(|sel| document.select(&sel).next().map(|el| el.text().collect::<String>()))
        .map(|t| decode_html_symbols(&t))
        .unwrap_or_default()
}

fn meta_content(document: &Html, property: &str) -> String {
    let Ok(selector) = Selector::parse(&format!(
        "meta[property=\"{property}\"], meta[name=\"{property}\"]"
    )) else {
        return String::new();
    };
    document
        .select(&selector)
        .filter_map(|el| el.value().attr("content"))
        .map(decode_html_symbols)
        .find(|c| !c.is_empty())
        .unwrap_or_default()
}

/// Visible text of the page grouped into blocks.
///
/// Script, style and hidden elements are skipped. Inline text is merged
/// until the enclosing block element (or a `<br>`) ends.
pub fn visible_text(document: &Html) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();
    collect_text(&document.root_element(), &mut current, &mut blocks);
    flush(&mut current, &mut blocks);
    blocks
}

fn collect_text(element: &ElementRef, current: &mut Vec<String>, blocks: &mut Vec<String>) {
    if is_hidden(element) || should_skip_element(element) {
        return;
    }

    let tag_name = element.value().name().to_lowercase();
    if tag_name == "br" {
        flush(current, blocks);
        return;
    }
    let block = is_block_element(&tag_name);
    if block {
        flush(current, blocks);
    }

    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                let normalized = normalize_whitespace(text);
                if !normalized.is_empty() {
                    current.push(normalized);
                }
            }
            Node::Element(_) => {
                if let Some(child_ref) = ElementRef::wrap(child) {
                    collect_text(&child_ref, current, blocks);
                }
            }
            _ => {}
        }
    }

    if block {
        flush(current, blocks);
    }
}

fn flush(current: &mut Vec<String>, blocks: &mut Vec<String>) {
    if current.is_empty() {
        return;
    }
    let merged = current.join(" ").trim().to_string();
    if !merged.is_empty() {
        blocks.push(merged);
    }
    current.clear();
}

fn is_hidden(element: &ElementRef) -> bool {
    element.value().attr("hidden").is_some()
        || element.value().attr("aria-hidden") == Some("true")
        || element
            .value()
            .attr("style")
            .map(|s| {
                let s = s.replace(' ', "");
                s.contains("display:none") || s.contains("visibility:hidden")
            })
            .unwrap_or(false)
}

fn is_block_element(tag: &str) -> bool {
    matches!(
        tag,
        "address"
            | "article"
            | "aside"
            | "blockquote"
            | "dd"
            | "div"
            | "dl"
            | "dt"
            | "figcaption"
            | "figure"
            | "footer"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "header"
            | "li"
            | "main"
            | "ol"
            | "p"
            | "pre"
            | "section"
            | "table"
            | "td"
            | "th"
            | "tr"
            | "ul"
    )
}

fn should_skip_element(element: &ElementRef) -> bool {
    matches!(
        element.value().name().to_lowercase().as_str(),
        "head" | "script" | "style" | "noscript" | "iframe" | "canvas" | "svg" | "template"
    )
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocks_and_inline_text() {
        let document = Html::parse_document(
            r#"<html><body>
                <div>Hello <b>there</b></div>
                <p>World<br>Again</p>
                <span>Test</span>
            </body></html>"#,
        );
        assert_eq!(visible_text(&document), vec!["Hello there", "World", "Again", "Test"]);
    }

    #[test]
    fn test_skips_scripts_and_hidden() {
        let document = Html::parse_document(
            r#"<html><head><title>T</title><style>p{}</style></head><body>
                <script>var x = 1;</script>
                <p style="display: none">secret</p>
                <p hidden>also secret</p>
                <p>2 cups flour</p>
            </body></html>"#,
        );
        assert_eq!(visible_text(&document), vec!["2 cups flour"]);
    }

    #[test]
    fn test_summary_prefers_open_graph() {
        let summary = PageSummary::from_html(
            r#"<html><head>
                <title>Site | Page</title>
                <meta property="og:title" content="Lemon Bars &amp; More">
                <meta property="og:image" content="https://img.example.com/bars.jpg">
            </head><body><p>Zest the lemons.</p></body></html>"#,
        );
        assert_eq!(summary.title, "Lemon Bars & More");
        assert_eq!(summary.image, "https://img.example.com/bars.jpg");
        assert_eq!(summary.text, "Zest the lemons.");
    }

    #[test]
    fn test_summary_falls_back_to_title_tag() {
        let summary = PageSummary::from_html("<html><head><title> Pancakes </title></head></html>");
        assert_eq!(summary.title, "Pancakes");
        assert!(summary.image.is_empty());
        assert!(summary.text.is_empty());
    }
}
