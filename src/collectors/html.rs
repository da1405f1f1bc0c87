use scraper::{ElementRef, Html, Selector};

use crate::error::ScrapeError;

pub const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Send a listing page request and return its body, failing on non-success status.
pub async fn fetch_page(request: reqwest::RequestBuilder) -> Result<String, ScrapeError> {
    let resp = request.send().await?;

    if !resp.status().is_success() {
        return Err(ScrapeError::Status(resp.status()));
    }

    Ok(resp.text().await?)
}

/// One listing card on a page. Child lookups mirror the usual
/// "text of the first matching child" / "attribute of the first matching child".
pub struct Card<'a> {
    element: ElementRef<'a>,
}

impl<'a> Card<'a> {
    fn first(&self, selector: &str) -> Option<ElementRef<'a>> {
        let sel = Selector::parse(selector).ok()?;
        self.element.select(&sel).next()
    }

    /// Whitespace-collapsed text of the first child matching `selector`.
    pub fn text(&self, selector: &str) -> String {
        self.first(selector)
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .unwrap_or_default()
    }

    pub fn attr(&self, selector: &str, attr: &str) -> String {
        self.first(selector)
            .and_then(|el| el.value().attr(attr))
            .map(|v| v.trim().to_string())
            .unwrap_or_default()
    }
}

/// Run `map` over every element matching `card_selector`, keeping the
/// listings it returns.
pub fn scrape_cards<T>(
    html: &str,
    card_selector: &str,
    mut map: impl FnMut(&Card<'_>) -> Option<T>,
) -> Result<Vec<T>, ScrapeError> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(card_selector)
        .map_err(|e| ScrapeError::Parse(format!("bad selector '{card_selector}': {e}")))?;

    Ok(document
        .select(&selector)
        .filter_map(|element| map(&Card { element }))
        .collect())
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
