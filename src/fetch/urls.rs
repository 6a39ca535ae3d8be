// src/fetch/urls.rs

use url::Url;

const PAGE_PARAM: &str = "page";

/// Point `base` at listing page `page`, replacing any existing `page=` value
/// and keeping every other query parameter.
pub fn page_url(base: &Url, page: u32) -> Url {
    let kept: Vec<(String, String)> = base
        .query_pairs()
        .filter(|(k, _)| k != PAGE_PARAM)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut url = base.clone();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair(PAGE_PARAM, &page.to_string());
    url
}

/// Substitute `{year}` and `{month}` (zero padded) in a URL template.
pub fn fill_template(template: &str, year: i32, month: Option<u32>) -> String {
    let out = template.replace("{year}", &year.to_string());
    match month {
        Some(m) => out.replace("{month}", &format!("{:02}", m)),
        None => out,
    }
}
