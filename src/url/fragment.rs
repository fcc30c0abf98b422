use url::Url;

/// Removes the `#fragment` suffix from a URL.
///
/// Fragments address positions within a page, not distinct resources, so
/// the work queue and page store key URLs by their fragment-less form.
/// Unparseable input is passed through unchanged.
pub fn strip_fragment(link: &str) -> String {
    match Url::parse(link) {
        Ok(mut url) => {
            url.set_fragment(None);
            url.to_string()
        }
        Err(_) => link.to_string(),
    }
}

/// Splits a URL into its fragment-less base and its fragment.
///
/// The fragment is empty when the URL carries none.
pub fn split_fragment(link: &str) -> (String, String) {
    match Url::parse(link) {
        Ok(mut url) => {
            let frag = url.fragment().unwrap_or("").to_string();
            url.set_fragment(None);
            (url.to_string(), frag)
        }
        Err(_) => (link.to_string(), String::new()),
    }
}

/// Resolves an `href` value against the page it appeared on.
///
/// Returns the absolute URL with any fragment retained, or `None` for an
/// empty or unresolvable reference.
pub fn resolve_href(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    base.join(href).ok().map(|url| url.to_string())
}
