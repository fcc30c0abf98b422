/// Filter applied to every discovered link before it can enter the queue
/// or the page record.
///
/// Rejects links whose scheme is not HTTP(S) (`mailto:`, `javascript:`,
/// `tel:`, `sms:`, data URIs) and links matching any configured exclusion
/// prefix.
#[derive(Debug, Clone, Default)]
pub struct LinkFilter {
    exclude_prefixes: Vec<String>,
}

impl LinkFilter {
    /// Creates a filter with the given exclusion prefixes.
    ///
    /// A prefix matches on the exact string form of the absolute URL.
    pub fn new(exclude_prefixes: Vec<String>) -> Self {
        Self { exclude_prefixes }
    }

    /// Returns true if the link may be checked.
    pub fn allows(&self, link: &str) -> bool {
        if !link.starts_with("http://") && !link.starts_with("https://") {
            return false;
        }
        !self
            .exclude_prefixes
            .iter()
            .any(|prefix| link.starts_with(prefix.as_str()))
    }
}
