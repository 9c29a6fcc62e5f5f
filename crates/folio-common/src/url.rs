//! URL resolution utilities.
//!
//! [URL Standard](https://url.spec.whatwg.org/)
//!
//! Stylesheets remember the protocol, host and base path of the document they
//! were loaded from. Relative `url()` references in background and list-style
//! images are resolved against that triple.

use serde::Serialize;

/// Protocol, host and base path of a document or stylesheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BaseUrl {
    /// Protocol including the separator, e.g. `"https://"` or `"file://"`.
    /// Empty for plain local paths.
    pub protocol: String,
    /// Host name (empty for local files).
    pub host: String,
    /// Directory part, always ending in `/`.
    pub base_path: String,
}

const REMOTE_PROTOCOLS: [&str; 4] = ["http://", "https://", "ftp://", "ftps://"];

impl BaseUrl {
    /// Split a document location into protocol, host and directory.
    ///
    /// ```
    /// let base = folio_common::BaseUrl::from_location("https://example.com/docs/index.html");
    /// assert_eq!(base.protocol, "https://");
    /// assert_eq!(base.host, "example.com");
    /// assert_eq!(base.base_path, "/docs/");
    /// ```
    #[must_use]
    pub fn from_location(location: &str) -> Self {
        let (protocol, rest) = match location.find("://") {
            Some(pos) => (&location[..pos + 3], &location[pos + 3..]),
            None => ("", location),
        };

        let is_remote = REMOTE_PROTOCOLS.contains(&protocol.to_ascii_lowercase().as_str());
        let (host, path) = if is_remote {
            rest.find('/')
                .map_or((rest, "/"), |slash| (&rest[..slash], &rest[slash..]))
        } else {
            ("", rest)
        };

        let base_path = path
            .rfind('/')
            .map_or_else(String::new, |slash| path[..=slash].to_string());

        Self {
            protocol: protocol.to_string(),
            host: host.to_string(),
            base_path,
        }
    }

    /// Resolve `href` against this base.
    ///
    /// STEP 1: An empty reference resolves to the base directory itself.
    ///
    /// STEP 2: Already qualified URLs (`scheme://...`) and `data:` URIs are
    /// returned unchanged.
    ///
    /// STEP 3: Local protocols join the base path and drop any query string.
    ///
    /// STEP 4: Remote protocols join absolute paths with the host and relative
    /// paths with host plus base path.
    #[must_use]
    pub fn resolve(&self, href: &str) -> String {
        let href = href.trim();

        // STEP 1
        if href.is_empty() {
            return format!(
                "{}{}{}/",
                self.protocol,
                self.host,
                self.base_path.trim_end_matches(['/', '\\'])
            );
        }

        // STEP 2
        if href.contains("://") || href.starts_with("data:") {
            return href.to_string();
        }

        let is_remote = REMOTE_PROTOCOLS.contains(&self.protocol.to_ascii_lowercase().as_str());

        // STEP 3
        if !is_remote {
            let mut resolved = self.protocol.clone();
            if !href.starts_with('/') {
                resolved.push_str(&self.base_path);
            }
            resolved.push_str(href);
            if let Some(query) = resolved.find('?') {
                resolved.truncate(query);
            }
            return resolved;
        }

        // STEP 4
        if href.starts_with('/') || href.starts_with('\\') {
            format!("{}{}{href}", self.protocol, self.host)
        } else {
            format!("{}{}{}{href}", self.protocol, self.host, self.base_path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_remote() {
        let base = BaseUrl::from_location("http://example.com/a/b/page.html");
        assert_eq!(base.resolve("img/x.png"), "http://example.com/a/b/img/x.png");
        assert_eq!(base.resolve("/x.png"), "http://example.com/x.png");
    }

    #[test]
    fn test_absolute_and_data_untouched() {
        let base = BaseUrl::from_location("http://example.com/");
        assert_eq!(base.resolve("https://cdn.test/x.png"), "https://cdn.test/x.png");
        assert_eq!(base.resolve("data:image/png;base64,AAAA"), "data:image/png;base64,AAAA");
    }

    #[test]
    fn test_local_paths_drop_query() {
        let base = BaseUrl::from_location("/srv/docs/report.html");
        assert_eq!(base.protocol, "");
        assert_eq!(base.base_path, "/srv/docs/");
        assert_eq!(base.resolve("logo.png?v=2"), "/srv/docs/logo.png");
        assert_eq!(base.resolve("/abs/logo.png"), "/abs/logo.png");
    }

    #[test]
    fn test_empty_reference_is_base_directory() {
        let base = BaseUrl::from_location("https://example.com/docs/index.html");
        assert_eq!(base.resolve(""), "https://example.com/docs/");
    }
}
