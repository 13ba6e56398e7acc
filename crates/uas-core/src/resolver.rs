//! Override resolution
//!
//! Finds the override string for a request URL by walking the host's
//! suffixes from most to least specific (`a.b.example.com`, `b.example.com`,
//! `example.com`, `com`) and falling back to the global default.

use log::debug;

use crate::error::ResolveError;
use crate::types::OverrideTable;
use crate::url::{extract_host, get_parent_domain};

/// Iterator for suffix-walking a host from full host to its last label.
pub struct HostSuffixIter<'a> {
    current: Option<&'a str>,
}

impl<'a> HostSuffixIter<'a> {
    pub fn new(host: &'a str) -> Self {
        Self {
            current: Some(host).filter(|h| !h.is_empty()),
        }
    }
}

impl<'a> Iterator for HostSuffixIter<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let result = self.current?;
        self.current = get_parent_domain(result);
        Some(result)
    }
}

/// Walk host suffixes from most specific to least specific.
pub fn walk_host_suffixes(host: &str) -> HostSuffixIter<'_> {
    HostSuffixIter::new(host)
}

/// Find the override for `host` in `domains`, or `default` if no suffix matches.
///
/// Empty strings in the table count as no override; `default` is returned as is.
pub fn resolve_host<'a>(
    host: &str,
    domains: &'a OverrideTable,
    default: Option<&'a str>,
) -> Option<&'a str> {
    walk_host_suffixes(host)
        .find_map(|suffix| {
            domains
                .get(suffix)
                .map(String::as_str)
                .filter(|value| !value.is_empty())
        })
        .or(default)
}

/// Resolve the override string for a request URL.
///
/// The host is taken as written; no case normalization is done.
pub fn resolve(
    url: &str,
    domains: &OverrideTable,
    default: Option<&str>,
) -> Result<Option<String>, ResolveError> {
    let host = extract_host(url).ok_or_else(|| ResolveError::InvalidUrl {
        url: url.to_string(),
    })?;

    Ok(resolve_host(host, domains, default).map(str::to_string))
}

/// Like [`resolve`], but a URL without a host means "no override".
pub fn resolve_or_none(url: &str, domains: &OverrideTable, default: Option<&str>) -> Option<String> {
    match resolve(url, domains, default) {
        Ok(value) => value,
        Err(e) => {
            debug!("{e}; not overriding");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> OverrideTable {
        let mut table = OverrideTable::new();
        table.insert("example.com".to_string(), "UA-A".to_string());
        table.insert("co.uk".to_string(), "UA-B".to_string());
        table
    }

    #[test]
    fn test_resolve_subdomain() {
        let table = table();
        assert_eq!(
            resolve("https://www.example.com/path", &table, Some("UA-D")),
            Ok(Some("UA-A".to_string()))
        );
        assert_eq!(
            resolve("https://sub.sub.example.com/", &table, Some("UA-D")),
            Ok(Some("UA-A".to_string()))
        );
    }

    #[test]
    fn test_resolve_falls_back_to_default() {
        let table = table();
        assert_eq!(
            resolve("https://other.org/", &table, Some("UA-D")),
            Ok(Some("UA-D".to_string()))
        );
        assert_eq!(resolve("https://other.org/", &table, None), Ok(None));
    }

    #[test]
    fn test_resolve_invalid_url() {
        let table = table();
        assert_eq!(
            resolve("not a url", &table, Some("UA-D")),
            Err(ResolveError::InvalidUrl {
                url: "not a url".to_string()
            })
        );
        assert_eq!(resolve_or_none("not a url", &table, Some("UA-D")), None);
    }

    #[test]
    fn test_resolve_public_suffix_entry() {
        let table = table();
        assert_eq!(
            resolve("http://shop.example.co.uk:8080/", &table, None),
            Ok(Some("UA-B".to_string()))
        );
    }

    #[test]
    fn test_resolve_most_specific_wins() {
        let mut table = table();
        table.insert("www.example.com".to_string(), "UA-W".to_string());
        assert_eq!(
            resolve("https://www.example.com/", &table, None),
            Ok(Some("UA-W".to_string()))
        );
        assert_eq!(
            resolve("https://api.example.com/", &table, None),
            Ok(Some("UA-A".to_string()))
        );
    }

    #[test]
    fn test_resolve_is_case_sensitive() {
        let table = table();
        assert_eq!(
            resolve("https://WWW.EXAMPLE.COM/", &table, Some("UA-D")),
            Ok(Some("UA-D".to_string()))
        );
    }

    #[test]
    fn test_resolve_single_label_is_looked_up() {
        let mut table = OverrideTable::new();
        table.insert("com".to_string(), "UA-TLD".to_string());
        table.insert("".to_string(), "UA-EMPTY".to_string());
        assert_eq!(resolve_host("example.com", &table, None), Some("UA-TLD"));
        assert_eq!(resolve_host("localhost", &table, None), None);
        assert_eq!(resolve_host("host.", &table, None), None);
    }

    #[test]
    fn test_resolve_empty_value_is_absent() {
        let mut table = table();
        table.insert("www.example.com".to_string(), String::new());
        assert_eq!(resolve_host("www.example.com", &table, None), Some("UA-A"));
    }

    #[test]
    fn test_resolve_returns_empty_default_unchanged() {
        let table = OverrideTable::new();
        assert_eq!(resolve("https://a.b/", &table, Some("")), Ok(Some(String::new())));
    }

    #[test]
    fn test_walk_host_suffixes() {
        let suffixes: Vec<&str> = walk_host_suffixes("a.b.example.com").collect();
        assert_eq!(suffixes, vec!["a.b.example.com", "b.example.com", "example.com", "com"]);
        assert_eq!(walk_host_suffixes("").count(), 0);
    }
}
