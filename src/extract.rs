use crate::denylist::Denylist;
use lazy_regex::regex;
use reqwest::Url;
use std::collections::HashSet;

/// Returns true if `url` is an absolute `ftp`, `http` or `https` URL made of
/// the characters the scraper accepts.
pub fn is_absolute_url(url: &str) -> bool {
    regex!(
        r"^(?:ftp|http|https)://(?:[0-9A-Za-z_.\-+]+:?[0-9A-Za-z_.\-+]*@)?(?:[a-z0-9\-.]+)(?::[0-9]+)?(?:/|/(?:[0-9A-Za-z_#!:.?+=&;%@\-/()]+)|\?(?:[0-9A-Za-z_#!:.?+=&;%@\-/()]+))?$"
    )
    .is_match(url)
}

/// Prefixes a site-relative `href` with the scheme, host and port of `base`.
fn resolve_site_relative(base: &Url, href: &str) -> Option<String> {
    let host = base.host_str()?;
    let resolved = match base.port() {
        Some(port) => format!("{}://{}:{}{}", base.scheme(), host, port, href),
        None => format!("{}://{}{}", base.scheme(), host, href),
    };
    Some(resolved)
}

/// Finds every anchor `href` in `html` that is, or resolves against
/// `source_url` to, an acceptable absolute URL not on `denylist`.
pub fn extract_urls(source_url: &str, html: &[u8], denylist: &Denylist) -> HashSet<String> {
    let html = String::from_utf8_lossy(html);
    let base = Url::parse(source_url).ok();

    regex!(r#"<a\s+(?:[^>]*?\s+)?href=["']([^"']*)"#)
        .captures_iter(&html)
        .filter_map(|cap| cap.get(1).map(|m| m.as_str()))
        .filter_map(|href| {
            if is_absolute_url(href) {
                Some(href.to_string())
            } else if href.starts_with('/') {
                base.as_ref()
                    .and_then(|base| resolve_site_relative(base, href))
                    .filter(|url| is_absolute_url(url))
            } else {
                None
            }
        })
        .filter(|url| !denylist.is_denied(url))
        .collect()
}

/// Finds every `(DDD) DDD-DDDD` phone number in `html` not on `denylist`.
pub fn extract_phone_numbers(html: &[u8], denylist: &Denylist) -> HashSet<String> {
    let html = String::from_utf8_lossy(html);

    regex!(r"\([0-9]{3}\) [0-9]{3}-[0-9]{4}")
        .find_iter(&html)
        .map(|m| m.as_str())
        .filter(|number| !denylist.is_denied(number))
        .map(ToString::to_string)
        .collect()
}
