//! URL helpers shared by the SEO analyzer and the rank tracker.
//!
//! Tracked keywords declare their target as a site-relative path
//! (e.g. `/pl/blog/slug`), while search results carry absolute URLs, so
//! comparisons happen on normalized paths.

/// Host portion of an absolute http(s) URL, if any.
pub fn host_of(url: &str) -> Option<&str> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))?;
    let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    Some(&rest[..end])
}

/// Path portion of a URL, absolute or site-relative, without query/fragment.
pub fn path_of(url: &str) -> &str {
    match url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
    {
        Some(rest) => match rest.find('/') {
            Some(i) => {
                let path = &rest[i..];
                let end = path.find(['?', '#']).unwrap_or(path.len());
                &path[..end]
            }
            None => "/",
        },
        None => {
            let end = url.find(['?', '#']).unwrap_or(url.len());
            &url[..end]
        }
    }
}

/// True for root-relative links and absolute URLs on the site's own domain
/// (including `www.` and subdomains).
pub fn is_own_domain(url: &str, site_domain: &str) -> bool {
    if url.starts_with('/') && !url.starts_with("//") {
        return true;
    }
    let Some(host) = host_of(url) else {
        return false;
    };
    let host = host.strip_prefix("www.").unwrap_or(host);
    let domain = site_domain.strip_prefix("www.").unwrap_or(site_domain);
    host == domain || host.ends_with(&format!(".{domain}"))
}

/// Path-level equality, tolerant of scheme/host and a trailing slash.
pub fn urls_match(a: &str, b: &str) -> bool {
    normalize_path(path_of(a)) == normalize_path(path_of(b))
}

fn normalize_path(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}
