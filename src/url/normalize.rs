use crate::UrlError;
use url::Url;

/// Tracking query parameters removed during canonicalization
const TRACKING_PARAMS: &[&str] = &["fbclid", "gclid", "mc_eid"];

/// Schemes an anchor may carry that never lead to a page
const NON_NAVIGABLE_PREFIXES: &[&str] = &["javascript:", "mailto:", "tel:", "data:"];

/// Resolves an href against a base URL and canonicalizes the result
///
/// This is how listing identities are produced: two anchors pointing at the
/// same detail page through different spellings canonicalize to the same
/// `Url`, which is what de-duplication keys on.
///
/// # Canonicalization Steps
///
/// 1. Reject empty, fragment-only and non-navigable hrefs
/// 2. Resolve against `base`
/// 3. Require an http(s) scheme and a host
/// 4. Remove dot segments, duplicate slashes and the trailing slash
/// 5. Remove the fragment
/// 6. Remove tracking query parameters, sort the rest
/// 7. Remove an empty query string
///
/// # Examples
///
/// ```
/// use adsweep::url::canonicalize_url;
/// use url::Url;
///
/// let base = Url::parse("https://Example.com/en/cars?page=2").unwrap();
/// let url = canonicalize_url("/en/ad/123/?utm_source=feed#photos", &base).unwrap();
/// assert_eq!(url.as_str(), "https://example.com/en/ad/123");
/// ```
pub fn canonicalize_url(href: &str, base: &Url) -> Result<Url, UrlError> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return Err(UrlError::NotNavigable(href.to_string()));
    }

    let lowered = href.to_ascii_lowercase();
    if NON_NAVIGABLE_PREFIXES
        .iter()
        .any(|prefix| lowered.starts_with(prefix))
    {
        return Err(UrlError::NotNavigable(href.to_string()));
    }

    let resolved = base
        .join(href)
        .map_err(|e| UrlError::Parse(format!("{}: {}", href, e)))?;

    normalize_url(resolved)
}

/// Canonicalizes an already absolute URL string
///
/// Used for the seed URL, which has no base to resolve against.
pub fn parse_absolute(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;
    normalize_url(url)
}

fn normalize_url(mut url: Url) -> Result<Url, UrlError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    // `Url` already lowercases registrable hosts on parse
    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    let normalized_path = normalize_path(url.path());
    url.set_path(&normalized_path);

    url.set_fragment(None);

    if url.query().is_some() {
        let params = filter_and_sort_query_params(&url);

        if params.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut()
                .clear()
                .extend_pairs(params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }
    }

    Ok(url)
}

/// Normalizes a URL path by removing dot segments and trailing slashes
fn normalize_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }

    if segments.is_empty() {
        return "/".to_string();
    }

    format!("/{}", segments.join("/"))
}

/// Filters out tracking parameters and sorts remaining query parameters
fn filter_and_sort_query_params(url: &Url) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !is_tracking_param(key))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    params.sort_by(|a, b| a.0.cmp(&b.0));

    params
}

fn is_tracking_param(key: &str) -> bool {
    TRACKING_PARAMS.contains(&key) || key.starts_with("utm_")
}
