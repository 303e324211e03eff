use url::Url;

/// Fixed table of hostname TLD typo corrections.
///
/// Explicit enumerated mapping; nothing is inferred. A hostname whose last
/// label matches the left side is rewritten to the right side.
const TLD_FIXES: &[(&str, &str)] = &[("d", "de"), ("comcom", "com"), ("cmo", "com")];

/// Normalizes a URL string into its canonical identity form
///
/// # Normalization Steps
///
/// 1. Trim surrounding whitespace; empty input yields an empty string
/// 2. Prefix `https://` when no `http://`/`https://` scheme is present
/// 3. Lowercase the host
/// 4. Remove a leading `www.` from the host
/// 5. Strip exactly one trailing slash from the path
/// 6. Sort query parameters lexicographically by key (values preserved)
/// 7. Apply the fixed TLD typo table to the last hostname label
///
/// # Lenient fallback
///
/// Never fails: input that does not parse as a URL is returned trimmed but
/// otherwise unchanged, so malformed URLs can still be stored and inspected.
///
/// Idempotent: `normalize_url(normalize_url(x)) == normalize_url(x)` for
/// every input that parses.
///
/// # Examples
///
/// ```
/// use a11y_beacon::url::normalize_url;
///
/// assert_eq!(normalize_url("WWW.Example.COM/page/"), "https://example.com/page");
/// assert_eq!(normalize_url("https://example.com/?b=2&a=1"), "https://example.com/?a=1&b=2");
/// ```
pub fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    // Default to https when the scheme is missing
    let candidate = if has_http_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let mut url = match Url::parse(&candidate) {
        Ok(u) => u,
        Err(_) => return trimmed.to_string(),
    };

    // Lowercase host, strip www., fix known TLD typos
    if let Some(host) = url.host_str() {
        let mut host = host.to_lowercase();
        if let Some(stripped) = host.strip_prefix("www.") {
            host = stripped.to_string();
        }
        host = fix_tld_typo(&host);

        if url.set_host(Some(&host)).is_err() {
            return trimmed.to_string();
        }
    }

    // Strip exactly one trailing slash from the path
    let path = url.path();
    if path.ends_with('/') {
        let stripped = path[..path.len() - 1].to_string();
        url.set_path(&stripped);
    }

    // Sort query keys lexicographically, values preserved. Pairs come out
    // of query_pairs() decoded, so they must be re-encoded on the way back
    // or reserved characters inside values would change meaning.
    if url.query().is_some() {
        let mut params: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        params.sort_by(|a, b| a.0.cmp(&b.0));

        if params.is_empty() {
            url.set_query(None);
        } else {
            let query = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(params.iter().map(|(k, v)| (k.as_str(), v.as_str())))
                .finish();
            url.set_query(Some(&query));
        }
    }

    url.to_string()
}

/// Checks for an explicit http or https scheme, case-insensitively
fn has_http_scheme(s: &str) -> bool {
    let lower = s.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Rewrites the last hostname label through the TLD typo table
fn fix_tld_typo(host: &str) -> String {
    let mut parts: Vec<&str> = host.split('.').collect();
    if parts.len() < 2 {
        return host.to_string();
    }
    if let Some(last) = parts.last_mut() {
        for (typo, fixed) in TLD_FIXES {
            if last == typo {
                *last = fixed;
                break;
            }
        }
    }
    parts.join(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize_url(""), "");
        assert_eq!(normalize_url("   "), "");
    }

    #[test]
    fn test_missing_scheme_gets_https() {
        assert_eq!(normalize_url("example.com"), "https://example.com/");
    }

    #[test]
    fn test_lowercase_host() {
        assert_eq!(
            normalize_url("https://EXAMPLE.COM/Page"),
            "https://example.com/Page"
        );
    }

    #[test]
    fn test_remove_www() {
        assert_eq!(
            normalize_url("https://www.example.com/page"),
            "https://example.com/page"
        );
    }

    #[test]
    fn test_strip_trailing_slash() {
        assert_eq!(
            normalize_url("https://example.com/page/"),
            "https://example.com/page"
        );
    }

    #[test]
    fn test_root_slash_stripped() {
        // The root path "/" is a trailing slash too; the Url type renders
        // the empty path without one only in the string form used here.
        let out = normalize_url("https://example.com/");
        assert_eq!(out, normalize_url(&out));
    }

    #[test]
    fn test_sort_query_params() {
        assert_eq!(
            normalize_url("https://example.com/page?b=2&a=1"),
            "https://example.com/page?a=1&b=2"
        );
    }

    #[test]
    fn test_query_values_preserved() {
        assert_eq!(
            normalize_url("https://example.com/page?z=last&a=first"),
            "https://example.com/page?a=first&z=last"
        );
    }

    #[test]
    fn test_encoded_reserved_chars_stay_encoded() {
        // An encoded ampersand inside a value must not turn into a pair
        // separator on the way back out
        assert_eq!(
            normalize_url("https://example.com/p?a=%26b"),
            "https://example.com/p?a=%26b"
        );
        assert_eq!(
            normalize_url("https://example.com/p?a=1%3D2"),
            "https://example.com/p?a=1%3D2"
        );
    }

    #[test]
    fn test_bare_query_key_gets_empty_value() {
        let once = normalize_url("https://example.com/p?flag");
        assert_eq!(once, "https://example.com/p?flag=");
        assert_eq!(normalize_url(&once), once);
    }

    #[test]
    fn test_tld_typo_cmo() {
        assert_eq!(
            normalize_url("https://example.cmo/page"),
            "https://example.com/page"
        );
    }

    #[test]
    fn test_tld_typo_comcom() {
        assert_eq!(normalize_url("example.comcom"), "https://example.com/");
    }

    #[test]
    fn test_tld_typo_d() {
        assert_eq!(normalize_url("https://example.d"), "https://example.de/");
    }

    #[test]
    fn test_malformed_returns_trimmed_input() {
        assert_eq!(normalize_url("  http://[bad  "), "http://[bad");
    }

    #[test]
    fn test_equivalent_forms_collapse() {
        let forms = [
            "example.com/page/",
            "https://example.com/page",
            "https://www.example.com/page/",
            "HTTPS://WWW.EXAMPLE.COM/page",
        ];
        let canonical = normalize_url(forms[0]);
        for form in &forms {
            assert_eq!(normalize_url(form), canonical, "input: {}", form);
        }
    }

    #[test]
    fn test_query_order_collapses() {
        assert_eq!(
            normalize_url("https://example.com/p?b=2&a=1"),
            normalize_url("https://example.com/p?a=1&b=2")
        );
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "example.com",
            "https://www.Example.cmo/path/?z=1&a=2",
            "http://example.com/a/b/",
            "https://example.com/?a=%26b&c=1%3D2",
            "https://example.com/p?flag",
            "not a url at all",
            "",
        ];
        for input in &inputs {
            let once = normalize_url(input);
            assert_eq!(normalize_url(&once), once, "input: {}", input);
        }
    }
}
