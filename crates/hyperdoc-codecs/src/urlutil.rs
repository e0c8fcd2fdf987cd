//! URL resolution and relativization shared by the format codecs.

use url::Url;

/// URI-template braces are not valid URL characters; tunnel them through the
/// parser as their percent-encoding and restore them afterwards.
fn brace_encode(value: &str) -> String {
    value.replace('{', "%7B").replace('}', "%7D")
}

fn brace_restore(value: String) -> String {
    value.replace("%7B", "{").replace("%7D", "}")
}

/// Join `reference` against `base` with standard URL semantics: an absolute
/// reference wins, relative paths/queries/fragments resolve against the base.
/// URI-template expressions in either part survive the join verbatim.
///
/// An empty reference means "the base itself". When the base cannot be
/// parsed the reference is returned unchanged.
pub fn resolve(base: &str, reference: &str) -> String {
    if reference.is_empty() {
        return base.to_string();
    }
    match Url::parse(&brace_encode(base)) {
        Ok(base_url) => match base_url.join(&brace_encode(reference)) {
            Ok(joined) => brace_restore(joined.to_string()),
            Err(_) => reference.to_string(),
        },
        Err(_) => reference.to_string(),
    }
}

/// Express `target` relative to `base` for output:
/// identical URL → empty string; same scheme and host → path + query
/// (+ fragment); otherwise the absolute URL unchanged.
pub fn relativize(base: &str, target: &str) -> String {
    if target == base {
        return String::new();
    }
    let (Ok(base_url), Ok(target_url)) =
        (Url::parse(&brace_encode(base)), Url::parse(&brace_encode(target)))
    else {
        return target.to_string();
    };
    if base_url == target_url {
        return String::new();
    }
    if base_url.scheme() == target_url.scheme()
        && base_url.host_str() == target_url.host_str()
        && base_url.port() == target_url.port()
    {
        let mut out = target_url.path().to_string();
        if let Some(query) = target_url.query() {
            out.push('?');
            out.push_str(query);
        }
        if let Some(fragment) = target_url.fragment() {
            out.push('#');
            out.push_str(fragment);
        }
        return brace_restore(out);
    }
    target.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_relative_path() {
        assert_eq!(
            resolve("http://example.com/api/", "pets/1"),
            "http://example.com/api/pets/1"
        );
    }

    #[test]
    fn resolve_absolute_wins() {
        assert_eq!(
            resolve("http://example.com/api/", "https://other.org/x"),
            "https://other.org/x"
        );
    }

    #[test]
    fn resolve_empty_is_base() {
        assert_eq!(resolve("http://example.com/api/", ""), "http://example.com/api/");
    }

    #[test]
    fn resolve_without_base_keeps_reference() {
        assert_eq!(resolve("", "/pets"), "/pets");
    }

    #[test]
    fn relativize_identical() {
        assert_eq!(relativize("http://example.com/a", "http://example.com/a"), "");
    }

    #[test]
    fn relativize_same_host_keeps_path_and_query() {
        assert_eq!(
            relativize("http://example.com/a", "http://example.com/b?page=2"),
            "/b?page=2"
        );
    }

    #[test]
    fn relativize_cross_host_stays_absolute() {
        assert_eq!(
            relativize("http://example.com/a", "http://other.org/b"),
            "http://other.org/b"
        );
    }

    #[test]
    fn resolve_keeps_template_expressions() {
        assert_eq!(
            resolve("http://example.com/api/", "pets/{petId}"),
            "http://example.com/api/pets/{petId}"
        );
    }

    #[test]
    fn relativize_keeps_template_expressions() {
        assert_eq!(
            relativize("http://example.com/", "http://example.com/pets/{petId}"),
            "/pets/{petId}"
        );
    }
}
