//! Minimal URI-Template (RFC 6570) variable handling.
//!
//! Codecs only need to know *which* variables a template declares, and to
//! flatten pointer-shaped tokens into flat identifiers; expansion itself is
//! the transport's job.

/// Variable names declared by `{...}` expressions, in order of appearance.
///
/// Operator prefixes (`+ # . / ; ? &`) and value modifiers (`:n`, `*`) are
/// stripped.
pub fn variables(template: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        let expression = &rest[start + 1..start + end];
        let expression = expression.trim_start_matches(['+', '#', '.', '/', ';', '?', '&']);
        for name in expression.split(',') {
            let name = name.split(':').next().unwrap_or(name);
            let name = name.trim_end_matches('*');
            if !name.is_empty() {
                out.push(name.to_string());
            }
        }
        rest = &rest[start + end + 1..];
    }
    out
}

/// Decode `%XX` sequences; malformed sequences pass through untouched.
fn percent_decode(token: &str) -> String {
    let bytes = token.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = &token[i + 1..i + 3];
            if let Ok(byte) = u8::from_str_radix(hex, 16) {
                out.push(byte);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Flatten a pointer-shaped or bracketed variable token into one identifier.
///
/// `(#/definitions/address/properties/street)` → `address_properties_street`;
/// plain names pass through with `-` replaced by `_`.
pub fn flatten_identifier(token: &str) -> String {
    let token = percent_decode(token);
    let token = token.trim_matches(|c| c == '(' || c == ')');
    let token = token.trim_start_matches('#');
    let segments: Vec<&str> = token
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != "definitions")
        .collect();
    segments.join("_").replace('-', "_")
}
