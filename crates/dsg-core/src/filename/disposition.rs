//! `response-content-disposition` handling.
//!
//! S3-style links smuggle a Content-Disposition header through a query
//! parameter; when it names a file, that name wins over anything derived
//! from the download item or the URL path.

/// Extracts a disposition filename from a URL's
/// `response-content-disposition` query parameter, if both are present.
pub fn filename_from_url(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let value = parsed
        .query_pairs()
        .find(|(k, _)| k == "response-content-disposition")
        .map(|(_, v)| v.into_owned())?;
    filename_in(&value)
}

/// Extracts a filename from a Content-Disposition style value.
///
/// Accepts `filename="quoted"`, bare `filename=token`, and RFC 5987
/// `filename*=UTF-8''percent-encoded`; `filename*` wins when both appear.
pub fn filename_in(value: &str) -> Option<String> {
    let mut plain: Option<String> = None;
    let mut extended: Option<String> = None;

    for param in value.split(';') {
        let Some((name, val)) = param.split_once('=') else {
            continue;
        };
        let name = name.trim().to_ascii_lowercase();
        let val = val.trim();
        match name.as_str() {
            "filename*" => {
                let encoded = val
                    .strip_prefix("UTF-8''")
                    .or_else(|| val.strip_prefix("utf-8''"));
                if let Some(encoded) = encoded {
                    let decoded = percent_decode(encoded);
                    if !decoded.is_empty() {
                        extended = Some(decoded);
                    }
                }
            }
            "filename" => {
                let unquoted = unquote(val);
                if !unquoted.is_empty() {
                    plain = Some(unquoted);
                }
            }
            _ => {}
        }
    }

    extended.or(plain)
}

/// Strips surrounding quotes and resolves backslash escapes (quoted-pair).
fn unquote(v: &str) -> String {
    let inner = if v.len() >= 2 && v.starts_with('"') && v.ends_with('"') {
        &v[1..v.len() - 1]
    } else {
        return v.to_string();
    };
    let mut out = String::with_capacity(inner.len());
    let mut escaped = false;
    for c in inner.chars() {
        if escaped {
            out.push(c);
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else {
            out.push(c);
        }
    }
    if escaped {
        out.push('\\');
    }
    out
}

/// Percent-decodes an RFC 5987 value; invalid escapes pass through literally.
fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(h), Some(l)) = (hex(bytes[i + 1]), hex(bytes[i + 2])) {
                out.push(h << 4 | l);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
