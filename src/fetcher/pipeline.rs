use crate::fetcher::{
    client::MAX_BODY_SIZE,
    errors::FetchError,
    types::{Charset, PageResponse},
};
use bytes::Bytes;
use chrono::Utc;
use encoding_rs::Encoding;
use flate2::read::GzDecoder;
use regex::Regex;
use reqwest::{StatusCode, header::HeaderMap};
use std::io::Read;
use std::sync::LazyLock;
use url::Url;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

static CHARSET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)charset\s*=\s*["']?([^"'\s;]+)"#).unwrap());

static XML_DECL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)^\s*<\?xml\s[^>]*?encoding\s*=\s*["']([^"']+)["']"#).unwrap()
});

static META_CHARSET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<meta\s+[^>]*?charset\s*=\s*["']?([^"'\s/>]+)"#).unwrap());

pub fn process_response(
    url_final: Url,
    status: StatusCode,
    headers: HeaderMap,
    body_bytes: Bytes,
    content_type: &str,
) -> Result<PageResponse, FetchError> {
    // `sitemap.xml.gz` is usually served as a gzip file rather than with a
    // gzip Content-Encoding, so reqwest hands us the compressed bytes.
    let body_bytes = maybe_gunzip(body_bytes)?;
    let charset = detect_charset(content_type, &body_bytes);
    let body_utf8 = decode_to_utf8(&body_bytes, &charset)?;

    Ok(PageResponse {
        url_final,
        status,
        headers,
        content_type: content_type.to_string(),
        body_raw: body_bytes,
        body_utf8,
        charset,
        fetched_at: Utc::now(),
    })
}

fn maybe_gunzip(body: Bytes) -> Result<Bytes, FetchError> {
    if !body.starts_with(&GZIP_MAGIC) {
        return Ok(body);
    }

    let mut decoded = Vec::new();
    GzDecoder::new(body.as_ref())
        .take(MAX_BODY_SIZE + 1)
        .read_to_end(&mut decoded)
        .map_err(|e| FetchError::Decompress(e.to_string()))?;

    if decoded.len() as u64 > MAX_BODY_SIZE {
        return Err(FetchError::BodyTooLarge(decoded.len() as u64));
    }
    Ok(Bytes::from(decoded))
}

fn charset_from_captures(regex: &Regex, haystack: &str) -> Option<Charset> {
    let captures = regex.captures(haystack)?;
    let label = captures.get(1)?.as_str().to_lowercase();
    Encoding::for_label(label.as_bytes()).map(Charset::from_encoding)
}

fn detect_charset(content_type: &str, body_bytes: &[u8]) -> Charset {
    // 1. Byte order mark
    if let Some((encoding, _)) = Encoding::for_bom(body_bytes) {
        return Charset::from_encoding(encoding);
    }

    // 2. Content-Type header
    if let Some(charset) = charset_from_captures(&CHARSET_REGEX, content_type) {
        return charset;
    }

    // 3. XML declaration or <meta charset> in the first 4KB
    let search_bytes = &body_bytes[..body_bytes.len().min(4096)];
    let search_str = String::from_utf8_lossy(search_bytes);

    if let Some(charset) = charset_from_captures(&XML_DECL_REGEX, &search_str) {
        return charset;
    }
    if let Some(charset) = charset_from_captures(&META_CHARSET_REGEX, &search_str) {
        return charset;
    }

    // 4. Heuristic detection
    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(search_bytes, body_bytes.len() <= 4096);
    Charset::from_encoding(detector.guess(None, true))
}

fn decode_to_utf8(body_bytes: &[u8], charset: &Charset) -> Result<String, FetchError> {
    let encoding = charset.encoding();
    let (decoded, _encoding, had_errors) = encoding.decode(body_bytes);

    if had_errors {
        return Err(FetchError::Charset(format!(
            "Failed to decode content with encoding: {}",
            encoding.name()
        )));
    }

    Ok(decoded.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::{Compression, write::GzEncoder};
    use std::io::Write;

    #[test]
    fn test_detect_charset_from_content_type() {
        let charset = detect_charset("application/xml; charset=utf-8", b"<urlset></urlset>");
        assert_eq!(charset, Charset::Utf8);
    }

    #[test]
    fn test_detect_charset_from_xml_declaration() {
        let body = br#"<?xml version="1.0" encoding="windows-1252"?><urlset></urlset>"#;
        let charset = detect_charset("application/xml", body);
        assert_eq!(charset, Charset::Windows1252);
    }

    #[test]
    fn test_iso_8859_1_maps_to_windows_1252() {
        // encoding_rs treats ISO-8859-1 as its superset windows-1252
        let body = br#"<?xml version="1.0" encoding="ISO-8859-1"?><urlset></urlset>"#;
        assert_eq!(detect_charset("text/xml", body), Charset::Windows1252);
    }

    #[test]
    fn test_bom_wins_over_header() {
        let mut body = vec![0xEF, 0xBB, 0xBF];
        body.extend_from_slice(b"<urlset></urlset>");
        assert_eq!(
            detect_charset("text/xml; charset=windows-1252", &body),
            Charset::Utf8
        );
    }

    #[test]
    fn test_decode_utf8() {
        let body = "Hello, 世界!".as_bytes();
        let decoded = decode_to_utf8(body, &Charset::Utf8).unwrap();
        assert_eq!(decoded, "Hello, 世界!");
    }

    #[test]
    fn test_gunzip_compressed_body() {
        let xml = "<urlset><url><loc>https://example.com/</loc></url></urlset>";
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(xml.as_bytes()).unwrap();
        let compressed = Bytes::from(encoder.finish().unwrap());

        let decoded = maybe_gunzip(compressed).unwrap();
        assert_eq!(decoded.as_ref(), xml.as_bytes());
    }

    #[test]
    fn test_plain_body_passes_through() {
        let body = Bytes::from_static(b"<urlset/>");
        assert_eq!(maybe_gunzip(body.clone()).unwrap(), body);
    }

    #[test]
    fn test_truncated_gzip_is_an_error() {
        let body = Bytes::from_static(&[0x1f, 0x8b, 0x08, 0x00]);
        assert!(matches!(maybe_gunzip(body), Err(FetchError::Decompress(_))));
    }
}
