//! Filename resolution for staged audio.
//!
//! The extension of the resolved name decides whether the audio is
//! transcoded, so a URL like `.../clip.flac?token=abc` must resolve to
//! `clip.flac`, not `clip.flac?token=abc`.

use runscribe_core::job::DEFAULT_FILENAME;
use runscribe_core::JobRequest;

/// The name the staged file gets.
///
/// An explicit filename wins. Without one (or with the `audio.bin`
/// placeholder) a URL-sourced job derives it from the URL's last path
/// segment. Everything else gets the placeholder.
pub fn resolve_filename(request: &JobRequest) -> String {
    if let Some(name) = request.explicit_filename() {
        return sanitize_filename(name).unwrap_or_else(|| DEFAULT_FILENAME.to_string());
    }

    let url_source = if request.payload().is_none() { request.url() } else { None };
    url_source
        .and_then(filename_from_url)
        .unwrap_or_else(|| DEFAULT_FILENAME.to_string())
}

/// Last non-empty path segment of `url`, percent-decoded, without query or
/// fragment. `None` when there is no usable segment.
pub fn filename_from_url(url: &str) -> Option<String> {
    let segment = match url::Url::parse(url) {
        Ok(parsed) => parsed
            .path_segments()?
            .filter(|s| !s.is_empty())
            .last()?
            .to_string(),
        Err(_) => {
            let end = url.find(['?', '#']).unwrap_or(url.len());
            url[..end].rsplit('/').find(|s| !s.is_empty())?.to_string()
        }
    };

    let decoded = urlencoding::decode(&segment)
        .map(|s| s.into_owned())
        .unwrap_or(segment);
    sanitize_filename(&decoded)
}

/// Reduce a name to its final path component so it can be joined under the
/// staging directory. Rejects empty, `.` and `..`.
pub fn sanitize_filename(name: &str) -> Option<String> {
    let last = name.rsplit(['/', '\\']).next().unwrap_or(name).trim();
    match last {
        "" | "." | ".." => None,
        s if s.contains('\0') => None,
        s => Some(s.to_string()),
    }
}
