use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

use crate::StreamType;

lazy_static! {
    /// Matches an existing URL scheme, or the empty start of a
    /// scheme-less URL
    static ref URL_SCHEME_REGEX: Regex =
        Regex::new(r"^([a-zA-Z][a-zA-Z0-9+.-]*://)?").expect("scheme regex is valid");
}

/// Parses a possibly scheme-less URL the way a browser address bar would
fn normalized(stream_url: &str) -> Option<Url> {
    let stream_url = stream_url.trim();

    if stream_url.is_empty() {
        return None;
    }

    let with_scheme = URL_SCHEME_REGEX.replace(stream_url, "https://");

    Url::parse(&with_scheme).ok()
}

/// Classifies a stream URL the way the player grid will treat it.
/// Unparseable or empty URLs fall through to a plain embed.
pub fn detect_stream_type(stream_url: &str) -> StreamType {
    if youtube_video_id(stream_url).is_some() {
        return StreamType::Youtube;
    }

    let is_manifest = normalized(stream_url)
        .map(|url| url.path().to_ascii_lowercase().ends_with(".m3u8"))
        .unwrap_or(false);

    if is_manifest {
        StreamType::Hls
    } else {
        StreamType::Embed
    }
}

/// Extracts the video id from the supported YouTube URL shapes
pub fn youtube_video_id(stream_url: &str) -> Option<String> {
    let url = normalized(stream_url)?;
    let host = url.host_str()?;

    if host.ends_with("youtube.com") {
        // Test /watch?v=...
        if url.path().starts_with("/watch") {
            return url
                .query_pairs()
                .find(|(key, value)| key == "v" && !value.is_empty())
                .map(|(_, value)| value.into_owned());
        }

        // Test /live/..., /embed/..., and /v/...
        for prefix in ["/live/", "/embed/", "/v/"] {
            if let Some(id) = url.path().strip_prefix(prefix) {
                let id = id.trim_end_matches('/');

                if !id.is_empty() {
                    return Some(id.to_string());
                }
            }
        }

        return None;
    }

    // Test youtu.be/...
    if host == "youtu.be" {
        return url
            .path()
            .strip_prefix('/')
            .map(|id| id.trim_end_matches('/'))
            .filter(|id| !id.is_empty())
            .map(|id| id.to_string());
    }

    None
}

/// The canonical embed URL for a YouTube stream, if one can be derived
pub fn youtube_embed_url(stream_url: &str) -> Option<String> {
    youtube_video_id(stream_url).map(|id| format!("https://www.youtube.com/embed/{id}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_youtube_detection() {
        assert_eq!(
            detect_stream_type("https://www.youtube.com/watch?v=z09GolEktUw"),
            StreamType::Youtube
        );
        assert_eq!(
            detect_stream_type("www.youtube.com/watch?v=z09GolEktUw&feature=youtu.be"),
            StreamType::Youtube
        );
        assert_eq!(
            detect_stream_type("https://youtube.com/live/jfKfPfyJRdk"),
            StreamType::Youtube
        );
        assert_eq!(detect_stream_type("youtu.be/z09GolEktUw"), StreamType::Youtube);

        assert_ne!(
            detect_stream_type("https://www.youtube.com/"),
            StreamType::Youtube
        );
        assert_ne!(
            detect_stream_type("https://www.youtube.com/@SomeChannel"),
            StreamType::Youtube
        );
    }

    #[test]
    fn test_hls_detection() {
        assert_eq!(
            detect_stream_type("https://cdn.example.com/live/stream.m3u8"),
            StreamType::Hls
        );
        assert_eq!(
            detect_stream_type("cdn.example.com/live/STREAM.M3U8"),
            StreamType::Hls
        );
        assert_eq!(
            detect_stream_type("https://cdn.example.com/live/stream.m3u8?token=abc"),
            StreamType::Hls
        );
    }

    #[test]
    fn test_everything_else_is_an_embed() {
        assert_eq!(
            detect_stream_type("https://player.twitch.tv/?channel=somebody"),
            StreamType::Embed
        );
        assert_eq!(detect_stream_type(""), StreamType::Embed);
        assert_eq!(detect_stream_type("not a url at all"), StreamType::Embed);
    }

    #[test]
    fn test_video_id_extraction() {
        assert_eq!(
            youtube_video_id("https://www.youtube.com/watch?v=z09GolEktUw").as_deref(),
            Some("z09GolEktUw")
        );
        assert_eq!(
            youtube_video_id("https://youtube.com/live/jfKfPfyJRdk/").as_deref(),
            Some("jfKfPfyJRdk")
        );
        assert_eq!(
            youtube_video_id("youtu.be/z09GolEktUw").as_deref(),
            Some("z09GolEktUw")
        );
        assert_eq!(youtube_video_id("https://youtu.be/"), None);
        assert_eq!(youtube_video_id("https://www.youtube.com/watch"), None);
    }

    #[test]
    fn test_embed_url() {
        assert_eq!(
            youtube_embed_url("youtu.be/z09GolEktUw").as_deref(),
            Some("https://www.youtube.com/embed/z09GolEktUw")
        );
        assert_eq!(youtube_embed_url("https://cdn.example.com/a.m3u8"), None);
    }
}
