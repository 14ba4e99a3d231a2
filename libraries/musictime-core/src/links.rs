//! Spotify share links

const OPEN_SPOTIFY_URL: &str = "https://open.spotify.com";

/// Strip a `spotify:<kind>:` URI prefix, leaving the bare id.
///
/// `spotify:user:abc:playlist:xyz` yields `xyz`; plain ids pass through.
pub fn spotify_id_from_uri(uri: &str) -> &str {
    if uri.starts_with("spotify:") {
        uri.rsplit(':').next().unwrap_or(uri)
    } else {
        uri
    }
}

/// Public link for a track or playlist
pub fn build_spotify_link(id: &str, is_playlist: bool) -> String {
    let kind = if is_playlist { "playlist" } else { "track" };
    format!("{}/{}/{}", OPEN_SPOTIFY_URL, kind, spotify_id_from_uri(id))
}

/// Full track URI for a bare id, leaving URIs untouched
pub fn spotify_track_uri(id: &str) -> String {
    if id.starts_with("spotify:") {
        id.to_string()
    } else {
        format!("spotify:track:{}", id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_uri_prefixes() {
        assert_eq!(spotify_id_from_uri("spotify:track:7fa9MBXhVfQ8P8Df9OEbD8"), "7fa9MBXhVfQ8P8Df9OEbD8");
        assert_eq!(spotify_id_from_uri("spotify:user:abc:playlist:xyz"), "xyz");
        assert_eq!(spotify_id_from_uri("0mwG8hCL4scWi8Nkt7jyoV"), "0mwG8hCL4scWi8Nkt7jyoV");
    }

    #[test]
    fn builds_track_and_playlist_links() {
        assert_eq!(
            build_spotify_link("spotify:track:7fa9MBXhVfQ8P8Df9OEbD8", false),
            "https://open.spotify.com/track/7fa9MBXhVfQ8P8Df9OEbD8"
        );
        assert_eq!(
            build_spotify_link("0mwG8hCL4scWi8Nkt7jyoV", true),
            "https://open.spotify.com/playlist/0mwG8hCL4scWi8Nkt7jyoV"
        );
    }

    #[test]
    fn track_uri_is_idempotent() {
        assert_eq!(spotify_track_uri("abc"), "spotify:track:abc");
        assert_eq!(spotify_track_uri("spotify:track:abc"), "spotify:track:abc");
    }
}
