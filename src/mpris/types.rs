use std::fmt;

/// Unique identifier for a media player on the session bus.
///
/// Players are addressed by the unique connection name owning one of the
/// `org.mpris.MediaPlayer2.*` well-known names, for example `:1.42`. The id
/// is opaque everywhere outside the bus binding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlayerId(String);

impl PlayerId {
    /// Create a `PlayerId` from a D-Bus bus name.
    pub fn from_bus_name(bus_name: &str) -> Self {
        Self(bus_name.to_string())
    }

    /// Get the D-Bus bus name.
    pub fn bus_name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The four remote-object families every MPRIS2 player can expose.
///
/// All four live on the same object (path `/org/mpris/MediaPlayer2`); each
/// kind selects one interface on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// Application-level interface (`org.mpris.MediaPlayer2`).
    Root,
    /// Playback control (`org.mpris.MediaPlayer2.Player`).
    Player,
    /// Track list access (`org.mpris.MediaPlayer2.TrackList`).
    TrackList,
    /// Playlist access (`org.mpris.MediaPlayer2.Playlists`).
    Playlists,
}

impl ObjectKind {
    /// D-Bus interface name for this kind.
    pub fn interface(self) -> &'static str {
        match self {
            Self::Root => "org.mpris.MediaPlayer2",
            Self::Player => "org.mpris.MediaPlayer2.Player",
            Self::TrackList => "org.mpris.MediaPlayer2.TrackList",
            Self::Playlists => "org.mpris.MediaPlayer2.Playlists",
        }
    }

    /// Parse the URL path segment naming a kind.
    ///
    /// Matching is case-sensitive.
    pub fn from_path_segment(segment: &str) -> Option<Self> {
        match segment {
            "Root" => Some(Self::Root),
            "Player" => Some(Self::Player),
            "TrackList" => Some(Self::TrackList),
            "Playlists" => Some(Self::Playlists),
            _ => None,
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Root => "Root",
            Self::Player => "Player",
            Self::TrackList => "TrackList",
            Self::Playlists => "Playlists",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_segments_round_trip() {
        for kind in [
            ObjectKind::Root,
            ObjectKind::Player,
            ObjectKind::TrackList,
            ObjectKind::Playlists,
        ] {
            assert_eq!(
                ObjectKind::from_path_segment(&kind.to_string()),
                Some(kind)
            );
        }
    }

    #[test]
    fn path_segment_matching_is_case_sensitive() {
        assert_eq!(ObjectKind::from_path_segment("player"), None);
        assert_eq!(ObjectKind::from_path_segment("tracklist"), None);
        assert_eq!(ObjectKind::from_path_segment(""), None);
    }

    #[test]
    fn interfaces_share_the_mpris_namespace() {
        assert_eq!(ObjectKind::Root.interface(), "org.mpris.MediaPlayer2");
        assert!(
            ObjectKind::Playlists
                .interface()
                .starts_with("org.mpris.MediaPlayer2.")
        );
    }
}
