//! Static capability tables for the REST surface.
//!
//! Each object kind exposes a fixed safelist of property and method names;
//! nothing outside these tables ever reaches the bus. The tables mirror the
//! MPRIS2 interfaces and never vary per player instance; whether a given
//! player actually implements a member is discovered at call time.

use crate::mpris::ObjectKind;

/// Property and method safelist for one object kind.
#[derive(Debug, Clone, Copy)]
pub struct Descriptor {
    /// Property names readable (and candidates for writing) over REST.
    pub properties: &'static [&'static str],
    /// Method names invocable over REST.
    pub methods: &'static [&'static str],
}

impl Descriptor {
    /// Whether `name` is an invocable method.
    pub fn has_method(&self, name: &str) -> bool {
        self.methods.contains(&name)
    }
}

const ROOT: Descriptor = Descriptor {
    properties: &[
        "CanQuit",
        "Fullscreen",
        "CanSetFullscreen",
        "CanRaise",
        "HasTrackList",
        "Identity",
        "DesktopEntry",
        "SupportedUriSchemes",
        "SupportedMimeTypes",
    ],
    methods: &["Raise", "Quit"],
};

const PLAYER: Descriptor = Descriptor {
    properties: &[
        "PlaybackStatus",
        "LoopStatus",
        "Rate",
        "Shuffle",
        "Metadata",
        "Volume",
        "Position",
        "MinimumRate",
        "MaximumRate",
        "CanGoNext",
        "CanGoPrevious",
        "CanPlay",
        "CanPause",
        "CanSeek",
        "CanControl",
    ],
    methods: &[
        "Next",
        "Previous",
        "Pause",
        "PlayPause",
        "Stop",
        "Play",
        "Seek",
        "SetPosition",
        "OpenUri",
    ],
};

const TRACK_LIST: Descriptor = Descriptor {
    properties: &["Tracks", "CanEditTracks"],
    methods: &["GetTracksMetadata", "AddTrack", "RemoveTrack", "GoTo"],
};

const PLAYLISTS: Descriptor = Descriptor {
    properties: &["PlaylistCount", "Orderings", "ActivePlaylist"],
    methods: &["ActivatePlaylist", "GetPlaylists"],
};

/// Capability table for the given object kind. Pure lookup.
pub fn descriptor(kind: ObjectKind) -> Descriptor {
    match kind {
        ObjectKind::Root => ROOT,
        ObjectKind::Player => PLAYER,
        ObjectKind::TrackList => TRACK_LIST,
        ObjectKind::Playlists => PLAYLISTS,
    }
}
