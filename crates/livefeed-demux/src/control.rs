use std::time::Duration;

/// Runtime control queries a player may issue to a demuxer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlQuery {
    CanSeek,
    CanPause,
    CanControlPace,
    GetPosition,
    SetPosition(f64),
    GetTime,
    SetTime(Duration),
    GetLength,
    SetPauseState(bool),
}

/// Runtime capabilities advertised by a demuxer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub seek: bool,
    pub pause: bool,
    pub pace_control: bool,
}

impl Capabilities {
    /// No runtime control at all.
    pub const NONE: Self = Self {
        seek: false,
        pause: false,
        pace_control: false,
    };

    pub fn is_empty(&self) -> bool {
        *self == Self::NONE
    }
}
