use bytes::Bytes;

/// Per-unit flags passed through to the sink untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct UnitFlags(u32);

impl UnitFlags {
    pub const NONE: Self = Self(0);
    /// Unit starts a decodable sequence.
    pub const KEYFRAME: Self = Self(1 << 0);
    /// Timing does not follow from the previous unit.
    pub const DISCONTINUITY: Self = Self(1 << 1);
    /// Payload is known to be damaged.
    pub const CORRUPTED: Self = Self(1 << 2);

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }
}

impl std::ops::BitOr for UnitFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// A decodable unit forwarded to the sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    /// Unit bytes; configuration data, if any, comes first.
    pub payload: Bytes,
    /// Presentation timestamp.
    pub pts: Option<u64>,
    /// Decode timestamp. The wire format carries none.
    pub dts: Option<u64>,
    pub flags: UnitFlags,
}

impl Unit {
    /// Unit with a presentation timestamp only.
    pub fn new(pts: Option<u64>, payload: impl Into<Bytes>) -> Self {
        Self {
            payload: payload.into(),
            pts,
            dts: None,
            flags: UnitFlags::NONE,
        }
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}
