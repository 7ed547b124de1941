use std::fmt::{self, Display};

/// Lifecycle of an overlay.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum OverlayStatus {
	/// No source set.
	#[default]
	Empty,
	/// A source is being opened.
	Loading,
	/// The source is open and placed on the viewport.
	Ready,
	/// The source failed fatally. Viewport events are ignored until a new
	/// source is set or the current one is reloaded.
	Error,
}

impl Display for OverlayStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			OverlayStatus::Empty => "empty",
			OverlayStatus::Loading => "loading",
			OverlayStatus::Ready => "ready",
			OverlayStatus::Error => "error",
		})
	}
}

/// Whether the composited buffer matches the current zoom.
///
/// ```text
///   Stale ──start job──▶ Composing(g) ──result g──▶ Fresh
///     ▲                      │                        │
///     └──────zoom / load─────┴────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CacheState {
	#[default]
	Stale,
	/// A job with this generation is building the buffer. Results of any
	/// other generation are discarded.
	Composing { generation: u64 },
	Fresh,
}

impl CacheState {
	pub fn is_dirty(&self) -> bool {
		!matches!(self, CacheState::Fresh)
	}

	pub fn is_composing(&self) -> bool {
		matches!(self, CacheState::Composing { .. })
	}

	/// `true` if a result of `generation` is the one being waited for.
	pub fn accepts(&self, generation: u64) -> bool {
		*self == CacheState::Composing { generation }
	}
}
