//! Pointer input handling.
//!
//! Hosts report pointer positions in their own client coordinates (window or
//! viewport pixels). [`PointerTracker`] keeps the container's bounding
//! rectangle cached so translating a position into container-local logical
//! coordinates is a subtraction, and coalesces bursts of move events so the
//! translation runs at most once per frame.
//!
//! # Flow
//!
//! ```text
//! pointer_move(client) ──► pending = client ──► (running only) request PointerSync
//! PointerSync frame   ──► take() ──► client - rect.origin ──► field pointer
//! pointer_leave()     ──► pending = None, field pointer = ABSENT
//! ```

use glam::Vec2;

/// Pointer position meaning "no pointer". Far outside any realistic
/// container, so every distance check against it fails.
pub const POINTER_ABSENT: Vec2 = Vec2::new(-99_999.0, -99_999.0);

/// Axis-aligned rectangle in host client coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }

    /// Rectangle anchored at the client origin.
    pub fn from_size(size: Vec2) -> Self {
        Self {
            origin: Vec2::ZERO,
            size,
        }
    }

    /// Translate a client position into rectangle-local coordinates.
    pub fn to_local(&self, client: Vec2) -> Vec2 {
        client - self.origin
    }
}

/// Coalesces pointer moves and translates them with a cached bounding rect.
#[derive(Debug, Default)]
pub struct PointerTracker {
    /// Latest client position not yet applied to the field.
    pending: Option<Vec2>,
    /// Container bounding rect at the last resize or bounds refresh.
    rect: Rect,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the cached bounding rect.
    pub fn cache_rect(&mut self, rect: Rect) {
        self.rect = rect;
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Record a raw move. Moves before the next sync only overwrite the
    /// pending position.
    pub fn record_move(&mut self, client: Vec2) {
        self.pending = Some(client);
    }

    /// Consume the pending position, translated to container-local
    /// coordinates.
    pub fn take(&mut self) -> Option<Vec2> {
        self.pending.take().map(|client| self.rect.to_local(client))
    }

    /// Drop any pending move. A sync frame that is still outstanding will find
    /// nothing to apply.
    pub fn clear(&mut self) {
        self.pending = None;
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}
