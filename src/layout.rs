use eframe::egui::{pos2, vec2, Rect};

/// Grid geometry shared by every breakpoint.
pub const COLUMNS: u32 = 12;
pub const ROW_HEIGHT: f32 = 30.0;
pub const MARGIN: f32 = 12.0;
pub const PADDING: f32 = 12.0;

// ---------------------------------------------------------------------------
// Panels and breakpoints
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelId {
    Analyzers,
    Visualization,
    Options,
    Results,
}

impl PanelId {
    pub const ALL: [PanelId; 4] = [
        Self::Analyzers,
        Self::Visualization,
        Self::Options,
        Self::Results,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Self::Analyzers => "Available analyses",
            Self::Visualization => "Data preview",
            Self::Options => "Analysis parameters",
            Self::Results => "Analysis results",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Breakpoint {
    Lg,
    Md,
    Sm,
    Xs,
}

impl Breakpoint {
    /// Largest first.
    pub const ALL: [Breakpoint; 4] = [Self::Lg, Self::Md, Self::Sm, Self::Xs];

    pub fn min_width(self) -> f32 {
        match self {
            Self::Lg => 1200.0,
            Self::Md => 996.0,
            Self::Sm => 768.0,
            Self::Xs => 480.0,
        }
    }

    /// Widest breakpoint that fits; anything narrower than `Xs` still uses `Xs`.
    pub fn for_width(width: f32) -> Self {
        Self::ALL
            .into_iter()
            .find(|bp| width >= bp.min_width())
            .unwrap_or(Self::Xs)
    }

    fn index(self) -> usize {
        self as usize
    }
}

// ---------------------------------------------------------------------------
// Grid slots
// ---------------------------------------------------------------------------

/// Position and size of one panel in grid units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSlot {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
    pub min_w: u32,
    pub min_h: u32,
    pub max_h: u32,
}

const fn slot(x: u32, y: u32, w: u32, h: u32, min_w: u32) -> GridSlot {
    GridSlot {
        x,
        y,
        w,
        h,
        min_w,
        min_h: 6,
        max_h: 24,
    }
}

fn column_width(container_width: f32) -> f32 {
    let cols = COLUMNS as f32;
    ((container_width - MARGIN * (cols - 1.0) - PADDING * 2.0) / cols).max(1.0)
}

impl GridSlot {
    /// Screen rectangle of this slot inside `area`.
    pub fn to_rect(&self, area: Rect) -> Rect {
        let cw = column_width(area.width());
        let left = area.min.x + PADDING + self.x as f32 * (cw + MARGIN);
        let top = area.min.y + PADDING + self.y as f32 * (ROW_HEIGHT + MARGIN);
        let width = self.w as f32 * cw + (self.w.saturating_sub(1)) as f32 * MARGIN;
        let height = self.h as f32 * ROW_HEIGHT + (self.h.saturating_sub(1)) as f32 * MARGIN;
        Rect::from_min_size(pos2(left, top), vec2(width, height))
    }

    /// Snap a screen rectangle back onto the grid, keeping this slot's limits.
    pub fn snapped(&self, rect: Rect, area: Rect) -> GridSlot {
        let cw = column_width(area.width());
        let units = |px: f32, cell: f32| (px / (cell + MARGIN)).round().max(0.0) as u32;

        let w = units(rect.width() + MARGIN, cw).clamp(self.min_w, COLUMNS);
        let h = units(rect.height() + MARGIN, ROW_HEIGHT).clamp(self.min_h, self.max_h);
        let x = units(rect.min.x - area.min.x - PADDING, cw).min(COLUMNS - w);
        let y = units(rect.min.y - area.min.y - PADDING, ROW_HEIGHT);

        GridSlot { x, y, w, h, ..*self }
    }
}

// ---------------------------------------------------------------------------
// Dashboard layout
// ---------------------------------------------------------------------------

/// Per-breakpoint panel placement plus the lock flag.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardLayout {
    slots: [[GridSlot; 4]; 4],
    locked: bool,
}

impl Default for DashboardLayout {
    fn default() -> Self {
        // Panel order: analyzers, visualization, options, results.
        Self {
            slots: [
                [slot(0, 0, 3, 12, 2), slot(3, 0, 6, 12, 3), slot(9, 0, 3, 12, 2), slot(0, 12, 12, 12, 6)],
                [slot(0, 0, 4, 12, 2), slot(4, 0, 8, 12, 3), slot(0, 12, 4, 12, 2), slot(4, 12, 8, 12, 6)],
                [slot(0, 0, 6, 12, 2), slot(6, 0, 6, 12, 3), slot(0, 12, 6, 12, 2), slot(6, 12, 6, 12, 4)],
                [slot(0, 0, 12, 12, 2), slot(0, 12, 12, 12, 3), slot(0, 24, 12, 12, 2), slot(0, 36, 12, 12, 4)],
            ],
            locked: false,
        }
    }
}

impl DashboardLayout {
    pub fn slot(&self, bp: Breakpoint, panel: PanelId) -> GridSlot {
        self.slots[bp.index()][panel.index()]
    }

    pub fn rect_for(&self, bp: Breakpoint, panel: PanelId, area: Rect) -> Rect {
        self.slot(bp, panel).to_rect(area)
    }

    /// Record a dragged/resized panel. Ignored while locked; returns whether
    /// the stored slot changed.
    pub fn move_panel(&mut self, bp: Breakpoint, panel: PanelId, rect: Rect, area: Rect) -> bool {
        if self.locked {
            return false;
        }
        let current = self.slot(bp, panel);
        let snapped = current.snapped(rect, area);
        if snapped == current {
            return false;
        }
        log::debug!("{panel:?} moved to {snapped:?} at {bp:?}");
        self.slots[bp.index()][panel.index()] = snapped;
        true
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn toggle_lock(&mut self) {
        self.locked = !self.locked;
    }
}

// ---------------------------------------------------------------------------
// Window tracking
// ---------------------------------------------------------------------------

/// Follows one panel window across frames. A window's outer rect includes its
/// title bar and frame, so it is never snapped directly; only the change made
/// by a finished drag or resize is carried over to the slot.
#[derive(Debug, Clone, Default)]
pub struct WindowTracker {
    placed: Option<Rect>,
    settled: Option<Rect>,
    pressed: bool,
}

impl WindowTracker {
    /// Whether the window has to be forced onto `slot_rect` this frame.
    pub fn needs_placement(&self, slot_rect: Rect) -> bool {
        self.placed != Some(slot_rect)
    }

    /// The window was forced onto `slot_rect`; any gesture in progress is dropped.
    pub fn place(&mut self, slot_rect: Rect) {
        self.placed = Some(slot_rect);
        self.settled = None;
        self.pressed = false;
    }

    /// Feed the window's outer rect after it was shown. Once the pointer is
    /// released after moving or resizing the window, returns `slot_rect`
    /// shifted and resized by the same amount, ready to be snapped.
    pub fn observe(&mut self, slot_rect: Rect, outer: Rect, pointer_down: bool) -> Option<Rect> {
        if pointer_down {
            self.pressed = true;
            return None;
        }
        let released = std::mem::take(&mut self.pressed);
        let before = self.settled.replace(outer).filter(|_| released)?;
        if !differs(before, outer) {
            return None;
        }
        // Re-place next frame so the window lands on the snapped slot.
        self.placed = None;
        Some(Rect::from_min_size(
            slot_rect.min + (outer.min - before.min),
            slot_rect.size() + (outer.size() - before.size()),
        ))
    }
}

fn differs(a: Rect, b: Rect) -> bool {
    (a.min - b.min).length() > 0.5 || (a.size() - b.size()).length() > 0.5
}
