//! L3 Molecular Layer: Swipe-to-reveal rows
//!
//! Each [`SwipeRow`] turns a pointer down/move/up sequence into a horizontal
//! offset and a committed open/closed state. [`SwipeList`] owns the rows of a
//! list and routes captured pointers: once a drag begins, every later event
//! for that pointer goes to the same row, wherever the pointer travels.
//!
//! Rows are independent; several may be open at once.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::config::SwipeConfig;

/// Kind of device that produced a pointer event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerType {
    Mouse,
    Touch,
    Pen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Down,
    Move,
    Up,
    Cancel,
    /// Pointer left the element; handled like `Cancel`
    Leave,
}

impl PointerKind {
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, PointerKind::Up | PointerKind::Cancel | PointerKind::Leave)
    }
}

/// Raw pointer event
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub pointer_id: u32,
    pub pointer_type: PointerType,
    /// 0 is the primary button
    pub button: i16,
    pub client_x: f64,
}

impl PointerEvent {
    pub fn new(kind: PointerKind, pointer_id: u32, client_x: f64) -> Self {
        Self {
            kind,
            pointer_id,
            pointer_type: PointerType::Mouse,
            button: 0,
            client_x,
        }
    }

    pub fn down(pointer_id: u32, client_x: f64) -> Self {
        Self::new(PointerKind::Down, pointer_id, client_x)
    }

    pub fn moved(pointer_id: u32, client_x: f64) -> Self {
        Self::new(PointerKind::Move, pointer_id, client_x)
    }

    pub fn up(pointer_id: u32, client_x: f64) -> Self {
        Self::new(PointerKind::Up, pointer_id, client_x)
    }

    pub fn cancel(pointer_id: u32, client_x: f64) -> Self {
        Self::new(PointerKind::Cancel, pointer_id, client_x)
    }

    pub fn with_type(mut self, pointer_type: PointerType) -> Self {
        self.pointer_type = pointer_type;
        self
    }

    pub fn with_button(mut self, button: i16) -> Self {
        self.button = button;
        self
    }
}

impl SwipeConfig {
    /// Offset at or beyond which the rail shows as provisionally open
    #[inline]
    pub fn preview_threshold(&self) -> f64 {
        -self.max_offset * self.preview_ratio
    }

    /// Offset at or beyond which a release commits to open
    #[inline]
    pub fn commit_threshold(&self) -> f64 {
        -self.max_offset * self.commit_ratio
    }
}

/// Attributes whose change invalidates an open rail
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RowIdentity {
    pub id: i64,
    pub disabled: bool,
    pub category_id: Option<i64>,
}

impl RowIdentity {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            disabled: false,
            category_id: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipePhase {
    Idle,
    Dragging,
    SettledOpen,
    SettledClosed,
}

/// Snapshot for rendering
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwipeRowState {
    /// In `[-max_offset, 0]`
    pub offset_px: f64,
    pub open: bool,
    pub dragging: bool,
}

/// Committed result of a gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeOutcome {
    Opened,
    Closed,
}

/// Actions behind the rail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    Edit,
    Move,
    Disable,
    Delete,
}

/// Action invoked on a specific row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowCommand {
    pub row_id: i64,
    pub action: RowAction,
}

#[derive(Debug, Clone, Copy)]
struct Drag {
    pointer_id: u32,
    start_x: f64,
    base_offset: f64,
}

#[derive(Debug, Clone)]
pub struct SwipeRow {
    config: SwipeConfig,
    identity: RowIdentity,
    offset: f64,
    open: bool,
    drag: Option<Drag>,
    phase: SwipePhase,
}

impl SwipeRow {
    pub fn new(identity: RowIdentity, config: SwipeConfig) -> Self {
        Self {
            config,
            identity,
            offset: 0.0,
            open: false,
            drag: None,
            phase: SwipePhase::Idle,
        }
    }

    pub fn id(&self) -> i64 {
        self.identity.id
    }

    pub fn identity(&self) -> &RowIdentity {
        &self.identity
    }

    /// Feed one event; returns the committed outcome on release
    ///
    /// Events that don't pair with the current drag are ignored.
    pub fn handle(&mut self, event: &PointerEvent) -> Option<SwipeOutcome> {
        match event.kind {
            PointerKind::Down => {
                self.pointer_down(event);
                None
            }
            PointerKind::Move => {
                self.pointer_move(event);
                None
            }
            PointerKind::Up | PointerKind::Cancel | PointerKind::Leave => self.pointer_release(event),
        }
    }

    /// Start a drag; returns false when the event is not accepted
    pub fn pointer_down(&mut self, event: &PointerEvent) -> bool {
        if event.pointer_type == PointerType::Mouse && event.button != 0 {
            return false;
        }
        if self.drag.is_some() {
            return false;
        }
        self.drag = Some(Drag {
            pointer_id: event.pointer_id,
            start_x: event.client_x,
            base_offset: self.offset,
        });
        self.phase = SwipePhase::Dragging;
        trace!(row = self.identity.id, x = event.client_x, "Drag started");
        true
    }

    fn pointer_move(&mut self, event: &PointerEvent) {
        let Some(drag) = self.drag else {
            return;
        };
        if drag.pointer_id != event.pointer_id {
            return;
        }
        let delta = event.client_x - drag.start_x;
        self.offset = self.clamp(drag.base_offset + delta);
        self.open = self.offset <= self.config.preview_threshold();
    }

    fn pointer_release(&mut self, event: &PointerEvent) -> Option<SwipeOutcome> {
        let drag = self.drag?;
        if drag.pointer_id != event.pointer_id {
            return None;
        }
        self.drag = None;
        self.open = self.offset <= self.config.commit_threshold();
        self.offset = if self.open { -self.config.max_offset } else { 0.0 };
        self.phase = if self.open {
            SwipePhase::SettledOpen
        } else {
            SwipePhase::SettledClosed
        };
        debug!(row = self.identity.id, open = self.open, "Swipe committed");
        Some(if self.open {
            SwipeOutcome::Opened
        } else {
            SwipeOutcome::Closed
        })
    }

    fn clamp(&self, value: f64) -> f64 {
        let max = self.config.max_offset.max(0.0);
        value.clamp(-max, 0.0)
    }

    /// Apply fresh attributes from the data layer
    ///
    /// Any change to the identity forces the row closed. Returns whether a
    /// reset happened.
    pub fn sync(&mut self, identity: RowIdentity) -> bool {
        if identity == self.identity {
            return false;
        }
        self.identity = identity;
        self.reset();
        true
    }

    /// Force the row closed, abandoning any drag
    pub fn reset(&mut self) {
        self.offset = 0.0;
        self.open = false;
        self.drag = None;
        self.phase = SwipePhase::SettledClosed;
    }

    pub fn close(&mut self) {
        if self.drag.is_none() {
            self.reset();
        }
    }

    /// Settle open or closed without a gesture; ignored mid-drag
    pub fn settle(&mut self, open: bool) -> bool {
        if self.drag.is_some() {
            return false;
        }
        self.open = open;
        self.offset = if open { -self.config.max_offset.max(0.0) } else { 0.0 };
        self.phase = if open {
            SwipePhase::SettledOpen
        } else {
            SwipePhase::SettledClosed
        };
        true
    }

    /// Invoke a rail action; the row closes before the command is handed out
    ///
    /// Returns `None` while the rail is hidden.
    pub fn trigger(&mut self, action: RowAction) -> Option<RowCommand> {
        if !self.actions_visible() {
            return None;
        }
        self.reset();
        Some(RowCommand {
            row_id: self.identity.id,
            action,
        })
    }

    pub fn state(&self) -> SwipeRowState {
        SwipeRowState {
            offset_px: self.offset,
            open: self.open,
            dragging: self.drag.is_some(),
        }
    }

    pub fn phase(&self) -> SwipePhase {
        self.phase
    }

    #[inline]
    pub fn offset(&self) -> f64 {
        self.offset
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.open
    }

    #[inline]
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Whether any part of the action rail is exposed
    #[inline]
    pub fn actions_visible(&self) -> bool {
        self.open || self.offset < 0.0
    }

    pub fn captured_pointer(&self) -> Option<u32> {
        self.drag.map(|d| d.pointer_id)
    }

    /// Revealed fraction of the rail in [0, 1]
    pub fn reveal(&self) -> f64 {
        if self.config.max_offset <= 0.0 {
            return 0.0;
        }
        (-self.offset / self.config.max_offset).clamp(0.0, 1.0)
    }
}

/// Binding of a pointer to the row where its drag began
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerCapture {
    pub pointer_id: u32,
    pub row_id: i64,
}

/// Rows of one list plus pointer routing
#[derive(Debug, Clone, Default)]
pub struct SwipeList {
    config: SwipeConfig,
    rows: Vec<SwipeRow>,
    captures: HashMap<u32, PointerCapture>,
}

impl SwipeList {
    pub fn new(config: SwipeConfig) -> Self {
        Self {
            config,
            rows: Vec::new(),
            captures: HashMap::new(),
        }
    }

    /// Replace the row set, keeping state for rows that survive
    ///
    /// Rows whose attributes changed are reset, and their captures released.
    /// Rows that disappeared release their captures too.
    pub fn sync<I>(&mut self, identities: I)
    where
        I: IntoIterator<Item = RowIdentity>,
    {
        let mut previous: HashMap<i64, SwipeRow> =
            self.rows.drain(..).map(|row| (row.id(), row)).collect();

        for identity in identities {
            let row = match previous.remove(&identity.id) {
                Some(mut row) => {
                    if row.sync(identity) {
                        debug!(row = row.id(), "Row attributes changed, closing rail");
                    }
                    row
                }
                None => SwipeRow::new(identity, self.config.clone()),
            };
            self.rows.push(row);
        }

        let live: Vec<(i64, bool)> = self.rows.iter().map(|r| (r.id(), r.is_dragging())).collect();
        self.captures.retain(|_, capture| {
            live.iter()
                .any(|(id, dragging)| *id == capture.row_id && *dragging)
        });
    }

    /// Route an event
    ///
    /// `hit` is the row under the pointer; it only matters for `Down`. Later
    /// events follow the capture taken on `Down`. Returns the committed
    /// outcome and the row it belongs to.
    pub fn dispatch(&mut self, event: &PointerEvent, hit: Option<i64>) -> Option<(i64, SwipeOutcome)> {
        match event.kind {
            PointerKind::Down => {
                if self.captures.contains_key(&event.pointer_id) {
                    return None;
                }
                let row_id = hit?;
                let row = self.rows.iter_mut().find(|r| r.id() == row_id)?;
                if row.pointer_down(event) {
                    self.captures.insert(
                        event.pointer_id,
                        PointerCapture {
                            pointer_id: event.pointer_id,
                            row_id,
                        },
                    );
                }
                None
            }
            PointerKind::Move => {
                let capture = self.captures.get(&event.pointer_id)?;
                let row_id = capture.row_id;
                if let Some(row) = self.rows.iter_mut().find(|r| r.id() == row_id) {
                    row.handle(event);
                }
                None
            }
            PointerKind::Up | PointerKind::Cancel | PointerKind::Leave => {
                let capture = self.captures.remove(&event.pointer_id)?;
                trace!(pointer = capture.pointer_id, row = capture.row_id, "Released pointer capture");
                let row = self.rows.iter_mut().find(|r| r.id() == capture.row_id)?;
                row.handle(event).map(|outcome| (capture.row_id, outcome))
            }
        }
    }

    /// Invoke a rail action on a row
    pub fn trigger(&mut self, row_id: i64, action: RowAction) -> Option<RowCommand> {
        self.rows
            .iter_mut()
            .find(|r| r.id() == row_id)?
            .trigger(action)
    }

    /// Keyboard counterpart of a swipe
    pub fn settle(&mut self, row_id: i64, open: bool) -> bool {
        self.rows
            .iter_mut()
            .find(|r| r.id() == row_id)
            .map(|row| row.settle(open))
            .unwrap_or(false)
    }

    /// Close every rail and drop all captures
    pub fn reset_all(&mut self) {
        self.captures.clear();
        for row in &mut self.rows {
            row.reset();
        }
    }

    pub fn row(&self, row_id: i64) -> Option<&SwipeRow> {
        self.rows.iter().find(|r| r.id() == row_id)
    }

    pub fn row_mut(&mut self, row_id: i64) -> Option<&mut SwipeRow> {
        self.rows.iter_mut().find(|r| r.id() == row_id)
    }

    pub fn rows(&self) -> &[SwipeRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn captured_row(&self, pointer_id: u32) -> Option<i64> {
        self.captures.get(&pointer_id).map(|c| c.row_id)
    }

    pub fn capture_count(&self) -> usize {
        self.captures.len()
    }

    pub fn is_dragging(&self) -> bool {
        !self.captures.is_empty()
    }
}
