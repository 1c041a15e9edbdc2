//! Function-pointer finite state machine for the display UI.
//!
//! Classic embedded FSM pattern, one table row per UI state:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  StateTable                                                  │
//! │  ┌───────────┬───────────┬──────────┬──────────────────────┐ │
//! │  │ StateId   │ on_enter  │ on_exit  │ on_input             │ │
//! │  ├───────────┼───────────┼──────────┼──────────────────────┤ │
//! │  │ Home      │ fn(ctx)   │ fn(ctx)  │ fn(ctx,mode,in)->Opt │ │
//! │  │ Menu      │ fn(ctx)   │ fn(ctx)  │ fn(ctx,mode,in)->Opt │ │
//! │  │ SetTime   │ fn(ctx)   │ fn(ctx)  │ fn(ctx,mode,in)->Opt │ │
//! │  │ ViewSaved │ fn(ctx)   │ fn(ctx)  │ fn(ctx,mode,in)->Opt │ │
//! │  │ Sleeping  │ fn(ctx)   │ fn(ctx)  │ fn(ctx,mode,in)->Opt │ │
//! │  └───────────┴───────────┴──────────┴──────────────────────┘ │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every debounced button press or remote write is fed to `on_input` of the
//! **current** state.  It returns `Some(next_mode)` to move.  When the next
//! mode belongs to a different state the engine runs `on_exit`, `on_enter`
//! and raises the first-entry flag so the renderer redraws the whole screen.
//! When it belongs to the same state (menu line or saved-data cursor moved)
//! only the mode data changes.

pub mod context;
pub mod states;

use context::UiContext;
use log::info;

use crate::drivers::buttons::Button;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Enumeration of all UI states.
/// Must stay in sync with the table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StateId {
    Home = 0,
    Menu = 1,
    SetTime = 2,
    ViewSaved = 3,
    Sleeping = 4,
}

impl StateId {
    /// Total number of states, used to size the table array.
    pub const COUNT: usize = 5;

    pub const fn name(self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Menu => "Menu",
            Self::SetTime => "SetTime",
            Self::ViewSaved => "ViewSaved",
            Self::Sleeping => "Sleeping",
        }
    }
}

/// The active UI mode together with its per-state data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiMode {
    Home,
    Menu { index: usize },
    SetTime,
    ViewSaved { cursor: usize },
    Sleeping,
}

impl UiMode {
    pub const fn id(self) -> StateId {
        match self {
            Self::Home => StateId::Home,
            Self::Menu { .. } => StateId::Menu,
            Self::SetTime => StateId::SetTime,
            Self::ViewSaved { .. } => StateId::ViewSaved,
            Self::Sleeping => StateId::Sleeping,
        }
    }
}

/// What the state handlers react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiInput<'a> {
    Button(Button),
    RemoteWrite(&'a [u8]),
}

/// A change of state (not merely of mode data).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: StateId,
    pub to: StateId,
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
pub type StateActionFn = fn(&mut UiContext);

/// Signature for the input handler.
/// Returns `Some(next)` to change mode, or `None` to stay.
pub type StateInputFn = fn(&mut UiContext, UiMode, UiInput<'_>) -> Option<UiMode>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single UI state.
pub struct StateDescriptor {
    pub id: StateId,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_input: StateInputFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

pub struct Fsm {
    /// Fixed-size table indexed by `StateId as usize`.
    table: [StateDescriptor; StateId::COUNT],
    mode: UiMode,
    /// Set on every state change; cleared by the renderer.
    first_entry: bool,
}

impl Fsm {
    pub fn new(table: [StateDescriptor; StateId::COUNT], initial: UiMode) -> Self {
        Self {
            table,
            mode: initial,
            first_entry: true,
        }
    }

    /// Run the initial `on_enter`.  Call once before the first input.
    pub fn start(&mut self, ctx: &mut UiContext) {
        info!("UI starting in state: {}", self.descriptor().name);
        if let Some(enter) = self.descriptor().on_enter {
            enter(ctx);
        }
        self.first_entry = true;
    }

    /// Feed one input to the current state.
    pub fn handle(&mut self, ctx: &mut UiContext, input: UiInput<'_>) -> Option<Transition> {
        let next = (self.descriptor().on_input)(ctx, self.mode, input)?;
        self.apply(next, ctx)
    }

    /// Jump straight to `next` (power sequence, wake).
    pub fn force_transition(&mut self, next: UiMode, ctx: &mut UiContext) -> Option<Transition> {
        self.apply(next, ctx)
    }

    pub fn mode(&self) -> UiMode {
        self.mode
    }

    pub fn current_state(&self) -> StateId {
        self.mode.id()
    }

    /// Consume the first-entry flag.
    pub fn take_first_entry(&mut self) -> bool {
        core::mem::take(&mut self.first_entry)
    }

    /// Request a full redraw on the next render (after an overlay).
    pub fn mark_first_entry(&mut self) {
        self.first_entry = true;
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn descriptor(&self) -> &StateDescriptor {
        &self.table[self.mode.id() as usize]
    }

    fn apply(&mut self, next: UiMode, ctx: &mut UiContext) -> Option<Transition> {
        let from = self.mode.id();
        let to = next.id();

        if from == to {
            self.mode = next;
            return None;
        }

        info!(
            "UI transition: {} -> {}",
            self.table[from as usize].name, self.table[to as usize].name
        );

        if let Some(exit) = self.table[from as usize].on_exit {
            exit(ctx);
        }

        self.mode = next;
        self.first_entry = true;

        if let Some(enter) = self.table[to as usize].on_enter {
            enter(ctx);
        }

        Some(Transition { from, to })
    }
}
