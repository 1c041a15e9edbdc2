//! Concrete UI state handlers and table builder.
//!
//! Each state is three plain `fn` pointers, no closures and no heap.
//!
//! ```text
//!            menu                 select(View Data)
//!  HOME ◀──────────▶ MENU ─────────────────────────▶ VIEW SAVED
//!   ▲ ▲               │ │ up/down: index ± 1 mod N     │ up/down: cursor ± 1
//!   │ │  select(Back) │ │                              │
//!   │ └───────────────┘ │ select(Set Time)     menu    │
//!   │  select(Clear)    ▼                              │
//!   └──── write ──── SET TIME                          │
//!   └──────────────────────────────────────────────────┘
//!
//!  Any state ──[power]──▶ SLEEPING ──[wake]──▶ HOME
//! ```
//!
//! Power presses never reach these handlers; the application service runs
//! the sleep sequence and forces the transitions itself.

use log::info;

use super::context::{MenuItem, UiContext};
use super::{StateDescriptor, StateId, UiInput, UiMode};
use crate::config::MAX_DATA;
use crate::drivers::buttons::Button;

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0: Home
        StateDescriptor {
            id: StateId::Home,
            name: "Home",
            on_enter: None,
            on_exit: None,
            on_input: home_input,
        },
        // Index 1: Menu
        StateDescriptor {
            id: StateId::Menu,
            name: "Menu",
            on_enter: None,
            on_exit: None,
            on_input: menu_input,
        },
        // Index 2: SetTime
        StateDescriptor {
            id: StateId::SetTime,
            name: "SetTime",
            on_enter: Some(set_time_enter),
            on_exit: None,
            on_input: set_time_input,
        },
        // Index 3: ViewSaved
        StateDescriptor {
            id: StateId::ViewSaved,
            name: "ViewSaved",
            on_enter: Some(view_saved_enter),
            on_exit: None,
            on_input: view_saved_input,
        },
        // Index 4: Sleeping
        StateDescriptor {
            id: StateId::Sleeping,
            name: "Sleeping",
            on_enter: Some(sleeping_enter),
            on_exit: Some(sleeping_exit),
            on_input: sleeping_input,
        },
    ]
}

/// Step forward on up, backward on down, wrapping at `len`.
fn step(pos: usize, len: usize, button: Button) -> usize {
    match button {
        Button::Up => (pos + 1) % len,
        Button::Down => (pos + len - 1) % len,
        _ => pos,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  HOME
// ═══════════════════════════════════════════════════════════════════════════

fn home_input(ctx: &mut UiContext, _mode: UiMode, input: UiInput<'_>) -> Option<UiMode> {
    match input {
        UiInput::Button(Button::Menu) => Some(UiMode::Menu { index: 0 }),
        UiInput::RemoteWrite(payload) => {
            ctx.record_reading(payload);
            None
        }
        UiInput::Button(_) => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  MENU
// ═══════════════════════════════════════════════════════════════════════════

fn menu_input(ctx: &mut UiContext, mode: UiMode, input: UiInput<'_>) -> Option<UiMode> {
    let UiMode::Menu { index } = mode else {
        return Some(UiMode::Home);
    };
    let len = ctx.menu_items.len();

    match input {
        UiInput::Button(Button::Menu) => Some(UiMode::Home),
        UiInput::Button(b @ (Button::Up | Button::Down)) => Some(UiMode::Menu {
            index: step(index, len, b),
        }),
        UiInput::Button(Button::Select) => match ctx.menu_items.get(index) {
            Some(MenuItem::ViewData) => Some(UiMode::ViewSaved { cursor: 0 }),
            Some(MenuItem::SetTime) => Some(UiMode::SetTime),
            Some(MenuItem::ClearData) => {
                info!("MENU: clearing {} stored readings", ctx.history.len());
                ctx.clear_history();
                Some(UiMode::Home)
            }
            Some(MenuItem::Back) | None => Some(UiMode::Home),
        },
        UiInput::RemoteWrite(payload) => {
            ctx.record_reading(payload);
            None
        }
        UiInput::Button(Button::Power) => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  SET TIME: waiting for an HH:MM write
// ═══════════════════════════════════════════════════════════════════════════

fn set_time_enter(_ctx: &mut UiContext) {
    info!("SET TIME: waiting for HH:MM over the remote link");
}

fn set_time_input(ctx: &mut UiContext, _mode: UiMode, input: UiInput<'_>) -> Option<UiMode> {
    match input {
        UiInput::RemoteWrite(payload) => {
            ctx.set_time(payload);
            Some(UiMode::Home)
        }
        // Cancel without touching the clock.
        UiInput::Button(Button::Menu) => Some(UiMode::Home),
        UiInput::Button(_) => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  VIEW SAVED: browse the fixed-capacity history
// ═══════════════════════════════════════════════════════════════════════════

fn view_saved_enter(ctx: &mut UiContext) {
    info!("VIEW SAVED: {}/{} slots filled", ctx.history.len(), MAX_DATA);
}

fn view_saved_input(ctx: &mut UiContext, mode: UiMode, input: UiInput<'_>) -> Option<UiMode> {
    let UiMode::ViewSaved { cursor } = mode else {
        return Some(UiMode::Home);
    };

    match input {
        UiInput::Button(Button::Menu) => Some(UiMode::Home),
        // The cursor spans the full capacity, not just the filled slots.
        UiInput::Button(b @ (Button::Up | Button::Down)) => Some(UiMode::ViewSaved {
            cursor: step(cursor, MAX_DATA, b),
        }),
        UiInput::RemoteWrite(payload) => {
            ctx.record_reading(payload);
            None
        }
        UiInput::Button(_) => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  SLEEPING
// ═══════════════════════════════════════════════════════════════════════════

fn sleeping_enter(ctx: &mut UiContext) {
    info!("SLEEPING: {} readings held in RAM", ctx.history.len());
}

fn sleeping_exit(_ctx: &mut UiContext) {
    info!("SLEEPING: woke");
}

fn sleeping_input(ctx: &mut UiContext, _mode: UiMode, input: UiInput<'_>) -> Option<UiMode> {
    if let UiInput::RemoteWrite(payload) = input {
        ctx.record_reading(payload);
    }
    None
}
