//! Application service: the hexagonal core.
//!
//! [`AppService`] owns the UI state machine, the reading history, the
//! software clock, the power controller and the screen writer.  It exposes
//! a hardware-agnostic API; all I/O flows through port traits injected at
//! call sites, making the whole service testable with mock adapters.
//!
//! ```text
//!  button / remote write ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!                            │        AppService        │
//!  DisplayPort / Platform ◀──│ FSM · History · Clock ·  │
//!  RemoteLinkPort         ◀──│ Power · ScreenWriter     │
//!                            └──────────────────────────┘
//! ```

use log::{info, warn};

use crate::clock::SoftwareClock;
use crate::config::SystemConfig;
use crate::drivers::buttons::{Button, EdgePolarity};
use crate::fsm::context::{Outcome, UiContext};
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId, Transition, UiInput, UiMode};
use crate::history::HistoryStore;
use crate::power::{self, PowerAction, PowerController};
use crate::ui::screen;
use crate::ui::writer::ScreenWriter;

use super::events::AppEvent;
use super::ports::{DisplayPort, EventSink, PlatformPort, RemoteLinkPort};

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    config: SystemConfig,
    fsm: Fsm,
    ctx: UiContext,
    power: PowerController,
    writer: ScreenWriter,
    /// Edge the power button is currently armed on.
    power_polarity: EdgePolarity,
    /// While `Some`, the "Invalid Data" banner covers the Home screen.
    banner_until_ms: Option<u64>,
}

impl AppService {
    /// Construct the service from configuration.
    ///
    /// Does **not** draw anything; call [`start`](Self::start) next.
    pub fn new(config: SystemConfig, now_ms: u64) -> Self {
        let ctx = UiContext::new(&config, now_ms / 1000);
        let power = PowerController::new(&config, now_ms);
        let fsm = Fsm::new(build_state_table(), UiMode::Home);

        Self {
            config,
            fsm,
            ctx,
            power,
            writer: ScreenWriter::new(),
            power_polarity: EdgePolarity::Rising,
            banner_until_ms: None,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Enter Home, light the display and draw the first frame.
    pub fn start(&mut self, now_ms: u64, display: &mut impl DisplayPort, sink: &mut impl EventSink) {
        self.fsm.start(&mut self.ctx);
        display.set_backlight(true);
        self.sync_clock(now_ms);
        self.render(now_ms, display);
        sink.emit(&AppEvent::Started(self.fsm.current_state()));
        info!("AppService started in {:?}", self.fsm.current_state());
    }

    // ── Inputs ────────────────────────────────────────────────

    /// Handle one debounced button press.
    ///
    /// Power always runs the sleep sequence.  Any other press while the
    /// screen is blanked only re-lights it.
    pub fn handle_button(
        &mut self,
        button: Button,
        now_ms: u64,
        hw: &mut (impl DisplayPort + PlatformPort + RemoteLinkPort),
        sink: &mut impl EventSink,
    ) {
        if button == Button::Power {
            self.power_cycle(hw, sink);
            return;
        }

        if self.power.activity(now_ms) {
            self.wake_screen(hw, sink);
            self.render(now_ms, hw);
            return;
        }

        self.sync_clock(now_ms);
        let transition = self.fsm.handle(&mut self.ctx, UiInput::Button(button));
        self.report(transition, sink);
        self.render(now_ms, hw);
    }

    /// Handle one remote write.
    pub fn handle_remote_write(
        &mut self,
        payload: &[u8],
        now_ms: u64,
        display: &mut impl DisplayPort,
        sink: &mut impl EventSink,
    ) {
        if self.power.activity(now_ms) {
            self.wake_screen(display, sink);
        }

        self.sync_clock(now_ms);
        let transition = self.fsm.handle(&mut self.ctx, UiInput::RemoteWrite(payload));
        self.report(transition, sink);
        self.render(now_ms, display);
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Advance the clock, check the screen timeout and refresh the display.
    pub fn tick(
        &mut self,
        now_ms: u64,
        hw: &mut (impl DisplayPort + PlatformPort + RemoteLinkPort),
        sink: &mut impl EventSink,
    ) {
        self.sync_clock(now_ms);

        match self.power.tick(now_ms) {
            Some(PowerAction::ScreenOff) => {
                info!("power: screen timeout, blanking display");
                hw.clear();
                hw.set_backlight(false);
                self.writer.invalidate();
                self.banner_until_ms = None;
                sink.emit(&AppEvent::ScreenBlanked);
            }
            Some(PowerAction::Sleep) => {
                info!("power: screen timeout, sleeping");
                self.power_cycle(hw, sink);
            }
            None => self.render(now_ms, hw),
        }
    }

    /// Full sleep/wake sequence.  Blocks until the wake source fires.
    pub fn power_cycle(
        &mut self,
        hw: &mut (impl DisplayPort + PlatformPort + RemoteLinkPort),
        sink: &mut impl EventSink,
    ) {
        let transition = self.fsm.force_transition(UiMode::Sleeping, &mut self.ctx);
        self.report(transition, sink);
        sink.emit(&AppEvent::Sleeping);

        self.power_polarity =
            power::run_sleep_cycle(&self.config, hw, &mut self.writer, self.power_polarity);

        let now_ms = hw.uptime_ms();
        self.power.on_wake(now_ms);
        self.banner_until_ms = None;
        self.sync_clock(now_ms);

        let transition = self.fsm.force_transition(UiMode::Home, &mut self.ctx);
        self.fsm.mark_first_entry();
        self.report(transition, sink);
        sink.emit(&AppEvent::Woke);
        self.render(now_ms, hw);
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn mode(&self) -> UiMode {
        self.fsm.mode()
    }

    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    pub fn history(&self) -> &HistoryStore {
        &self.ctx.history
    }

    pub fn clock(&self) -> &SoftwareClock {
        &self.ctx.clock
    }

    pub fn screen_on(&self) -> bool {
        self.power.screen_on()
    }

    pub fn power_polarity(&self) -> EdgePolarity {
        self.power_polarity
    }

    pub fn banner_active(&self) -> bool {
        self.banner_until_ms.is_some()
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    // ── Internal ──────────────────────────────────────────────

    fn sync_clock(&mut self, now_ms: u64) {
        self.ctx.now_secs = now_ms / 1000;
        self.ctx.clock.tick(self.ctx.now_secs);
    }

    fn wake_screen(&mut self, display: &mut impl DisplayPort, sink: &mut impl EventSink) {
        info!("power: activity, waking display");
        display.set_backlight(true);
        self.writer.invalidate();
        self.fsm.mark_first_entry();
        sink.emit(&AppEvent::ScreenWoken);
    }

    /// Forward a state change and the handler's side effect to the sink.
    fn report(&mut self, transition: Option<Transition>, sink: &mut impl EventSink) {
        if let Some(Transition { from, to }) = transition {
            sink.emit(&AppEvent::ModeChanged { from, to });
        }

        let Some(outcome) = self.ctx.take_outcome() else {
            return;
        };
        let event = match outcome {
            Outcome::Recorded { reading, stamp } => AppEvent::ReadingRecorded {
                reading,
                stamp,
                count: self.ctx.history.len(),
            },
            Outcome::Rejected(e) => {
                warn!("remote write rejected: {e}");
                AppEvent::InputRejected(e)
            }
            Outcome::ClockSet { hours, minutes } => AppEvent::ClockSet { hours, minutes },
            Outcome::Cleared => AppEvent::HistoryCleared,
        };
        sink.emit(&event);
    }

    /// Draw the current mode (or the invalid banner) if the screen is lit.
    fn render(&mut self, now_ms: u64, display: &mut impl DisplayPort) {
        if !self.power.screen_on() {
            return;
        }

        let on_home = self.fsm.current_state() == StateId::Home;
        if !on_home {
            // Leaving Home dismisses the banner; the pending flag waits.
            self.banner_until_ms = None;
        } else if self.ctx.invalid_pending && self.banner_until_ms.is_none() {
            self.ctx.invalid_pending = false;
            self.banner_until_ms = Some(now_ms + u64::from(self.config.invalid_banner_ms));
            self.writer.apply(display, &screen::invalid_banner(), true);
            return;
        }

        if let Some(until) = self.banner_until_ms {
            if now_ms < until {
                return;
            }
            self.banner_until_ms = None;
            self.fsm.mark_first_entry();
        }

        let first_entry = self.fsm.take_first_entry();
        let frame = screen::compose(
            self.fsm.mode(),
            &self.ctx.history,
            self.ctx.clock.reading(),
            self.ctx.menu_items,
        );
        self.writer.apply(display, &frame, first_entry);
    }
}
