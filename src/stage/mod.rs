//! Stage state and orchestration.
//!
//! The stage is the top-level owner: monitor set, overlay compositor,
//! subscription registry, session state and the collaborator widgets. It
//! wires construction in z-order, routes collaborator signals, and tears
//! everything down exactly once.

mod layout;
mod monitors;
mod overlay;
mod session;
mod types;

use std::time::Duration;

use anyhow::ensure;
use calloop::LoopHandle;
use smithay::utils::{Logical, Rectangle, Size};
use tracing::{info, trace};

pub use layout::{place, ClockPlacement, PlacementCtx};
pub use monitors::{MonitorDescriptor, MonitorSet};
pub use overlay::OverlayCompositor;
pub use types::{OverlayChild, Role, SessionState};

use crate::config::Config;
use crate::input::KeyEvent;
use crate::subscriptions::{self, Signal, SubscriptionRegistry};
use crate::widgets::{
    ClockWidget, DisplaySurface, Fader, MonitorBackdrop, SessionManager, StatusBar, UnlockDialog,
    WidgetFactory,
};

// =============================================================================
// State
// =============================================================================

/// Event-loop data: the host's calloop sources (input stream, timers,
/// collaborator notifications) all resolve to this.
pub struct State {
    pub stage: Stage,
}

impl State {
    pub fn new(
        event_loop: LoopHandle<'static, State>,
        config: Config,
        display: Box<dyn DisplaySurface>,
        manager: Box<dyn SessionManager>,
        fader: Box<dyn Fader>,
        factory: &mut dyn WidgetFactory,
    ) -> anyhow::Result<Self> {
        let stage = Stage::new(event_loop, config, display, manager, fader, factory)?;
        Ok(Self { stage })
    }

    /// Delivers a collaborator-raised signal to its bound listeners.
    pub fn emit_signal(&mut self, signal: Signal) {
        subscriptions::emit(self, signal);
    }
}

// =============================================================================
// Children
// =============================================================================

/// The collaborator widgets, dropped together at teardown.
struct Children {
    backdrops: Vec<Box<dyn MonitorBackdrop>>,
    clock: Box<dyn ClockWidget>,
    unlock: Box<dyn UnlockDialog>,
    audio_status: Box<dyn StatusBar>,
    info_status: Box<dyn StatusBar>,
}

// =============================================================================
// Stage
// =============================================================================

pub struct Stage {
    config: Config,
    display: Box<dyn DisplaySurface>,
    manager: Box<dyn SessionManager>,
    fader: Box<dyn Fader>,

    monitors: MonitorSet,
    overlay: OverlayCompositor,
    pub(crate) subscriptions: SubscriptionRegistry,
    children: Option<Children>,

    session_state: SessionState,
    timeout_inhibited: bool,
    /// Monitor last seen under the pointer; `None` until the first motion
    /// event establishes it.
    last_focus_monitor: Option<usize>,
    destroying: bool,
}

impl Stage {
    pub fn new(
        event_loop: LoopHandle<'static, State>,
        config: Config,
        mut display: Box<dyn DisplaySurface>,
        manager: Box<dyn SessionManager>,
        fader: Box<dyn Fader>,
        factory: &mut dyn WidgetFactory,
    ) -> anyhow::Result<Self> {
        let monitors = MonitorSet::query(display.as_ref());
        ensure!(!monitors.is_empty(), "display reported no monitors");

        display.fullscreen_across_monitors();

        let mut stage = Self {
            config,
            display,
            manager,
            fader,
            monitors,
            overlay: OverlayCompositor::new(),
            subscriptions: SubscriptionRegistry::new(event_loop),
            children: None,
            session_state: SessionState::Dormant,
            timeout_inhibited: false,
            last_focus_monitor: None,
            destroying: false,
        };

        stage.setup_children(factory);
        stage.display.start_event_capture();
        stage.relayout();

        info!("stage ready across {} monitors", stage.monitors.len());
        Ok(stage)
    }

    // =========================================================================
    // Construction wiring
    // =========================================================================

    /// Builds the children in z-order: backdrops occupy the bottom of the
    /// stack before any status or dialog child is added; insertion order is
    /// the default z-order, corrected later by explicit reorders.
    fn setup_children(&mut self, factory: &mut dyn WidgetFactory) {
        self.subscriptions.connect(
            Signal::BackgroundChanged,
            Box::new(|state| state.stage.on_background_changed()),
        );

        let backdrops = self.setup_backdrops(factory);
        let clock = self.setup_clock(factory);
        let unlock = self.setup_unlock(factory);

        let audio_status = factory.create_audio_status();
        self.overlay.add(Role::AudioStatus);
        let info_status = factory.create_info_status();
        self.overlay.add(Role::InfoStatus);

        self.children = Some(Children {
            backdrops,
            clock,
            unlock,
            audio_status,
            info_status,
        });
    }

    fn setup_backdrops(&mut self, factory: &mut dyn WidgetFactory) -> Vec<Box<dyn MonitorBackdrop>> {
        let mut backdrops = Vec::with_capacity(self.monitors.len());

        for monitor in self.monitors.iter() {
            let mut backdrop = factory.create_backdrop(monitor);

            let image = self.display.create_background_image(monitor.rect.size);
            backdrop.set_initial_image(image);

            backdrop.show_idle_presentation();
            backdrop.reveal();

            let role = Role::Background(monitor.index);
            self.overlay.add(role);
            self.overlay.set_visible(role, true);
            self.overlay.set_revealed(role, true);

            backdrops.push(backdrop);
        }

        backdrops
    }

    fn setup_clock(&mut self, factory: &mut dyn WidgetFactory) -> Box<dyn ClockWidget> {
        let mut clock = factory.create_clock();
        clock.set_alignment(self.config.clock_halign, self.config.clock_valign);
        if let Some(message) = &self.config.away_message {
            clock.set_message(message);
        }

        self.overlay.add(Role::Clock);

        // With no screensaver plugin configured the clock is the idle
        // presentation itself and stays revealed permanently.
        if self.config.screensaver_name.is_empty() {
            clock.show();
            self.overlay.set_visible(Role::Clock, true);
            clock.reveal();
            self.overlay.set_revealed(Role::Clock, true);
            clock.start_positioning();
        }

        clock
    }

    fn setup_unlock(&mut self, factory: &mut dyn WidgetFactory) -> Box<dyn UnlockDialog> {
        let unlock = factory.create_unlock_dialog();
        self.overlay.add(Role::Unlock);

        // Prevent a dialog timeout during credential verification.
        self.subscriptions.connect(
            Signal::InhibitTimeout,
            Box::new(|state| state.stage.on_inhibit_timeout()),
        );
        self.subscriptions.connect(
            Signal::UninhibitTimeout,
            Box::new(|state| state.stage.on_uninhibit_timeout()),
        );

        self.subscriptions.connect(
            Signal::AuthSuccess,
            Box::new(|state| state.stage.on_authentication_result(true)),
        );
        self.subscriptions.connect(
            Signal::AuthFailure,
            Box::new(|state| state.stage.on_authentication_result(false)),
        );

        unlock
    }

    // =========================================================================
    // Fade transitions
    // =========================================================================

    pub fn transition_in(&mut self, duration: Duration) {
        self.fader.fade_in(duration);
    }

    /// Starts the fade towards teardown. A second request while one is in
    /// flight is a silent no-op.
    pub fn transition_out(&mut self, duration: Duration) {
        if self.destroying {
            return;
        }
        self.destroying = true;

        self.fader.cancel();
        self.fader.fade_out(duration);
    }

    // =========================================================================
    // Teardown
    // =========================================================================

    /// Releases every child, subscription and timer. Idempotent; the
    /// registry guarantees each handle is released exactly once.
    pub fn destroy_stage(&mut self) {
        if self.children.is_none() {
            trace!("destroy_stage: already destroyed");
            return;
        }
        self.destroying = true;

        self.set_timeout_active(false);
        self.children = None;
        self.overlay.clear();
        self.subscriptions.release_all();
        self.monitors = MonitorSet::default();
        self.display.stop_event_capture();

        info!("stage destroyed");
    }

    // =========================================================================
    // Layout
    // =========================================================================

    /// Re-places every visible child. A layout pass on pointer crossing is
    /// only triggered through [`Stage::maybe_update_layout`].
    pub fn relayout(&mut self) {
        for role in self.overlay.visible_roles() {
            self.allocate(role);
        }
    }

    /// Computes and records the placement for one child, delegating to the
    /// layout policy. Returns `None` for roles without a child.
    pub fn allocate(&mut self, role: Role) -> Option<Rectangle<i32, Logical>> {
        if !self.overlay.contains(role) {
            return None;
        }
        let natural_size = self.natural_size_of(role)?;
        let clock = self.clock_placement();

        let ctx = PlacementCtx {
            monitors: &self.monitors,
            state: self.session_state,
            focused_monitor: self.focused_monitor(),
            natural_size,
            clock,
            sticky: self.overlay.placement(role),
        };
        let rect = layout::place(role, &ctx);

        self.overlay.set_placement(role, rect);
        Some(rect)
    }

    /// Feeds the focus tracker with the monitor under the pointer. The
    /// first observation only records the value; later crossings trigger a
    /// layout pass once the session has its unlock child.
    pub fn maybe_update_layout(&mut self, current: usize) {
        if self.last_focus_monitor.is_none() {
            self.last_focus_monitor = Some(current);
            return;
        }
        if !self.overlay.contains(Role::Unlock) {
            return;
        }
        if self.last_focus_monitor == Some(current) {
            return;
        }

        self.last_focus_monitor = Some(current);
        self.relayout();
    }

    fn focused_monitor(&self) -> usize {
        self.last_focus_monitor
            .unwrap_or(0)
            .min(self.monitors.len().saturating_sub(1))
    }

    fn natural_size_of(&self, role: Role) -> Option<Size<i32, Logical>> {
        let children = self.children.as_ref()?;
        let size = match role {
            Role::Background(index) => self.monitors.get(index)?.rect.size,
            Role::Clock => children.clock.preferred_size(),
            Role::Unlock => children.unlock.preferred_size(),
            Role::AudioStatus => children.audio_status.preferred_size(),
            Role::InfoStatus => children.info_status.preferred_size(),
        };
        Some(size)
    }

    fn clock_placement(&self) -> ClockPlacement {
        let monitor = self
            .children
            .as_ref()
            .map(|children| children.clock.current_monitor())
            .unwrap_or(0);
        ClockPlacement {
            monitor,
            halign: self.config.clock_halign,
            valign: self.config.clock_valign,
        }
    }

    // =========================================================================
    // Collaborator plumbing
    // =========================================================================

    /// Rebuilds the wallpaper for every monitor after a background
    /// configuration change.
    fn on_background_changed(&mut self) {
        let Some(children) = self.children.as_mut() else {
            return;
        };

        for backdrop in &mut children.backdrops {
            let image = self.display.create_background_image(backdrop.rect().size);
            backdrop.set_next_image(image);
        }
    }

    /// Forwards a raw key event to the dialog's credential-entry queue.
    pub fn queue_dialog_key_event(&mut self, event: KeyEvent) {
        if let Some(children) = self.children.as_mut() {
            children.unlock.queue_key_event(event);
        }
    }

    /// Updates the away message on the clock.
    pub fn set_message(&mut self, message: &str) {
        if let Some(children) = self.children.as_mut() {
            children.clock.set_message(message);
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn session_state(&self) -> SessionState {
        self.session_state
    }

    pub fn is_awake(&self) -> bool {
        self.session_state.is_awake()
    }

    pub fn destroying(&self) -> bool {
        self.destroying
    }

    pub fn monitors(&self) -> &MonitorSet {
        &self.monitors
    }

    pub fn overlay(&self) -> &OverlayCompositor {
        &self.overlay
    }

    /// Geometry of the stage surface: the union of every monitor.
    pub fn rect(&self) -> Rectangle<i32, Logical> {
        self.monitors.bounding_rect()
    }
}
