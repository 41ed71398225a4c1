//! Widget Registry / Lifecycle Controller
//!
//! Routes a classified response to exactly one widget factory and owns the
//! two pieces of cross-turn state the display has:
//!
//! - [`TimerWidgetState`]: at most one running countdown
//! - [`MoreAffordanceState`]: whether a "show more" control may be visible
//!
//! Both live here for the whole session and are passed nothing but explicit
//! references, so every lifecycle rule is testable without a real surface.

use serde::Serialize;

use crate::classifier::DisplayKind;
use crate::error::WidgetMountError;
use crate::mount::{greeting_text, MountPoint, Region, WidgetHandle};
use crate::response::DisplayPayload;
use crate::timer::{CountdownTimer, TerminationCause, TickOutcome, TimerWidgetState};
use crate::widgets::{Widget, WidgetFactory};

/// Visibility of the pagination control left by a paginated list
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct MoreAffordanceState {
    /// Whether the control may show
    pub visible: bool,
}

impl Default for MoreAffordanceState {
    fn default() -> Self {
        Self { visible: true }
    }
}

/// Session-scoped widget state and dispatch logic
#[derive(Clone, Debug, Default, Serialize)]
pub struct WidgetRegistry {
    timer: TimerWidgetState,
    more: MoreAffordanceState,
    next_handle: u64,
}

impl WidgetRegistry {
    /// Fresh session state: no timer, affordance visible
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Timer slot
    #[must_use]
    pub fn timer_state(&self) -> &TimerWidgetState {
        &self.timer
    }

    /// Pagination control state
    #[must_use]
    pub fn more_affordance(&self) -> MoreAffordanceState {
        self.more
    }

    fn allocate(&mut self) -> WidgetHandle {
        self.next_handle += 1;
        WidgetHandle(self.next_handle)
    }

    /// Render a classified payload
    ///
    /// Returns the handle of the mounted widget, or `None` for kinds that
    /// mount nothing (`NameChange`, `None`).
    ///
    /// # Errors
    ///
    /// Returns [`WidgetMountError`] when the factory rejects the payload or
    /// the surface lacks the region the widget needs. State is only changed
    /// for a timer once its replacement is known to be mountable.
    pub fn dispatch<M, F>(
        &mut self,
        kind: DisplayKind,
        payload: &DisplayPayload,
        intent: &str,
        mount: &mut M,
        factory: &F,
    ) -> Result<Option<WidgetHandle>, WidgetMountError>
    where
        M: MountPoint + ?Sized,
        F: WidgetFactory + ?Sized,
    {
        tracing::debug!(kind = kind.as_str(), intent = %intent, "Dispatching display");
        match kind {
            DisplayKind::Timer => self.mount_timer(payload, mount, factory).map(Some),
            DisplayKind::NameChange => {
                let name = payload.as_text().ok_or(WidgetMountError::UnsupportedPayload {
                    kind,
                    expected: "a name",
                })?;
                mount.set_greeting(greeting_text(&name))?;
                Ok(None)
            }
            DisplayKind::MapSearch => {
                let widget = factory.location_map(payload)?;
                self.append(widget, mount).map(Some)
            }
            DisplayKind::MapFind => {
                // Nearest-places results are terminal: no pagination after them
                if self.more.visible {
                    self.more.visible = false;
                    mount.set_more_affordance(false);
                }
                let widget = factory.nearest_places(payload)?;
                self.append(widget, mount).map(Some)
            }
            DisplayKind::BookList => {
                let widget = factory.book_list(payload)?;
                self.append(widget, mount).map(Some)
            }
            DisplayKind::BookDetail => {
                let widget = factory.book_info(payload, intent)?;
                self.append(widget, mount).map(Some)
            }
            DisplayKind::WorkoutList => {
                let widget = factory.workout_list(payload)?;
                self.append(widget, mount).map(Some)
            }
            DisplayKind::MemoryKeyword => {
                let widget = factory.keyword_list(payload)?;
                let handle = self.append(widget, mount)?;
                mount.attach_listeners(handle)?;
                Ok(Some(handle))
            }
            DisplayKind::None => Ok(None),
        }
    }

    fn append<M: MountPoint + ?Sized>(
        &mut self,
        widget: Widget,
        mount: &mut M,
    ) -> Result<WidgetHandle, WidgetMountError> {
        let handle = self.allocate();
        mount.append_widget(handle, widget)?;
        Ok(handle)
    }

    fn mount_timer<M, F>(
        &mut self,
        payload: &DisplayPayload,
        mount: &mut M,
        factory: &F,
    ) -> Result<WidgetHandle, WidgetMountError>
    where
        M: MountPoint + ?Sized,
        F: WidgetFactory + ?Sized,
    {
        // Validate everything that can fail before touching the running timer
        let spec = factory.timer(payload)?;
        if !mount.has_region(Region::MediaDisplay) {
            return Err(WidgetMountError::MissingRegion(Region::MediaDisplay));
        }

        // The slot decides what is running, not whatever the surface still shows
        if self.timer.is_active() {
            if let Some(current) = self.timer.node() {
                self.timer
                    .terminate(current, TerminationCause::Replaced, mount);
                tracing::info!(replaced = %current, "Replacing active timer");
            }
        }
        // Expired leftovers are already inert; the region is swapped wholesale
        for stale in mount.timer_nodes() {
            mount.detach_timer(stale);
        }

        let handle = self.allocate();
        let timer = CountdownTimer::from_spec(handle, &spec);
        mount.mount_timer(timer.node())?;
        self.timer.start(timer);
        Ok(handle)
    }

    /// Advance the running countdown
    pub fn tick<M: MountPoint + ?Sized>(
        &mut self,
        elapsed: std::time::Duration,
        mount: &mut M,
    ) -> TickOutcome {
        self.timer.tick(elapsed, mount)
    }

    /// Stop the running countdown, leaving its node frozen in place
    ///
    /// Returns false when nothing is running.
    pub fn cancel_timer<M: MountPoint + ?Sized>(&mut self, mount: &mut M) -> bool {
        match self.timer.node() {
            Some(handle) if self.timer.is_active() => {
                self.timer
                    .terminate(handle, TerminationCause::Cancelled, mount)
            }
            _ => false,
        }
    }
}
