use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug, error};

use super::{Controller, Page};
use crate::error::FrameworkError;
use crate::templating::Renderer;

/// Where a controller is in its treat → assign → render sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Created,
    Treated,
    DataAssigned,
    Rendered,
    Errored,
}

impl LifecycleState {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Rendered | Self::Errored)
    }

    /// Forward one step, or to `Errored` from any non-terminal state.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        use LifecycleState::*;
        match (self, next) {
            (Created, Treated) | (Treated, DataAssigned) | (DataAssigned, Rendered) => true,
            (from, Errored) => !from.is_terminal(),
            _ => false,
        }
    }
}

/// Terminal state plus the rendered body or the error that stopped the run.
#[derive(Debug)]
pub struct LifecycleOutcome {
    pub state: LifecycleState,
    pub result: Result<String, FrameworkError>,
}

impl LifecycleOutcome {
    #[must_use]
    pub fn is_rendered(&self) -> bool {
        self.state == LifecycleState::Rendered
    }
}

struct Lifecycle {
    state: LifecycleState,
}

impl Lifecycle {
    fn advance(&mut self, next: LifecycleState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal lifecycle transition {:?} -> {:?}",
            self.state,
            next
        );
        debug!(from = ?self.state, to = ?next, "Lifecycle transition");
        self.state = next;
    }
}

/// Drive `controller` through treat → assign data → render.
///
/// Errors and panics from any phase are caught here, once: the page's
/// accumulated vars and assets are discarded and the outcome ends `Errored`.
pub fn run_lifecycle(
    controller: &mut dyn Controller,
    page: &mut Page,
    renderer: &dyn Renderer,
) -> LifecycleOutcome {
    let mut lifecycle = Lifecycle {
        state: LifecycleState::Created,
    };

    let result = guard_panics(|| {
        controller.treat(page)?;
        lifecycle.advance(LifecycleState::Treated);
        controller.assign_data(page)?;
        lifecycle.advance(LifecycleState::DataAssigned);
        let body = render(page, renderer)?;
        lifecycle.advance(LifecycleState::Rendered);
        Ok(body)
    });

    match result {
        Ok(body) => LifecycleOutcome {
            state: lifecycle.state,
            result: Ok(body),
        },
        Err(e) => {
            error!(
                phase = ?lifecycle.state,
                template = %page.template(),
                error = %e,
                "Controller lifecycle failed"
            );
            page.discard();
            LifecycleOutcome {
                state: LifecycleState::Errored,
                result: Err(e),
            }
        }
    }
}

/// Render the page's template with its vars plus `js`, `css` and `template`.
///
/// # Errors
///
/// [`FrameworkError::Configuration`] with the "No template defined" message
/// when no template was set, otherwise whatever the renderer reports.
pub fn render(page: &Page, renderer: &dyn Renderer) -> Result<String, FrameworkError> {
    if page.template().is_empty() {
        return Err(FrameworkError::missing_template());
    }
    let vars = page.render_vars()?;
    renderer.render(page.template(), &vars)
}

/// Run `f`, turning a panic into [`FrameworkError::Unhandled`].
pub(crate) fn guard_panics<T, F>(f: F) -> Result<T, FrameworkError>
where
    F: FnOnce() -> Result<T, FrameworkError>,
{
    catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|panic| {
        let message = panic_message(panic.as_ref());
        error!(panic = %message, "Handler panicked");
        Err(FrameworkError::Unhandled(anyhow::anyhow!(
            "handler panicked: {message}"
        )))
    })
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
