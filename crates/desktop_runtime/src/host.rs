//! Host-side runtime helpers for executing reducer effects against the injected host services.
//!
//! The reducer stays pure; everything it asks for (layout persistence, lifecycle routing, cleanup
//! requests) is carried out here against the [`HostServices`] bundle and the mounted
//! [`LifecycleCoordinator`].

use std::rc::Rc;

use futures::stream::LocalBoxStream;
use leptos::{logging, Callable, Callback};
use platform_host::HostServices;

use crate::{
    lifecycle::LifecycleCoordinator,
    model::DesktopState,
    persistence,
    reducer::{DesktopAction, RuntimeEffect},
};

#[derive(Clone)]
/// Host service bundle plus the lifecycle coordinator mounted on it.
pub struct DesktopHostContext {
    services: HostServices,
    lifecycle: Rc<LifecycleCoordinator>,
}

impl DesktopHostContext {
    /// Mounts the lifecycle coordinator on `services`. `ticks` paces the timer worker.
    pub fn new(services: HostServices, ticks: LocalBoxStream<'static, ()>) -> Self {
        let lifecycle = Rc::new(LifecycleCoordinator::mount(&services, ticks));
        Self {
            services,
            lifecycle,
        }
    }

    pub fn services(&self) -> &HostServices {
        &self.services
    }

    pub fn lifecycle(&self) -> &LifecycleCoordinator {
        &self.lifecycle
    }

    /// Returns the stable name of the selected host strategy.
    pub fn host_strategy_name(&self) -> &'static str {
        self.services.host_strategy.as_str()
    }

    /// Hydrates the desktop from the persisted layout, if any.
    pub fn install_boot_hydration(&self, dispatch: Callback<DesktopAction>) {
        match persistence::load_boot_snapshot(self.services.store.as_ref()) {
            Some(snapshot) => {
                logging::log!(
                    "restoring {} window(s) on {} host",
                    snapshot.windows.len(),
                    self.host_strategy_name()
                );
                dispatch.call(DesktopAction::HydrateSnapshot { snapshot });
            }
            None => logging::log!("no desktop layout to restore"),
        }
    }

    /// Executes a single [`RuntimeEffect`] emitted by the reducer.
    ///
    /// `desktop` is the state the reducer produced alongside the effect.
    pub fn run_runtime_effect(&self, desktop: &DesktopState, effect: RuntimeEffect) {
        match effect {
            RuntimeEffect::PersistLayout => {
                if let Err(err) =
                    persistence::persist_layout_snapshot(self.services.store.as_ref(), desktop)
                {
                    logging::warn!("persist layout failed: {err}");
                }
            }
            RuntimeEffect::DispatchLifecycle {
                window_id,
                app_id,
                event,
            } => {
                self.lifecycle
                    .dispatch_lifecycle(&window_id, &app_id, event);
            }
            RuntimeEffect::RequestCleanup { window_id, app_id } => {
                logging::log!("cleanup requested for `{app_id}` after `{window_id}` closed");
                self.lifecycle.request_cleanup(window_id, app_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use futures::{channel::mpsc, StreamExt};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        apps::TIMER_APP_ID,
        persistence::load_boot_snapshot,
        reducer::reduce_desktop,
        test_support::TestHost,
    };

    fn context(host: &TestHost) -> DesktopHostContext {
        let (_ticks, rx) = mpsc::unbounded::<()>();
        DesktopHostContext::new(host.services.clone(), rx.boxed_local())
    }

    #[test]
    fn effects_persist_layout_and_reach_managers() {
        let host = TestHost::new();
        let ctx = context(&host);
        let mut desktop = DesktopState::default();
        let effects = reduce_desktop(
            &mut desktop,
            DesktopAction::OpenApp {
                app_id: TIMER_APP_ID.to_string(),
            },
        )
        .expect("open");
        for effect in effects {
            ctx.run_runtime_effect(&desktop, effect);
        }
        host.run();

        let snapshot = load_boot_snapshot(&host.store).expect("persisted layout");
        assert_eq!(snapshot.windows.len(), 1);
        assert!(ctx.lifecycle().atoms().timer.get().association.is_active);
        assert_eq!(ctx.host_strategy_name(), "headless");
    }
}
