//! Runs the effects produced by [`CraftState`].

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::api::CombineClient;
use crate::state::{Action, CraftState, Effect, Settings};
use crate::storage::{load_elements, save_elements, LocalStorage};
use crate::Result;

/// Owns the game state and everything it talks to.
///
/// Timers run on their own tokio tasks and post their action back through a
/// channel; call [`Controller::drain_timers`] or [`Controller::next_timer`]
/// to apply them. Failures while running effects end up in the state's error
/// banner, so dispatching never fails.
pub struct Controller {
    state: CraftState,
    client: Arc<dyn CombineClient>,
    storage: Box<dyn LocalStorage>,
    timers_tx: mpsc::UnboundedSender<Action>,
    timers_rx: mpsc::UnboundedReceiver<Action>,
}

impl Controller {
    /// Build a controller and load saved elements from `storage`.
    pub fn new(
        client: Arc<dyn CombineClient>,
        storage: Box<dyn LocalStorage>,
        settings: Settings,
    ) -> Result<Self> {
        let saved = load_elements(storage.as_ref())?;
        let mut state = CraftState::new(settings);
        state.apply(Action::Load(saved));

        let (timers_tx, timers_rx) = mpsc::unbounded_channel();
        Ok(Self {
            state,
            client,
            storage,
            timers_tx,
            timers_rx,
        })
    }

    pub fn state(&self) -> &CraftState {
        &self.state
    }

    /// Apply `action` and every action its effects feed back.
    pub async fn dispatch(&mut self, action: Action) {
        let mut queue = VecDeque::from([action]);

        while let Some(action) = queue.pop_front() {
            for effect in self.state.apply(action) {
                if let Some(next) = self.run(effect).await {
                    queue.push_back(next);
                }
            }
        }
    }

    /// Apply timer actions that have already fired.
    pub async fn drain_timers(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(action) = self.timers_rx.try_recv() {
            self.dispatch(action).await;
            applied += 1;
        }
        applied
    }

    /// Wait for the next timer and apply it.
    pub async fn next_timer(&mut self) {
        if let Some(action) = self.timers_rx.recv().await {
            self.dispatch(action).await;
        }
    }

    async fn run(&mut self, effect: Effect) -> Option<Action> {
        match effect {
            Effect::RequestCombine { first, second } => {
                let inputs = [first.clone(), second.clone()];
                match self.client.combine(&first, &second).await {
                    Ok(response) => {
                        tracing::info!(
                            first = %first,
                            second = %second,
                            result = %response.name,
                            new = response.new,
                            "combined"
                        );
                        Some(Action::CombineSucceeded {
                            inputs,
                            element: response.element(),
                        })
                    }
                    Err(e) => {
                        tracing::error!(first = %first, second = %second, error = %e, "combine failed");
                        Some(Action::CombineFailed {
                            inputs,
                            message: e.to_string(),
                        })
                    }
                }
            }
            Effect::Persist(elements) => match save_elements(self.storage.as_mut(), &elements) {
                Ok(()) => None,
                Err(e) => {
                    tracing::error!(error = %e, "saving discoveries failed");
                    Some(Action::PersistFailed(e.to_string()))
                }
            },
            Effect::ScheduleExpireNew { name, badge, after } => {
                self.schedule(after, Action::ExpireNew { name, badge });
                None
            }
            Effect::ScheduleDismissError { after } => {
                self.schedule(after, Action::DismissError);
                None
            }
        }
    }

    fn schedule(&self, after: Duration, action: Action) {
        let tx = self.timers_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(after).await;
            // The controller may be gone by now.
            let _ = tx.send(action);
        });
    }
}
