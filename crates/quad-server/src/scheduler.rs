//! Interval scheduler for the expiry sweeper.

use std::time::Duration;

use quad_core::{
  push::PushDispatcher,
  store::{DocumentStore, IdentityProvider},
};
use quad_functions::Functions;
use tokio::{
  task::JoinHandle,
  time::{MissedTickBehavior, interval},
};

/// Run the expiry sweeper every `every`, starting immediately.
///
/// Returns a handle that can be used to abort the task. A tick that comes
/// due while a sweep is still running is delayed, never doubled up.
pub fn spawn_sweeper<S, I, P>(functions: Functions<S, I, P>, every: Duration) -> JoinHandle<()>
where
  S: DocumentStore + 'static,
  I: IdentityProvider + 'static,
  P: PushDispatcher + 'static,
{
  tokio::spawn(async move {
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tracing::info!(interval = ?every, "expiry sweeper started");

    loop {
      ticker.tick().await;
      functions.cleanup_expired_posts().await;
    }
  })
}
