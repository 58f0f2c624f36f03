use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use teloxide::types::ChatId;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::debug;

use crate::gateway::{MessageEditor, MessageTarget};

/// Member-counter ramp parameters.
#[derive(Debug, Clone, Copy)]
pub struct RampConfig {
    pub start: u64,
    pub stop: u64,
    pub step_min: u64,
    pub step_max: u64,
    pub tick: Duration,
}

impl RampConfig {
    /// The community counter shown on session start.
    pub fn members_counter() -> Self {
        Self {
            start: 135_920,
            stop: 137_500,
            step_min: 1,
            step_max: 3,
            tick: Duration::from_millis(1_800),
        }
    }

    pub fn initial_text(&self) -> String {
        ramp_text(self.start)
    }
}

/// Countdown-banner parameters.
#[derive(Debug, Clone, Copy)]
pub struct CountdownConfig {
    pub seconds: u64,
    pub tick: Duration,
}

impl CountdownConfig {
    /// Urgency timer attached to the flash offer.
    pub fn flash_offer() -> Self {
        Self {
            seconds: 300,
            tick: Duration::from_secs(1),
        }
    }

    pub fn initial_text(&self) -> String {
        countdown_text(self.seconds)
    }
}

pub fn ramp_text(members: u64) -> String {
    format!(
        "🔥 <b>Membros na comunidade:</b> {}",
        format_thousands(members)
    )
}

pub fn countdown_text(remaining: u64) -> String {
    format!(
        "⏳ <b>Oferta relâmpago expira em:</b> {}",
        format_mmss(remaining)
    )
}

pub fn expired_text() -> String {
    "⌛ <b>Oferta expirada!</b>".to_string()
}

/// pt-BR thousands grouping: 137500 becomes "137.500".
pub fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    grouped
}

pub fn format_mmss(total_seconds: u64) -> String {
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// Ramp the counter by a small random step per tick, clamped at the stop
/// value. The first rejected edit ends the task, as does displaying the
/// stop value itself.
async fn run_ramp(editor: Arc<dyn MessageEditor>, target: MessageTarget, config: RampConfig) {
    let mut ticker = interval(config.tick);
    ticker.tick().await;
    let mut value = config.start;

    while value < config.stop {
        ticker.tick().await;

        let step = rand::rng().random_range(config.step_min..=config.step_max);
        value = (value + step).min(config.stop);

        if editor.edit_text(target, ramp_text(value)).await.is_err() {
            debug!("Counter edit rejected for chat {}; stopping ramp", target.chat);
            return;
        }
    }
    debug!("Counter ramp for chat {} reached {}", target.chat, config.stop);
}

/// Tick the banner down once per second; after 00:00 is shown, one final
/// expired frame replaces it.
async fn run_countdown(
    editor: Arc<dyn MessageEditor>,
    target: MessageTarget,
    config: CountdownConfig,
) {
    let mut ticker = interval(config.tick);
    ticker.tick().await;
    let mut remaining = config.seconds;

    loop {
        ticker.tick().await;

        if remaining == 0 {
            let _ = editor.edit_text(target, expired_text()).await;
            debug!("Countdown for chat {} expired", target.chat);
            return;
        }

        remaining -= 1;
        if editor
            .edit_text(target, countdown_text(remaining))
            .await
            .is_err()
        {
            debug!("Countdown edit rejected for chat {}; stopping", target.chat);
            return;
        }
    }
}

/// Running animation tasks, keyed by the message they edit. Spawns insert
/// under the same lock a finishing task takes to remove itself, so
/// completion cannot race the insert.
#[derive(Clone, Default)]
pub struct AnimationRegistry {
    tasks: Arc<Mutex<HashMap<MessageTarget, JoinHandle<()>>>>,
}

impl AnimationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn spawn_ramp(
        &self,
        editor: Arc<dyn MessageEditor>,
        target: MessageTarget,
        config: RampConfig,
    ) {
        self.spawn(target, run_ramp(editor, target, config)).await;
    }

    pub async fn spawn_countdown(
        &self,
        editor: Arc<dyn MessageEditor>,
        target: MessageTarget,
        config: CountdownConfig,
    ) {
        self.spawn(target, run_countdown(editor, target, config))
            .await;
    }

    async fn spawn(
        &self,
        target: MessageTarget,
        animation: impl Future<Output = ()> + Send + 'static,
    ) {
        let mut tasks = self.tasks.lock().await;
        if let Some(previous) = tasks.remove(&target) {
            previous.abort();
        }
        let registry = self.tasks.clone();
        let handle = tokio::spawn(async move {
            animation.await;
            registry.lock().await.remove(&target);
        });
        tasks.insert(target, handle);
    }

    /// Abort one task. True if something was running for that message.
    #[allow(dead_code)]
    pub async fn cancel(&self, target: MessageTarget) -> bool {
        match self.tasks.lock().await.remove(&target) {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    /// Abort every task animating a message in the given chat.
    pub async fn cancel_chat(&self, chat: ChatId) -> usize {
        let mut tasks = self.tasks.lock().await;
        let stale: Vec<MessageTarget> = tasks
            .keys()
            .filter(|target| target.chat == chat)
            .copied()
            .collect();
        for target in &stale {
            if let Some(handle) = tasks.remove(target) {
                handle.abort();
            }
        }
        stale.len()
    }

    /// Abort everything still running (shutdown path).
    pub async fn cancel_all(&self) -> usize {
        let mut tasks = self.tasks.lock().await;
        let count = tasks.len();
        for (_, handle) in tasks.drain() {
            handle.abort();
        }
        count
    }

    #[allow(dead_code)]
    pub async fn running(&self) -> usize {
        self.tasks.lock().await.len()
    }
}
