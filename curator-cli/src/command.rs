//! Side effects as values.
//!
//! `update` functions return a [`Command`] describing the effects to run;
//! effects complete by producing new messages that are fed back into
//! `update`. Timers are delayed messages rather than ambient handles, so a
//! component cancels a pending timer by bumping the generation counter the
//! message carries and ignoring the stale delivery.

use futures::future::BoxFuture;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub enum Command<M> {
    None,
    Batch(Vec<Command<M>>),
    Perform(BoxFuture<'static, M>),
    Delay { duration: Duration, msg: Box<M> },
}

impl<M: Send + 'static> Command<M> {
    /// Run an async task and map its output to a message.
    pub fn perform<T, F>(future: F, map: impl FnOnce(T) -> M + Send + 'static) -> Self
    where
        F: std::future::Future<Output = T> + Send + 'static,
    {
        Command::Perform(Box::pin(async move { map(future.await) }))
    }

    /// Deliver a message after a fixed delay.
    pub fn delay(duration: Duration, msg: M) -> Self {
        Command::Delay {
            duration,
            msg: Box::new(msg),
        }
    }

    /// Combine commands, collapsing trivial cases.
    pub fn batch(commands: Vec<Command<M>>) -> Self {
        let mut commands: Vec<_> = commands
            .into_iter()
            .filter(|c| !matches!(c, Command::None))
            .collect();
        match commands.len() {
            0 => Command::None,
            1 => commands.pop().unwrap(),
            _ => Command::Batch(commands),
        }
    }
}

impl<M> std::fmt::Debug for Command<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::None => write!(f, "None"),
            Command::Batch(cmds) => write!(f, "Batch({})", cmds.len()),
            Command::Perform(_) => write!(f, "Perform"),
            Command::Delay { duration, .. } => write!(f, "Delay({:?})", duration),
        }
    }
}

/// Spawning executor for long-lived use: effects run concurrently and their
/// messages arrive on the paired receiver.
pub struct Runtime<M> {
    tx: mpsc::UnboundedSender<M>,
    tasks: Vec<JoinHandle<()>>,
}

impl<M: Send + 'static> Runtime<M> {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<M>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                tx,
                tasks: Vec::new(),
            },
            rx,
        )
    }

    pub fn run(&mut self, command: Command<M>) {
        self.tasks.retain(|t| !t.is_finished());
        match command {
            Command::None => {}
            Command::Batch(commands) => {
                for command in commands {
                    self.run(command);
                }
            }
            Command::Perform(future) => {
                let tx = self.tx.clone();
                self.tasks.push(tokio::spawn(async move {
                    let _ = tx.send(future.await);
                }));
            }
            Command::Delay { duration, msg } => {
                let tx = self.tx.clone();
                self.tasks.push(tokio::spawn(async move {
                    tokio::time::sleep(duration).await;
                    let _ = tx.send(*msg);
                }));
            }
        }
    }

    /// True while any spawned effect is still running.
    pub fn has_pending(&mut self) -> bool {
        self.tasks.retain(|t| !t.is_finished());
        !self.tasks.is_empty()
    }

    /// Abort all outstanding effect tasks.
    pub fn shutdown(self) {
        for task in self.tasks {
            task.abort();
        }
    }
}

/// Inline executor: runs a command tree to completion, feeding every
/// resulting message back through `update`. Effects execute sequentially in
/// batch order, and delays sleep on the tokio clock, so tests drive the whole
/// flow deterministically under `start_paused`.
pub async fn run_to_completion<S, M>(
    state: &mut S,
    update: impl Fn(&mut S, M) -> Command<M>,
    command: Command<M>,
) {
    let mut queue = VecDeque::new();
    queue.push_back(command);

    while let Some(command) = queue.pop_front() {
        match command {
            Command::None => {}
            Command::Batch(commands) => {
                for (i, c) in commands.into_iter().enumerate() {
                    queue.insert(i, c);
                }
            }
            Command::Perform(future) => {
                let msg = future.await;
                queue.push_front(update(state, msg));
            }
            Command::Delay { duration, msg } => {
                tokio::time::sleep(duration).await;
                queue.push_front(update(state, *msg));
            }
        }
    }
}
