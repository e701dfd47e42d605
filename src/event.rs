use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use tracing::{debug, warn};

pub enum AppEvent {
    Key(KeyEvent),
    Tick,
    Resize(u16, u16),
}

/// Polls the terminal on a background thread and forwards key presses,
/// resizes and idle ticks over a channel.
pub struct EventHandler {
    rx: mpsc::Receiver<AppEvent>,
    _tx: mpsc::Sender<AppEvent>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::channel();
        let _tx = tx.clone();

        thread::spawn(move || {
            loop {
                let ready = match event::poll(tick_rate) {
                    Ok(ready) => ready,
                    Err(err) => {
                        warn!(%err, "terminal poll failed");
                        false
                    }
                };
                let forwarded = if ready {
                    match event::read() {
                        // Release and repeat events never reach the quiz.
                        Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                            Some(AppEvent::Key(key))
                        }
                        Ok(Event::Resize(w, h)) => Some(AppEvent::Resize(w, h)),
                        Ok(_) => None,
                        Err(err) => {
                            warn!(%err, "terminal read failed");
                            None
                        }
                    }
                } else {
                    Some(AppEvent::Tick)
                };
                if let Some(ev) = forwarded {
                    if tx.send(ev).is_err() {
                        debug!("event channel closed, stopping input thread");
                        return;
                    }
                }
            }
        });

        Self { rx, _tx }
    }

    pub fn next(&self) -> anyhow::Result<AppEvent> {
        Ok(self.rx.recv()?)
    }
}
