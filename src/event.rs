use tokio::sync::mpsc;

use crate::batch::MutationOutcome;
use crate::entry::Entry;
use crate::error::{IndexError, Result};
use crate::index::LinkedCollection;

/// Events delivered to the index's single logical event loop.
#[derive(Debug)]
pub enum Event {
    /// A fresh snapshot pushed by the external data source.
    Refresh {
        primary: Vec<Entry>,
        linked: Vec<LinkedCollection>,
    },
    /// A dispatched mutation batch completed.
    MutationDone(MutationOutcome),
}

/// Async event handler funneling refresh pushes and mutation completions
/// into one channel so the core is never entered concurrently with itself.
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<Event>,
    tx: mpsc::UnboundedSender<Event>,
}

impl EventHandler {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { rx, tx }
    }

    /// Get a sender clone for the data source to push refresh events.
    pub fn sender(&self) -> mpsc::UnboundedSender<Event> {
        self.tx.clone()
    }

    /// Completion sender handed to mutation dispatch. Outcomes are forwarded
    /// into the main event channel by a background task.
    pub fn completion_sender(&self) -> mpsc::UnboundedSender<MutationOutcome> {
        let (tx, mut rx) = mpsc::unbounded_channel::<MutationOutcome>();
        let event_tx = self.tx.clone();
        tokio::spawn(async move {
            while let Some(outcome) = rx.recv().await {
                if event_tx.send(Event::MutationDone(outcome)).is_err() {
                    break;
                }
            }
        });
        tx
    }

    /// Receive the next event (waits until one is available).
    pub async fn next(&mut self) -> Result<Event> {
        self.rx.recv().await.ok_or(IndexError::ChannelClosed)
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::Operation;

    #[tokio::test]
    async fn refresh_events_arrive_in_order() {
        let mut events = EventHandler::new();
        let tx = events.sender();
        tx.send(Event::Refresh {
            primary: vec![],
            linked: vec![],
        })
        .unwrap();
        tx.send(Event::MutationDone(MutationOutcome {
            batch_id: 1,
            operation: Operation::Delete,
            keys: vec![],
            error: None,
        }))
        .unwrap();

        assert!(matches!(events.next().await.unwrap(), Event::Refresh { .. }));
        assert!(matches!(
            events.next().await.unwrap(),
            Event::MutationDone(_)
        ));
    }

    #[tokio::test]
    async fn completion_sender_forwards_outcomes() {
        let mut events = EventHandler::new();
        let completions = events.completion_sender();
        completions
            .send(MutationOutcome {
                batch_id: 42,
                operation: Operation::Move,
                keys: vec!["a.txt".into()],
                error: None,
            })
            .unwrap();

        match events.next().await.unwrap() {
            Event::MutationDone(outcome) => assert_eq!(outcome.batch_id, 42),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn closed_channel_reports_error() {
        let EventHandler { mut rx, tx } = EventHandler::new();
        drop(tx);
        assert!(rx.recv().await.is_none());
    }
}
