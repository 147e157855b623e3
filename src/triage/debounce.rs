//! Debounced classification for a report draft being typed.
//!
//! Each edit is tagged with a sequence number. A background task waits for
//! the input to go quiet for the debounce window before classifying, and a
//! newer edit cancels the pending one, so a published result always belongs
//! to the most recent edit seen at the time it fired.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use super::{classify_if_ready, Triage};

/// Classification published for a given edit. `triage` is `None` when the
/// description was too short to classify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DebouncedTriage {
    pub seq: u64,
    pub triage: Option<Triage>,
}

struct Edit {
    seq: u64,
    description: String,
}

pub struct TriageDebouncer {
    edits: mpsc::UnboundedSender<Edit>,
    results: watch::Receiver<DebouncedTriage>,
    next_seq: u64,
    task: JoinHandle<()>,
}

impl TriageDebouncer {
    /// Spawn the debounce task on the current runtime.
    pub fn spawn(delay: Duration) -> Self {
        let (edit_tx, edit_rx) = mpsc::unbounded_channel();
        let (result_tx, result_rx) = watch::channel(DebouncedTriage::default());
        let task = tokio::spawn(run(edit_rx, result_tx, delay));
        Self {
            edits: edit_tx,
            results: result_rx,
            next_seq: 0,
            task,
        }
    }

    /// Record a description edit. Returns the edit's sequence number.
    pub fn submit(&mut self, description: impl Into<String>) -> u64 {
        self.next_seq += 1;
        let seq = self.next_seq;
        if self
            .edits
            .send(Edit {
                seq,
                description: description.into(),
            })
            .is_err()
        {
            tracing::debug!(seq, "triage debouncer task has stopped; edit dropped");
        }
        seq
    }

    pub fn subscribe(&self) -> watch::Receiver<DebouncedTriage> {
        self.results.clone()
    }

    pub fn latest(&self) -> DebouncedTriage {
        *self.results.borrow()
    }

    /// Sequence number of the most recent edit.
    pub fn current_seq(&self) -> u64 {
        self.next_seq
    }
}

impl Drop for TriageDebouncer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run(
    mut edits: mpsc::UnboundedReceiver<Edit>,
    results: watch::Sender<DebouncedTriage>,
    delay: Duration,
) {
    let mut pending: Option<Edit> = None;
    loop {
        match pending.take() {
            None => match edits.recv().await {
                Some(edit) => pending = Some(edit),
                None => break,
            },
            Some(edit) => {
                tokio::select! {
                    next = edits.recv() => match next {
                        Some(newer) => pending = Some(newer),
                        None => break,
                    },
                    _ = tokio::time::sleep(delay) => {
                        let published = DebouncedTriage {
                            seq: edit.seq,
                            triage: classify_if_ready(&edit.description),
                        };
                        if results.send(published).is_err() {
                            break;
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TRIAGE_DEBOUNCE;
    use crate::models::enums::{IncidentCategory, Urgency};

    #[tokio::test(start_paused = true)]
    async fn classifies_after_quiet_period() {
        let mut debouncer = TriageDebouncer::spawn(TRIAGE_DEBOUNCE);
        let mut rx = debouncer.subscribe();

        let seq = debouncer.submit("pasien sesak napas dan tidak sadar");
        rx.changed().await.unwrap();

        let result = *rx.borrow();
        assert_eq!(result.seq, seq);
        let triage = result.triage.unwrap();
        assert_eq!(triage.urgency, Urgency::Critical);
        assert_eq!(triage.category, IncidentCategory::GeneralEmergency);
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_published_before_the_window_elapses() {
        let mut debouncer = TriageDebouncer::spawn(TRIAGE_DEBOUNCE);
        let rx = debouncer.subscribe();

        debouncer.submit("ibu hamil mau melahirkan");
        tokio::time::sleep(TRIAGE_DEBOUNCE / 2).await;
        assert!(!rx.has_changed().unwrap());
        assert_eq!(debouncer.latest(), DebouncedTriage::default());

        tokio::time::sleep(TRIAGE_DEBOUNCE).await;
        assert!(rx.has_changed().unwrap());
        assert_eq!(debouncer.latest().seq, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn newer_edit_supersedes_pending_one() {
        let mut debouncer = TriageDebouncer::spawn(TRIAGE_DEBOUNCE);
        let mut rx = debouncer.subscribe();

        debouncer.submit("pasien tidak sadar");
        tokio::time::sleep(TRIAGE_DEBOUNCE / 5).await;
        let last = debouncer.submit("ibu hamil mau melahirkan");

        rx.changed().await.unwrap();
        let result = *rx.borrow_and_update();
        assert_eq!(result.seq, last);
        assert_eq!(
            result.triage.unwrap().category,
            IncidentCategory::PregnancyChildbirth
        );

        // The superseded edit never fires later.
        tokio::time::sleep(TRIAGE_DEBOUNCE * 4).await;
        assert!(!rx.has_changed().unwrap());
        assert_eq!(debouncer.current_seq(), last);
    }

    #[tokio::test(start_paused = true)]
    async fn short_description_publishes_no_classification() {
        let mut debouncer = TriageDebouncer::spawn(TRIAGE_DEBOUNCE);
        let mut rx = debouncer.subscribe();

        let seq = debouncer.submit("luka");
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), DebouncedTriage { seq, triage: None });
    }
}
