//! Wait coordinator: races completions against a shared deadline.
//!
//! Every `...and_await...` operation boils down to one of the functions in
//! this module: one deadline, one or more armed one-shot receivers, and an
//! aggregation rule for the outcomes.
//!
//! ```text
//! Ack mode (boolean):
//!   single  → true  iff the ack arrived before the deadline
//!   multi   → true  iff every targeted receiver acked before the deadline
//!
//! Answer mode (value):
//!   single  → Some(decoded) iff a decodable answer arrived in time
//!   multi   → map of id → decoded, containing exactly the receivers whose
//!             decodable answer arrived in time
//! ```
//!
//! Multi-target waits resolve when every targeted slot is determined: a
//! completion that fired before the deadline still counts even if it is
//! observed after slower receivers were waited on, because the one-shot
//! channel buffers the value.
//!
//! A superseded wait (its slot re-armed underneath it) observes a closed
//! channel. It is deliberately held until the shared deadline rather than
//! resolved early, preserving the "orphaned waits time out" contract.

use crate::dispatch::decode::decode_answer;
use crate::receiver::ReceiverId;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use tokio::sync::oneshot;
use tokio::time::{self, Instant};

/// Race a single completion against the deadline.
///
/// `Some(value)` if delivered in time, `None` at the deadline otherwise.
async fn recv_or_deadline<T>(rx: oneshot::Receiver<T>, deadline: Instant) -> Option<T> {
    match time::timeout_at(deadline, rx).await {
        Ok(Ok(value)) => Some(value),
        Ok(Err(_)) => {
            // Channel closed: the wait was superseded or armed on the
            // inert placeholder. Hold until the deadline.
            time::sleep_until(deadline).await;
            None
        }
        Err(_) => None,
    }
}

/// Single-target ack wait.
pub(crate) async fn await_ack(rx: oneshot::Receiver<()>, deadline: Instant) -> bool {
    recv_or_deadline(rx, deadline).await.is_some()
}

/// Multi-target ack wait: true iff every targeted receiver acked before the
/// shared deadline. Partial success is not exposed.
pub(crate) async fn await_all_acks(
    slots: Vec<(ReceiverId, oneshot::Receiver<()>)>,
    deadline: Instant,
) -> bool {
    let mut all_acked = true;
    for (id, rx) in slots {
        if recv_or_deadline(rx, deadline).await.is_none() {
            tracing::debug!(receiver = %id, "ack wait expired");
            all_acked = false;
        }
    }
    all_acked
}

/// Single-target answer wait: decode the raw answer if it arrived in time.
pub(crate) async fn await_answer<A: DeserializeOwned>(
    id: &ReceiverId,
    rx: oneshot::Receiver<String>,
    deadline: Instant,
) -> Option<A> {
    recv_or_deadline(rx, deadline)
        .await
        .and_then(|raw| decode_answer(id, &raw))
}

/// Multi-target answer wait.
///
/// The result contains exactly the receivers whose decodable answer arrived
/// before the shared deadline; the others are simply absent. The wait never
/// fails as a whole.
pub(crate) async fn await_all_answers<A: DeserializeOwned>(
    slots: Vec<(ReceiverId, oneshot::Receiver<String>)>,
    deadline: Instant,
) -> HashMap<ReceiverId, A> {
    let mut answers = HashMap::new();
    for (id, rx) in slots {
        match recv_or_deadline(rx, deadline).await {
            Some(raw) => {
                if let Some(value) = decode_answer(&id, &raw) {
                    answers.insert(id, value);
                }
            }
            None => {
                tracing::debug!(receiver = %id, "answer wait expired");
            }
        }
    }
    answers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::receiver::CompletionSlot;
    use std::time::Duration;

    const WAIT: Duration = Duration::from_millis(100);

    #[tokio::test(start_paused = true)]
    async fn ack_delivered_before_deadline_is_true() {
        let slot = CompletionSlot::new();
        let rx = slot.arm();
        slot.deliver(());

        assert!(await_ack(rx, Instant::now() + WAIT).await);
    }

    #[tokio::test(start_paused = true)]
    async fn ack_never_delivered_is_false_at_deadline() {
        let slot: CompletionSlot<()> = CompletionSlot::new();
        let rx = slot.arm();

        let start = Instant::now();
        assert!(!await_ack(rx, start + WAIT).await);
        assert!(Instant::now() >= start + WAIT);
    }

    #[tokio::test(start_paused = true)]
    async fn superseded_wait_resolves_at_its_own_deadline() {
        let slot = CompletionSlot::new();
        let orphaned = slot.arm();
        let current = slot.arm();
        slot.deliver(());

        let start = Instant::now();
        assert!(!await_ack(orphaned, start + WAIT).await);
        // Not resolved early: the orphaned wait runs its full deadline.
        assert!(Instant::now() >= start + WAIT);

        assert!(await_ack(current, Instant::now() + WAIT).await);
    }

    #[tokio::test(start_paused = true)]
    async fn all_acks_requires_every_receiver() {
        let slots: Vec<CompletionSlot<()>> =
            (0..3).map(|_| CompletionSlot::new()).collect();
        let armed: Vec<_> = slots
            .iter()
            .enumerate()
            .map(|(i, s)| (ReceiverId::new(format!("r{i}")), s.arm()))
            .collect();

        // Only two of three ack.
        slots[0].deliver(());
        slots[2].deliver(());

        assert!(!await_all_acks(armed, Instant::now() + WAIT).await);
    }

    #[tokio::test(start_paused = true)]
    async fn partial_answers_exclude_silent_and_garbage() {
        let a = CompletionSlot::new();
        let b = CompletionSlot::new();
        let c = CompletionSlot::new();
        let d = CompletionSlot::new();
        let armed = vec![
            (ReceiverId::from("a"), a.arm()),
            (ReceiverId::from("b"), b.arm()),
            (ReceiverId::from("c"), c.arm()),
            (ReceiverId::from("d"), d.arm()),
        ];

        a.deliver("101".to_string());
        c.deliver("103".to_string());
        d.deliver("definitely not json".to_string());

        let answers: HashMap<ReceiverId, i32> =
            await_all_answers(armed, Instant::now() + WAIT).await;

        let mut ids: Vec<_> = answers.keys().cloned().collect();
        ids.sort();
        assert_eq!(ids, vec!["a".into(), "c".into()]);
        assert_eq!(answers[&"a".into()], 101);
        assert_eq!(answers[&"c".into()], 103);
    }

    #[tokio::test(start_paused = true)]
    async fn late_observation_of_early_completion_still_counts() {
        // Receiver "b" acks immediately but is observed after "a", which
        // never acks and burns the whole deadline. The buffered one-shot
        // value must still count for "b".
        let a: CompletionSlot<()> = CompletionSlot::new();
        let b = CompletionSlot::new();
        let armed = vec![
            (ReceiverId::from("a"), a.arm()),
            (ReceiverId::from("b"), b.arm()),
        ];
        b.deliver(());

        let result = await_all_acks(armed, Instant::now() + WAIT).await;
        // "a" timed out, so the aggregate is false, but no panic/hang: "b"
        // resolved from its buffered completion after the deadline passed.
        assert!(!result);
    }
}
