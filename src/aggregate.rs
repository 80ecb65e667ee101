use tokio::sync::Mutex;

/// Index-addressed result slots, one per input row. This is the only mutable
/// state shared across workers; everything else is task-local. Workers only
/// ever see `record`, never the slots themselves, and a slot is written
/// whole-value in one critical section so no partial row is observable.
pub struct Aggregator<V> {
    slots: Mutex<Vec<Option<V>>>,
}

impl<V: Clone + Send> Aggregator<V> {
    pub fn new(len: usize) -> Self {
        Self {
            slots: Mutex::new(vec![None; len]),
        }
    }

    pub async fn record(&self, index: usize, value: V) {
        let mut slots = self.slots.lock().await;
        match slots.get_mut(index) {
            Some(slot) => *slot = Some(value),
            None => log::error!("result index {index} out of range, dropping"),
        }
    }

    /// Drains the slots in original row order. Unwritten slots (which the
    /// scheduler contract rules out, but an out-of-range record could cause)
    /// coerce to `fallback`.
    pub async fn finish(&self, fallback: V) -> Vec<V> {
        let mut slots = self.slots.lock().await;
        slots
            .drain(..)
            .map(|slot| slot.unwrap_or_else(|| fallback.clone()))
            .collect()
    }
}
