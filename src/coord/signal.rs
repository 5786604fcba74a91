use std::collections::BTreeMap;

/// Named completion signals shared between sections.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    /// The hero name finished its letter reveal; gates the dot and the navigation bar.
    NameReady,
    /// The portfolio header reached its hold stage.
    PortfolioRevealComplete,
    /// The letter dot came to rest.
    DotAnimationComplete,
    /// The card stack crossed its threshold; the sibling section fades in.
    EngineerReveal,
}

impl Topic {
    /// Every topic, in declaration order.
    pub const ALL: [Topic; 4] = [
        Topic::NameReady,
        Topic::PortfolioRevealComplete,
        Topic::DotAnimationComplete,
        Topic::EngineerReveal,
    ];

    fn index(self) -> usize {
        match self {
            Self::NameReady => 0,
            Self::PortfolioRevealComplete => 1,
            Self::DotAnimationComplete => 2,
            Self::EngineerReveal => 3,
        }
    }
}

/// Monotonic flag: once set it stays set until an explicit reset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct CompletionSignal {
    set: bool,
    epoch: u64,
    rises: u64,
}

impl CompletionSignal {
    /// Current value.
    pub fn is_set(&self) -> bool {
        self.set
    }

    /// Number of explicit resets so far; identifies one activation lifetime.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

/// One monotonic signal per [`Topic`].
///
/// Producers publish after their terminal visual state has been written to the driver;
/// consumers either read the flag or hold a [`Subscription`] to observe rising edges.
#[derive(Clone, Debug, Default)]
pub struct SignalBus {
    signals: [CompletionSignal; 4],
}

impl SignalBus {
    /// All signals cleared.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `topic`. Returns `true` on a rising edge, `false` when it was already set.
    pub fn publish(&mut self, topic: Topic) -> bool {
        let sig = &mut self.signals[topic.index()];
        if sig.set {
            return false;
        }
        sig.set = true;
        sig.rises += 1;
        tracing::debug!(?topic, epoch = sig.epoch, "signal published");
        true
    }

    /// Clear `topic` on explicit deactivation, starting a new activation lifetime.
    pub fn reset(&mut self, topic: Topic) {
        let sig = &mut self.signals[topic.index()];
        if sig.set {
            sig.set = false;
            sig.epoch += 1;
            tracing::debug!(?topic, epoch = sig.epoch, "signal reset");
        }
    }

    /// Current value of `topic`.
    pub fn is_set(&self, topic: Topic) -> bool {
        self.signals[topic.index()].is_set()
    }

    /// Full signal state of `topic`.
    pub fn signal(&self, topic: Topic) -> CompletionSignal {
        self.signals[topic.index()]
    }

    /// Start observing rising edges of `topic` from now on.
    pub fn subscribe(&self, topic: Topic) -> Subscription {
        Subscription {
            topic,
            seen_rises: self.signals[topic.index()].rises,
        }
    }

    /// Values of every topic, for comparing end states.
    pub fn snapshot(&self) -> BTreeMap<Topic, bool> {
        Topic::ALL.iter().map(|t| (*t, self.is_set(*t))).collect()
    }
}

/// Consumer-side cursor over one topic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Subscription {
    topic: Topic,
    seen_rises: u64,
}

impl Subscription {
    /// Observed topic.
    pub fn topic(&self) -> Topic {
        self.topic
    }

    /// Return `true` once per rising edge published since the last poll.
    pub fn poll_rising(&mut self, bus: &SignalBus) -> bool {
        let rises = bus.signals[self.topic.index()].rises;
        if rises > self.seen_rises {
            self.seen_rises = rises;
            return true;
        }
        false
    }
}

#[cfg(test)]
#[path = "../../tests/unit/coord/signal.rs"]
mod tests;
