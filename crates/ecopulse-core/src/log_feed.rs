//! Bounded, most-recent-first status log and its message catalog.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Maximum number of entries the feed keeps.
pub const LOG_CAPACITY: usize = 7;

/// Number of catalog messages used to seed a fresh feed.
pub const SEED_COUNT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Info,
    Success,
    Process,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Info => "info",
            Category::Success => "success",
            Category::Process => "process",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Wall-clock `HH:MM:SS`.
    pub timestamp: String,
    pub message: String,
    pub category: Category,
}

impl LogEntry {
    pub fn new(timestamp: impl Into<String>, category: Category, message: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            message: message.into(),
            category,
        }
    }
}

/// A canned status message.
#[derive(Debug, Clone, Copy)]
pub struct Template {
    pub text: &'static str,
    pub category: Category,
}

const fn t(category: Category, text: &'static str) -> Template {
    Template { text, category }
}

/// Flavor-text messages picked by the periodic timer.
pub const CATALOG: [Template; 15] = [
    t(Category::Info, "Processing satellite imagery from 47 global stations"),
    t(Category::Success, "Carbon sequestration optimized in Amazon rainforest region"),
    t(Category::Success, "AI model updated - prediction accuracy: 99.94%"),
    t(Category::Process, "Detecting industrial emissions in Southeast Asia"),
    t(Category::Info, "Blockchain verification completed for 15,000 carbon credits"),
    t(Category::Process, "Quantum sensors deployed in Arctic monitoring stations"),
    t(Category::Info, "Real-time atmospheric pressure analysis across 6 continents"),
    t(Category::Process, "Neural network processing oceanic CO₂ absorption data"),
    t(Category::Success, "Partnership alert: New organizations joined EcoPulse network"),
    t(Category::Info, "Climate modeling complete - 2050 projections updated"),
    t(Category::Process, "Deep learning algorithms analyzing deforestation patterns"),
    t(Category::Success, "IoT sensors synchronized across 195 countries"),
    t(Category::Process, "Renewable energy optimization in progress - efficiency +12%"),
    t(Category::Info, "AI detecting anomalies in global temperature readings"),
    t(Category::Success, "Carbon capture technology efficiency increased by 8.5%"),
];

/// Most-recent-first log, never longer than [`LOG_CAPACITY`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogFeed {
    entries: Vec<LogEntry>,
}

impl LogFeed {
    pub fn new() -> Self {
        Self {
            entries: Vec::with_capacity(LOG_CAPACITY + 1),
        }
    }

    /// Feed holding the first [`SEED_COUNT`] catalog messages, all stamped
    /// with `timestamp`, in catalog order (the first message at the front).
    pub fn seeded(timestamp: &str) -> Self {
        let mut feed = Self::new();
        for tpl in CATALOG.iter().take(SEED_COUNT).rev() {
            feed.append(LogEntry::new(timestamp, tpl.category, tpl.text));
        }
        feed
    }

    /// Insert at the front and drop the oldest entries beyond capacity.
    pub fn append(&mut self, entry: LogEntry) -> &[LogEntry] {
        self.entries.insert(0, entry);
        self.entries.truncate(LOG_CAPACITY);
        &self.entries
    }

    /// Append a uniformly chosen catalog message. Repeats are allowed.
    pub fn append_random<R: Rng + ?Sized>(&mut self, rng: &mut R, timestamp: &str) -> &[LogEntry] {
        let tpl = CATALOG[rng.random_range(0..CATALOG.len())];
        self.append(LogEntry::new(timestamp, tpl.category, tpl.text))
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.first()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn entry(msg: &str) -> LogEntry {
        LogEntry::new("12:00:00", Category::Info, msg)
    }

    #[test]
    fn seeded_feed_lists_catalog_head_in_order() {
        let feed = LogFeed::seeded("08:00:00");
        assert_eq!(feed.len(), SEED_COUNT);
        for (i, e) in feed.entries().iter().enumerate() {
            assert_eq!(e.message, CATALOG[i].text);
            assert_eq!(e.category, CATALOG[i].category);
        }
    }

    #[test]
    fn five_seeds_then_three_appends() {
        let mut feed = LogFeed::new();
        for i in 0..5 {
            feed.append(entry(&format!("seed {i}")));
        }
        feed.append(entry("a"));
        feed.append(entry("b"));
        let out = feed.append(entry("c"));

        assert_eq!(out.len(), LOG_CAPACITY);
        assert_eq!(out[0].message, "c");
        assert_eq!(out[1].message, "b");
        assert_eq!(out[2].message, "a");
        assert_eq!(out[3].message, "seed 4");
        assert_eq!(out[6].message, "seed 1");
    }

    #[test]
    fn never_exceeds_capacity() {
        let mut feed = LogFeed::seeded("00:00:00");
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            feed.append_random(&mut rng, "00:00:01");
            assert!(feed.len() <= LOG_CAPACITY);
        }
        assert_eq!(feed.len(), LOG_CAPACITY);
        assert_eq!(feed.latest().unwrap().timestamp, "00:00:01");
    }

    #[test]
    fn random_messages_come_from_catalog() {
        let mut feed = LogFeed::new();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..50 {
            let latest = feed.append_random(&mut rng, "10:10:10")[0].clone();
            assert!(CATALOG
                .iter()
                .any(|t| t.text == latest.message && t.category == latest.category));
        }
    }
}
