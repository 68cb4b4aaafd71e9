use autoscale_cuckoo_filter::CuckooFilter;
use moka::future::Cache;
use std::sync::RwLock;
use std::time::Duration;
use tracing::info;

/// Expected capacity and false-positive rate.
/// Tune these based on real user counts.
const FILTER_CAPACITY: usize = 100_000;
const FALSE_POSITIVE_RATE: f64 = 0.001;

const CACHE_CAPACITY: u64 = 500_000;
const CACHE_TTL: Duration = Duration::from_secs(86_400);

#[inline]
fn normalize(email: &str) -> String {
    email.trim().to_lowercase()
}

/// In-memory view of registered emails.
///
/// The cuckoo filter answers "definitely free" without touching the store;
/// the cache answers "definitely taken" for recently seen emails. Anything
/// else falls through to the store.
pub struct EmailRegistry {
    filter: RwLock<CuckooFilter<String>>,
    taken: Cache<String, ()>,
}

impl Default for EmailRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EmailRegistry {
    pub fn new() -> Self {
        Self {
            filter: RwLock::new(CuckooFilter::new(FILTER_CAPACITY, FALSE_POSITIVE_RATE)),
            taken: Cache::builder()
                .max_capacity(CACHE_CAPACITY)
                .time_to_live(CACHE_TTL)
                .build(),
        }
    }

    /// False positives possible, false negatives not.
    pub fn might_exist(&self, email: &str) -> bool {
        let email = normalize(email);
        self.filter
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains(&email)
    }

    pub async fn is_taken(&self, email: &str) -> bool {
        self.taken.get(&normalize(email)).await.is_some()
    }

    pub async fn mark_taken(&self, email: &str) {
        let email = normalize(email);
        self.filter
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .add(&email);
        self.taken.insert(email, ()).await;
    }

    pub async fn forget(&self, email: &str) {
        let email = normalize(email);
        self.filter
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(&email);
        self.taken.invalidate(&email).await;
    }

    /// Load every known email.
    pub async fn warmup<'a>(&self, emails: impl IntoIterator<Item = &'a str>) {
        let emails: Vec<String> = emails.into_iter().map(normalize).collect();

        {
            let mut filter = self
                .filter
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            for email in &emails {
                filter.add(email);
            }
        }

        let total = emails.len();
        let inserts: Vec<_> = emails
            .into_iter()
            .map(|email| self.taken.insert(email, ()))
            .collect();
        futures::future::join_all(inserts).await;

        info!(total, "Email registry warmup complete");
    }
}
