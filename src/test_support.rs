use crate::clock::Clock;
use crate::commands::Services;
use crate::context::HomeContext;
use crate::directory::Directory;
use crate::error::{EvictError, Result};
use crate::policy::PolicyPublisher;
use crate::table::Item;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

type SleepHook = Box<dyn FnMut(usize) + Send>;

/// Clock that only moves when told to (or when something sleeps on it).
pub(crate) struct ManualClock {
    now: Mutex<DateTime<Utc>>,
    sleeps: Mutex<Vec<Duration>>,
    on_sleep: Mutex<Option<SleepHook>>,
}

impl ManualClock {
    pub(crate) fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
            sleeps: Mutex::new(Vec::new()),
            on_sleep: Mutex::new(None),
        }
    }

    pub(crate) fn starting_2024() -> Self {
        Self::new(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap())
    }

    pub(crate) fn advance(&self, delta: TimeDelta) {
        let mut now = self.now.lock().unwrap();
        *now += delta;
    }

    pub(crate) fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }

    /// Call `hook` with the 1-based sleep count after every sleep.
    pub(crate) fn on_sleep(&self, hook: impl FnMut(usize) + Send + 'static) {
        *self.on_sleep.lock().unwrap() = Some(Box::new(hook));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }

    fn sleep(&self, duration: Duration) {
        let count = {
            let mut sleeps = self.sleeps.lock().unwrap();
            sleeps.push(duration);
            sleeps.len()
        };
        self.advance(TimeDelta::from_std(duration).unwrap());
        if let Some(hook) = self.on_sleep.lock().unwrap().as_mut() {
            hook(count);
        }
    }
}

pub(crate) fn item(value: Value) -> Item {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {}", other),
    }
}

/// Directory backed by a fixed map.
pub(crate) struct StaticDirectory {
    users: HashMap<String, String>,
}

impl StaticDirectory {
    pub(crate) fn new(users: &[(&str, &str)]) -> Self {
        Self {
            users: users
                .iter()
                .map(|(id, name)| (id.to_string(), name.to_string()))
                .collect(),
        }
    }
}

impl Directory for StaticDirectory {
    fn username_for_id(&self, user_id: &str) -> Result<String> {
        self.users.get(user_id).cloned().ok_or_else(|| {
            EvictError::UpstreamFailure(format!("user '{}' not found", user_id))
        })
    }
}

/// Publisher that remembers every list it was asked to publish.
#[derive(Default)]
pub(crate) struct RecordingPublisher {
    published: Mutex<Vec<Vec<String>>>,
}

impl RecordingPublisher {
    pub(crate) fn published(&self) -> Vec<Vec<String>> {
        self.published.lock().unwrap().clone()
    }
}

impl PolicyPublisher for RecordingPublisher {
    fn update_policy(&self, excluded_users: &[String]) -> Result<String> {
        self.published
            .lock()
            .unwrap()
            .push(excluded_users.to_vec());
        crate::policy::render_policy(excluded_users)
    }
}

/// Publisher that always fails.
pub(crate) struct FailingPublisher;

impl PolicyPublisher for FailingPublisher {
    fn update_policy(&self, _excluded_users: &[String]) -> Result<String> {
        Err(EvictError::UpstreamFailure(
            "policy store rejected the update".to_string(),
        ))
    }
}

/// An initialized home in a temp directory, for identity store `d-123`.
pub(crate) fn create_test_home() -> (TempDir, HomeContext) {
    let temp_dir = TempDir::new().unwrap();
    let ctx = HomeContext::resolve_from(temp_dir.path()).unwrap();
    crate::commands::init::scaffold_home(&ctx, Some("d-123")).unwrap();
    (temp_dir, ctx)
}

/// Open `ctx` on a manual clock so lock waits and retries do not block.
pub(crate) fn open_test_services(ctx: &HomeContext) -> (Arc<ManualClock>, Services) {
    let clock = Arc::new(ManualClock::starting_2024());
    let services = Services::open_with_clock(ctx, clock.clone()).unwrap();
    (clock, services)
}
