// ABOUTME: Test support utilities.
// ABOUTME: Fake CPI, fake agent, recording stage and fake clock sharing one call log.

#![allow(dead_code)]

use async_trait::async_trait;
use bosun::agent::{AgentClient, AgentError, AgentState};
use bosun::cloud::{Cloud, CloudError, CloudErrorKind, Deletion};
use bosun::deploy::{Clock, DeploymentManager, ManagerFactory, PingPolicy, Stage, StageOutcome};
use bosun::state::{
    DeploymentState, DiskRepo, MemoryStateStore, StateStore, StemcellRepo, VmRepo,
};
use bosun::types::{DiskCid, StemcellCid, VmCid};
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Once};
use std::time::{Duration, Instant};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env().add_directive("bosun=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Ordered record of every agent and CPI call, shared between fakes.
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, call: impl Into<String>) {
        self.0.lock().push(call.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    /// Calls other than `ping`, which repeats a timing-dependent number of times.
    pub fn without_pings(&self) -> Vec<String> {
        self.calls().into_iter().filter(|c| c != "ping").collect()
    }

    pub fn contains(&self, call: &str) -> bool {
        self.0.lock().iter().any(|c| c == call)
    }

    pub fn count(&self, call: &str) -> usize {
        self.0.lock().iter().filter(|c| *c == call).count()
    }

    pub fn clear(&self) {
        self.0.lock().clear();
    }
}

/// What a scripted CPI delete should do.
#[derive(Debug, Clone)]
pub enum Outcome {
    Deleted,
    NotFound,
    /// Fail with the given provider error type.
    Error(&'static str),
}

pub struct CloudScript {
    pub has_vm: bool,
    pub delete_vm: Outcome,
    pub delete_disk: Outcome,
    pub delete_stemcell: Outcome,
}

impl Default for CloudScript {
    fn default() -> Self {
        Self {
            has_vm: true,
            delete_vm: Outcome::Deleted,
            delete_disk: Outcome::Deleted,
            delete_stemcell: Outcome::Deleted,
        }
    }
}

pub struct FakeCloud {
    log: CallLog,
    pub script: Mutex<CloudScript>,
}

impl FakeCloud {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            script: Mutex::new(CloudScript::default()),
        }
    }

    fn outcome(method: &str, outcome: Outcome) -> Result<Deletion, CloudError> {
        match outcome {
            Outcome::Deleted => Ok(Deletion::Deleted),
            Outcome::NotFound => Ok(Deletion::NotFound),
            Outcome::Error(error_type) => Err(CloudError::Cpi {
                method: method.to_string(),
                error_type: error_type.to_string(),
                message: "scripted failure".to_string(),
                ok_to_retry: false,
            }),
        }
    }
}

#[async_trait]
impl Cloud for FakeCloud {
    async fn has_vm(&self, cid: &VmCid) -> Result<bool, CloudError> {
        self.log.push(format!("has_vm {}", cid));
        Ok(self.script.lock().has_vm)
    }

    async fn delete_vm(&self, cid: &VmCid) -> Result<Deletion, CloudError> {
        self.log.push(format!("delete_vm {}", cid));
        let outcome = self.script.lock().delete_vm.clone();
        Self::outcome("delete_vm", outcome)
    }

    async fn delete_disk(&self, cid: &DiskCid) -> Result<Deletion, CloudError> {
        self.log.push(format!("delete_disk {}", cid));
        let outcome = self.script.lock().delete_disk.clone();
        Self::outcome("delete_disk", outcome)
    }

    async fn delete_stemcell(&self, cid: &StemcellCid) -> Result<Deletion, CloudError> {
        self.log.push(format!("delete_stemcell {}", cid));
        let outcome = self.script.lock().delete_stemcell.clone();
        Self::outcome("delete_stemcell", outcome)
    }
}

pub struct AgentScript {
    pub reachable: bool,
    /// Pings that fail before the agent starts answering.
    pub ping_failures: usize,
    /// Pings never resolve, like an agent that accepts but never replies.
    pub ping_hangs: bool,
    pub disks: Vec<String>,
    /// Job states returned by successive `get_state` calls; the last repeats.
    pub states: VecDeque<String>,
    /// Method that answers with an exception.
    pub fail_on: Option<&'static str>,
}

impl Default for AgentScript {
    fn default() -> Self {
        Self {
            reachable: true,
            ping_failures: 0,
            ping_hangs: false,
            disks: Vec::new(),
            states: VecDeque::from(vec!["running".to_string()]),
            fail_on: None,
        }
    }
}

pub struct FakeAgent {
    log: CallLog,
    pub script: Mutex<AgentScript>,
}

impl FakeAgent {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            script: Mutex::new(AgentScript::default()),
        }
    }

    fn call(&self, method: &'static str, call: String) -> Result<(), AgentError> {
        self.log.push(call);
        if self.script.lock().fail_on == Some(method) {
            return Err(AgentError::Exception {
                method: method.to_string(),
                message: "scripted failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl AgentClient for FakeAgent {
    async fn ping(&self) -> Result<String, AgentError> {
        self.log.push("ping");
        let hangs = {
            let mut script = self.script.lock();
            if script.reachable && !script.ping_hangs && script.ping_failures == 0 {
                return Ok("pong".to_string());
            }
            script.ping_failures = script.ping_failures.saturating_sub(1);
            script.ping_hangs
        };
        if hangs {
            std::future::pending::<()>().await;
        }
        Err(AgentError::Timeout {
            method: "ping".to_string(),
            after: Duration::from_millis(10),
        })
    }

    async fn run_script(&self, name: &str, _params: &Map<String, Value>) -> Result<(), AgentError> {
        self.call("run_script", format!("run_script {}", name))
    }

    async fn drain(&self, reason: &str) -> Result<(), AgentError> {
        self.call("drain", format!("drain {}", reason))
    }

    async fn stop(&self) -> Result<(), AgentError> {
        self.call("stop", "stop".to_string())
    }

    async fn start(&self) -> Result<(), AgentError> {
        self.call("start", "start".to_string())
    }

    async fn get_state(&self) -> Result<AgentState, AgentError> {
        self.call("get_state", "get_state".to_string())?;
        let mut script = self.script.lock();
        let state = if script.states.len() > 1 {
            script.states.pop_front()
        } else {
            script.states.front().cloned()
        };
        Ok(AgentState::new(state.unwrap_or_else(|| "unknown".to_string())))
    }

    async fn list_disk(&self) -> Result<Vec<DiskCid>, AgentError> {
        self.call("list_disk", "list_disk".to_string())?;
        Ok(self
            .script
            .lock()
            .disks
            .iter()
            .map(|d| DiskCid::new(d.as_str()))
            .collect())
    }

    async fn unmount_disk(&self, cid: &DiskCid) -> Result<(), AgentError> {
        self.call("unmount_disk", format!("unmount_disk {}", cid))
    }
}

/// Records `(stage name, outcome)` pairs in order.
#[derive(Default)]
pub struct RecordingStage {
    events: Mutex<Vec<(String, String)>>,
}

impl RecordingStage {
    pub fn events(&self) -> Vec<(String, String)> {
        self.events.lock().clone()
    }

    pub fn names(&self) -> Vec<String> {
        self.events.lock().iter().map(|(n, _)| n.clone()).collect()
    }

    pub fn outcome_of(&self, name: &str) -> Option<String> {
        self.events
            .lock()
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, o)| o.clone())
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl Stage for RecordingStage {
    fn begin(&self, _name: &str) {}

    fn finish(&self, name: &str, outcome: StageOutcome<'_>, _elapsed: Duration) {
        let outcome = match outcome {
            StageOutcome::Done => "done",
            StageOutcome::Skipped(_) => "skipped",
            StageOutcome::Failed(_) => "failed",
        };
        self.events.lock().push((name.to_string(), outcome.to_string()));
    }
}

/// Clock whose sleeps advance time instantly.
pub struct FakeClock {
    origin: Instant,
    offset: Mutex<Duration>,
}

impl Default for FakeClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }
}

impl FakeClock {
    pub fn elapsed(&self) -> Duration {
        *self.offset.lock()
    }
}

#[async_trait]
impl Clock for FakeClock {
    fn now(&self) -> Instant {
        self.origin + *self.offset.lock()
    }

    async fn sleep(&self, duration: Duration) {
        *self.offset.lock() += duration;
    }
}

/// Fakes wired around one state store.
pub struct Harness {
    pub log: CallLog,
    pub cloud: Arc<FakeCloud>,
    pub agent: Arc<FakeAgent>,
    pub clock: Arc<FakeClock>,
    pub store: Arc<dyn StateStore>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_store(Arc::new(MemoryStateStore::default()))
    }

    pub fn with_store(store: Arc<dyn StateStore>) -> Self {
        init_tracing();
        let log = CallLog::default();
        Self {
            cloud: Arc::new(FakeCloud::new(log.clone())),
            agent: Arc::new(FakeAgent::new(log.clone())),
            clock: Arc::new(FakeClock::default()),
            log,
            store,
        }
    }

    /// A harness whose state records VM `v1`, disk `d1` and stemcell `s1`
    /// as current, with the agent reporting `d1` mounted.
    pub fn with_deployment() -> Self {
        let harness = Self::new();
        harness.seed_vm("v1");
        harness.seed_disk("d1", true);
        harness.seed_stemcell("s1", true);
        harness.agent.script.lock().disks = vec!["d1".to_string()];
        harness
    }

    pub fn seed_vm(&self, cid: &str) {
        VmRepo::new(Arc::clone(&self.store))
            .update_current(&VmCid::new(cid))
            .unwrap();
    }

    pub fn seed_disk(&self, cid: &str, current: bool) {
        let repo = DiskRepo::new(Arc::clone(&self.store));
        let record = repo.save(&DiskCid::new(cid), 1024, Map::new()).unwrap();
        if current {
            repo.update_current(&record.id).unwrap();
        }
    }

    pub fn seed_stemcell(&self, cid: &str, current: bool) {
        let repo = StemcellRepo::new(Arc::clone(&self.store));
        let record = repo
            .save("ubuntu-jammy", "1.0", &StemcellCid::new(cid), 2)
            .unwrap();
        if current {
            repo.update_current(&record.id).unwrap();
        }
    }

    pub fn factory(&self) -> ManagerFactory {
        ManagerFactory::new(
            Arc::clone(&self.cloud) as Arc<dyn Cloud>,
            Arc::clone(&self.agent) as Arc<dyn AgentClient>,
            Arc::clone(&self.store),
        )
        .ping_policy(PingPolicy::new(
            Duration::from_secs(1),
            Duration::from_millis(100),
        ))
        .clock(Arc::clone(&self.clock) as Arc<dyn Clock>)
    }

    pub fn manager(&self) -> DeploymentManager {
        self.factory().deployment_manager()
    }

    pub fn state(&self) -> DeploymentState {
        self.store.load().unwrap()
    }

    pub fn cloud_error_type(kind: CloudErrorKind) -> &'static str {
        match kind {
            CloudErrorKind::VmNotFound => CloudErrorKind::VM_NOT_FOUND,
            CloudErrorKind::DiskNotFound => CloudErrorKind::DISK_NOT_FOUND,
            CloudErrorKind::StemcellNotFound => CloudErrorKind::STEMCELL_NOT_FOUND,
            CloudErrorKind::Provider | CloudErrorKind::Transport => "Bosh::Clouds::CloudError",
        }
    }
}
