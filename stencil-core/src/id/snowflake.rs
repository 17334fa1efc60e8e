use crate::{Clock, Result, StencilError, SystemClock};
use parking_lot::Mutex;
use sha1::{Digest, Sha1};
use std::{
    sync::{Arc, LazyLock},
    time::Duration,
};

/// Identifies the generating process inside a cluster: 5 bits of machine and 5 bits of
/// process.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorkerId {
    pub machine: u8,
    pub process: u8,
}

impl WorkerId {
    pub const MAX: u8 = 31;

    pub fn new(machine: u8, process: u8) -> Result<Self> {
        if machine > Self::MAX || process > Self::MAX {
            return Err(StencilError::invalid_state(format!(
                "worker id ({}, {}) out of range, both parts must be <= {}",
                machine,
                process,
                Self::MAX
            )));
        }
        Ok(Self { machine, process })
    }

    /// Machine from the SHA-1 of the host name, process from the pid.
    pub fn detect() -> Self {
        let host = hostname::get().unwrap_or_else(|e| {
            log::warn!("Could not read the host name, machine id defaults to 0: {e}");
            Default::default()
        });
        let digest = Sha1::digest(host.as_encoded_bytes());
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[..8]);
        Self {
            machine: (u64::from_le_bytes(bytes) % 32) as u8,
            process: (std::process::id() % 32) as u8,
        }
    }

    /// The 10 bit worker field.
    pub fn bits(&self) -> u16 {
        ((self.machine as u16) << 5) | self.process as u16
    }
}

/// Behavior when the clock reports a time earlier than the last generated id.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockRegressionPolicy {
    #[default]
    Fail,
    /// Sleep until the clock catches up, failing when the gap exceeds `max`.
    Wait { max: Duration },
}

/// Fields packed into an id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnowflakeParts {
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    pub worker: WorkerId,
    pub sequence: u16,
}

struct GeneratorState {
    last_timestamp: u64,
    sequence: u16,
}

/// Time ordered 64 bit identifiers.
///
/// Layout: 41 bits of milliseconds since [`SnowflakeGenerator::DEFAULT_EPOCH`], 5 bits
/// machine, 5 bits process, 12 bits sequence.
pub struct SnowflakeGenerator {
    worker: WorkerId,
    epoch: u64,
    clock: Arc<dyn Clock>,
    policy: ClockRegressionPolicy,
    state: Mutex<GeneratorState>,
}

static DEFAULT_GENERATOR: LazyLock<Arc<SnowflakeGenerator>> =
    LazyLock::new(|| Arc::new(SnowflakeGenerator::new(WorkerId::detect())));

impl SnowflakeGenerator {
    /// 2024-01-01 00:00:00 UTC
    pub const DEFAULT_EPOCH: u64 = 1_704_067_200_000;
    pub const MAX_SEQUENCE: u16 = 4095;
    const TIMESTAMP_BITS: u32 = 41;

    pub fn new(worker: WorkerId) -> Self {
        Self {
            worker,
            epoch: Self::DEFAULT_EPOCH,
            clock: Arc::new(SystemClock),
            policy: Default::default(),
            state: Mutex::new(GeneratorState {
                last_timestamp: 0,
                sequence: 0,
            }),
        }
    }

    /// Generator shared by every configuration that does not provide its own.
    pub fn shared() -> Arc<SnowflakeGenerator> {
        DEFAULT_GENERATOR.clone()
    }

    pub fn with_epoch(mut self, epoch: u64) -> Self {
        self.epoch = epoch;
        self
    }
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
    pub fn with_policy(mut self, policy: ClockRegressionPolicy) -> Self {
        self.policy = policy;
        self
    }
    pub fn worker(&self) -> WorkerId {
        self.worker
    }
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn next_id(&self) -> Result<i64> {
        let mut state = self.state.lock();
        let mut timestamp = self.clock.now_millis();
        if timestamp < state.last_timestamp {
            timestamp = self.recover_regression(state.last_timestamp, timestamp)?;
        }
        if timestamp == state.last_timestamp {
            state.sequence = (state.sequence + 1) & Self::MAX_SEQUENCE;
            if state.sequence == 0 {
                timestamp = self.wait_next_millis(state.last_timestamp);
            }
        } else {
            state.sequence = 0;
        }
        state.last_timestamp = timestamp;
        let Some(elapsed) = timestamp
            .checked_sub(self.epoch)
            .filter(|v| *v < 1 << Self::TIMESTAMP_BITS)
        else {
            return Err(StencilError::invalid_state(format!(
                "timestamp {} is outside the range of the id epoch {}",
                timestamp, self.epoch
            )));
        };
        Ok(((elapsed << 22) | ((self.worker.bits() as u64) << 12) | state.sequence as u64) as i64)
    }

    /// Next id as decimal text.
    pub fn next_id_string(&self) -> Result<String> {
        self.next_id().map(|v| v.to_string())
    }

    /// Split an id produced with this generator's epoch.
    pub fn decompose(&self, id: i64) -> SnowflakeParts {
        let id = id as u64;
        SnowflakeParts {
            timestamp: (id >> 22) + self.epoch,
            worker: WorkerId {
                machine: ((id >> 17) & 0x1F) as u8,
                process: ((id >> 12) & 0x1F) as u8,
            },
            sequence: (id & 0xFFF) as u16,
        }
    }

    fn recover_regression(&self, last_timestamp: u64, mut timestamp: u64) -> Result<u64> {
        let gap = last_timestamp - timestamp;
        match self.policy {
            ClockRegressionPolicy::Wait { max } if gap <= max.as_millis() as u64 => {
                log::warn!("Clock moved backwards by {gap} ms, waiting for it to catch up");
                while timestamp < last_timestamp {
                    self.clock
                        .sleep(Duration::from_millis(last_timestamp - timestamp));
                    timestamp = self.clock.now_millis();
                }
                Ok(timestamp)
            }
            _ => Err(StencilError::ClockRegression { millis: gap }.into()),
        }
    }

    fn wait_next_millis(&self, last_timestamp: u64) -> u64 {
        let mut timestamp = self.clock.now_millis();
        while timestamp <= last_timestamp {
            self.clock.sleep(Duration::from_micros(100));
            timestamp = self.clock.now_millis();
        }
        timestamp
    }
}
