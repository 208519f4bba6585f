use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{error, info};

use crate::arena::ArenaTemplate;
use crate::client::{ArenaApi, CreationResult};
use crate::config::ScheduleConfig;
use crate::error::Result;
use crate::schedule;

/// Courtesy delay between consecutive creation calls.
pub const RATE_LIMIT_DELAY: Duration = Duration::from_secs(60);

/// Injectable inter-call delay so tests can run the full schedule without
/// wall-clock waits.
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self, duration: Duration);
}

pub struct TokioPacer;

#[async_trait]
impl Pacer for TokioPacer {
    async fn pause(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotReport {
    pub index: u32,
    pub start_time: DateTime<Utc>,
    pub result: CreationResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Completed,
    /// A transport fault cut the run short; later slots were never attempted.
    Aborted,
}

/// Per-slot outcomes in slot order, plus how the run ended. The caller maps
/// this to logging and an exit code.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub slots: Vec<SlotReport>,
    pub status: RunStatus,
}

impl RunReport {
    pub fn created(&self) -> usize {
        self.count(|r| matches!(r, CreationResult::Created { .. }))
    }

    pub fn rejected(&self) -> usize {
        self.count(|r| matches!(r, CreationResult::Rejected { .. }))
    }

    fn count(&self, pred: impl Fn(&CreationResult) -> bool) -> usize {
        self.slots.iter().filter(|s| pred(&s.result)).count()
    }
}

/// Create the whole schedule, strictly sequentially.
///
/// Each slot's payload carries the URL of the most recent successful
/// creation; rejections leave the carried link untouched. A transport fault
/// is recorded on its slot and aborts the remainder, preserving the results
/// gathered so far.
pub async fn run<A: ArenaApi + ?Sized, P: Pacer + ?Sized>(
    config: &ScheduleConfig,
    template: &ArenaTemplate,
    api: &A,
    pacer: &P,
    now: DateTime<Utc>,
) -> Result<RunReport> {
    config.validate()?;

    let first_start = schedule::next_aligned_hour(now, config.interval_hours);
    let total_slots = config.total_slots();
    info!(
        total_slots,
        team_id = %config.team_id,
        first_start = %first_start,
        dry_run = config.dry_run,
        "scheduling arenas"
    );

    let mut previous_link: Option<String> = None;
    let mut slots = Vec::with_capacity(total_slots as usize);

    for index in 0..total_slots {
        if index > 0 {
            pacer.pause(RATE_LIMIT_DELAY).await;
        }

        let start_time = schedule::slot_start(first_start, index, config.interval_hours);
        let payload = template.build_payload(config, start_time, previous_link.as_deref());

        let result = match api.create_arena(&payload).await {
            Ok(result) => {
                if let CreationResult::Created { url } = &result {
                    previous_link = Some(url.clone());
                }
                result
            }
            Err(err) => {
                error!(index, %err, "transport fault, aborting remaining slots");
                slots.push(SlotReport {
                    index,
                    start_time,
                    result: CreationResult::TransportFailed {
                        detail: err.to_string(),
                    },
                });
                return Ok(RunReport {
                    slots,
                    status: RunStatus::Aborted,
                });
            }
        };

        slots.push(SlotReport {
            index,
            start_time,
            result,
        });
    }

    Ok(RunReport {
        slots,
        status: RunStatus::Completed,
    })
}
