//! Persistence Layer (SPEC_FULL.md §4.8): the per-Representation
//! dasher-context, the `StatePersister` trait, and the restore walk that lets
//! a dynamic presentation resume across restarts.

use serde::{Deserialize, Serialize};

use crate::Result;

/// Snapshot of one Representation's live counters, written at each Period
/// start and Period end (§4.8).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DasherContext {
    pub done: bool,
    pub init_seg: Option<String>,
    pub src_url: Option<String>,
    pub template_seg: Option<String>,
    pub pid_id: Option<String>,
    pub muxed_comp_id: Option<String>,
    pub period_start: Option<f64>,
    pub period_duration: Option<f64>,
    pub period_id: Option<String>,
    pub multi_pids: Vec<String>,
    pub dash_dur: Option<f64>,
    pub owns_set: bool,
    pub last_pck_idx: u64,
    pub seg_number: u32,
    pub next_seg_start: u64,
    pub first_cts: u64,
}

/// One Period's worth of persisted Representation contexts, keyed by
/// Representation id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PeriodSnapshot {
    pub period_id: Option<String>,
    pub representations: Vec<(String, DasherContext)>,
}

/// Full persisted state: every Period seen so far, earliest first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct EngineSnapshot {
    pub periods: Vec<PeriodSnapshot>,
}

/// Snapshot read/write seam (§6). Test code supplies an in-memory fake; a
/// real caller persists to the filesystem or a database.
pub trait StatePersister {
    fn load(&self) -> Result<Option<EngineSnapshot>>;
    fn save(&self, snapshot: &EngineSnapshot) -> Result<()>;
}

/// Reference implementation that reads/writes the snapshot as TOML next to
/// the configured state file (§2.11/§4.8).
#[derive(Debug)]
pub struct FileStatePersister {
    pub path: std::path::PathBuf,
}

impl StatePersister for FileStatePersister {
    fn load(&self) -> Result<Option<EngineSnapshot>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&self.path)?;
        let snapshot = toml::from_str(&contents)?;
        Ok(Some(snapshot))
    }

    fn save(&self, snapshot: &EngineSnapshot) -> Result<()> {
        let contents = toml::to_string_pretty(snapshot)
            .map_err(|e| crate::error::DasherError::SetupFailed(e.to_string()))?;
        std::fs::write(&self.path, contents)?;
        Ok(())
    }
}

/// Walks the restored snapshot earliest to latest, marking every
/// Representation that no longer has a matching live stream as `removed`,
/// and reports whether the last period should resume (§4.2 "Restore path").
pub fn plan_restore<'a>(
    snapshot: &'a EngineSnapshot,
    live_reps: impl Fn(&str) -> bool,
) -> RestorePlan<'a> {
    let mut removed = Vec::new();
    for period in &snapshot.periods {
        for (rep_id, _ctx) in &period.representations {
            if !live_reps(rep_id) {
                removed.push(rep_id.as_str());
            }
        }
    }

    let resume_period = snapshot.periods.last().filter(|period| {
        period
            .representations
            .iter()
            .any(|(rep_id, ctx)| !ctx.done && !removed.contains(&rep_id.as_str()))
    });

    RestorePlan {
        removed_representations: removed,
        resume_period,
    }
}

#[derive(Debug)]
pub struct RestorePlan<'a> {
    pub removed_representations: Vec<&'a str>,
    pub resume_period: Option<&'a PeriodSnapshot>,
}

/// In-memory `StatePersister` fake for tests (§6 "test code supplies
/// in-memory fakes").
#[derive(Debug, Default)]
pub struct InMemoryStatePersister {
    pub stored: std::sync::Mutex<Option<EngineSnapshot>>,
}

impl StatePersister for InMemoryStatePersister {
    fn load(&self) -> Result<Option<EngineSnapshot>> {
        Ok(self.stored.lock().unwrap().clone())
    }

    fn save(&self, snapshot: &EngineSnapshot) -> Result<()> {
        *self.stored.lock().unwrap() = Some(snapshot.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(done: bool) -> DasherContext {
        DasherContext {
            done,
            ..Default::default()
        }
    }

    #[test]
    fn test_persistence_in_memory_round_trip() {
        let persister = InMemoryStatePersister::default();
        assert!(persister.load().unwrap().is_none());

        let snapshot = EngineSnapshot {
            periods: vec![PeriodSnapshot {
                period_id: Some("p0".into()),
                representations: vec![("v0".into(), ctx(false))],
            }],
        };
        persister.save(&snapshot).unwrap();
        assert_eq!(persister.load().unwrap(), Some(snapshot));
    }

    #[test]
    fn test_persistence_plan_restore_marks_missing_reps_removed() {
        let snapshot = EngineSnapshot {
            periods: vec![PeriodSnapshot {
                period_id: Some("p0".into()),
                representations: vec![
                    ("v0".into(), ctx(false)),
                    ("v1".into(), ctx(false)),
                ],
            }],
        };
        let plan = plan_restore(&snapshot, |id| id == "v0");
        assert_eq!(plan.removed_representations, vec!["v1"]);
    }

    #[test]
    fn test_persistence_plan_restore_resumes_last_undone_period() {
        let snapshot = EngineSnapshot {
            periods: vec![
                PeriodSnapshot {
                    period_id: Some("p0".into()),
                    representations: vec![("v0".into(), ctx(true))],
                },
                PeriodSnapshot {
                    period_id: Some("p1".into()),
                    representations: vec![("v0".into(), ctx(false))],
                },
            ],
        };
        let plan = plan_restore(&snapshot, |_| true);
        assert_eq!(plan.resume_period.unwrap().period_id.as_deref(), Some("p1"));
    }

    #[test]
    fn test_persistence_plan_restore_no_resume_when_all_done() {
        let snapshot = EngineSnapshot {
            periods: vec![PeriodSnapshot {
                period_id: Some("p0".into()),
                representations: vec![("v0".into(), ctx(true))],
            }],
        };
        let plan = plan_restore(&snapshot, |_| true);
        assert!(plan.resume_period.is_none());
    }
}
