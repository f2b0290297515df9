use thiserror::Error;

#[derive(Error, Debug, Eq, PartialEq)]
pub enum StreamErr {
    #[error("[Cursor] Current value read before the first successful advance")]
    NotAdvanced,

    #[error("[Cursor] Current value read after the cursor was exhausted")]
    Exhausted,

    #[error("[Cursor] Current value has already been taken")]
    Taken,

    #[error("[Cursor] Current value read after the cursor was closed")]
    Closed,

    #[error("[Sink] `begin` called more than once on a single-use sink chain")]
    BeginTwice,

    #[error("[Sink] Element accepted outside of the accumulate phase, phase: {phase}")]
    AcceptOutOfPhase { phase: &'static str },

    #[error("[Sink] Pipeline execution `{op}` after the sink chain was closed")]
    ReusedAfterClose { op: &'static str },

    #[error("[Sink] Terminal state is unavailable, the execution was interrupted")]
    Interrupted,

    #[error("[Drain] Spawn background drain thread error: {0}")]
    SpawnDrainErr(String),
}

impl StreamErr {
    /// 以panic的形式立即失败，用于不可恢复的编程错误，例如复用同一条sink链。
    #[track_caller]
    pub fn raise(self) -> ! {
        panic!("{}", self)
    }
}
