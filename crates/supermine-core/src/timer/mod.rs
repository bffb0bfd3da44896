mod accrual;
mod boost;
mod cooldown;
mod reconciler;
mod session;

pub use accrual::{AccrualLoop, LoopExit};
pub use boost::{extend_remaining, BoostExtender, BoostPlan, BoostSource};
pub use cooldown::{is_available, remaining_ms, CooldownGate, CooldownKind, CooldownStatus};
pub use reconciler::{ActiveSession, Reconciler, Reconciliation, SettledSession};
pub use session::{parse_session_id, parse_timestamp, MiningSession, SessionState, SettledMarker};
