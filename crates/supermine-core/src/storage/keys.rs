//! Store key namespace.

pub const SESSION_START: &str = "mining.session_start";
pub const BOOSTED_END: &str = "mining.boosted_end";
pub const SESSION_ID: &str = "mining.session_id";
/// `<session key>/<credited duration>` of the last session whose earnings
/// were credited.
pub const SETTLED: &str = "mining.settled";

pub const POINTS: &str = "ledger.points";
pub const MINED: &str = "ledger.mined";
pub const CONVERTED: &str = "ledger.converted";
pub const CONVERSIONS: &str = "ledger.conversions";

pub const COOLDOWN_MYSTERY_BOX: &str = "cooldown.mystery_box";
pub const COOLDOWN_TIME_BOOST_AD: &str = "cooldown.time_boost_ad";
pub const COOLDOWN_HASHRATE_AD: &str = "cooldown.hashrate_ad";
pub const COOLDOWN_DAILY_BONUS: &str = "cooldown.daily_bonus";
pub const COOLDOWN_FLIP_RESET: &str = "cooldown.flip_reset";

pub const DAILY_DAY_INDEX: &str = "daily.day_index";

pub const FIRST_LAUNCH: &str = "app.first_launch";

pub const FLIP_BOARD: &str = "flip.board";

pub const HASHRATE: &str = "hashrate.current";
