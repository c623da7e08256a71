mod contestant;
mod entry;
mod episode;
mod league;
mod score;
mod season;

pub use contestant::Contestant;
pub use entry::{Entry, Pick};
pub use episode::{Episode, EpisodeResult, EpisodeType, FinaleExtra, FinalePlacement, ResultType};
pub use league::{League, LeagueStatus};
pub use score::{Score, WeeklyScore};
pub use season::{SeasonRules, SlotMultiplier};
