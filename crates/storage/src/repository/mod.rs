pub mod entry;
pub mod episode;
pub mod league;
pub mod score;
pub mod season;
