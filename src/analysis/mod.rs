pub mod counters;
pub mod god_stats;
pub mod recommender;
