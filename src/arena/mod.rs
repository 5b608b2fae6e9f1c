//! Battle arena HTTP contract: wire types and the reqwest client

pub mod client;
pub mod types;

pub use client::{ArenaClient, BattleBackend};
pub use types::{
    BattleRecord, BattleRequest, BattleSummary, HistoryMessage, JudgeRating, LeaderboardEntry,
    ModelResponse, StatsResponse, TiebreakerInfo,
};
