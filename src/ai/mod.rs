//! Enemy intelligence: grid navigation and tabular Q-learning

pub mod pathfinding;
pub mod q_learning;

pub use pathfinding::NavGrid;
pub use q_learning::{Action, AgentStats, QLearningAgent, QLearningParams, QModel};
