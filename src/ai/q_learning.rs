//! Tabular Q-learning for enemy decision making
//!
//! Observations are six normalized values that get bucketed into an integer
//! key (`value * 10`, truncated). Each key maps to one row of action values.
//! Rows are created lazily and the table never shrinks.

use std::collections::HashMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Number of observation components
pub const STATE_SIZE: usize = 6;
/// Number of discrete actions
pub const ACTION_COUNT: usize = 4;

/// Multiplicative epsilon decay per learning step
pub const EPSILON_DECAY: f64 = 0.9995;
/// Epsilon never decays below this
pub const MIN_EPSILON: f64 = 0.01;

/// Discretized observation used as a table key
pub type StateKey = [i32; STATE_SIZE];

/// Normalized observation: self x/y, target x/y, direction (0/1), on-ground (0/1)
pub type Observation = [f32; STATE_SIZE];

/// Enemy actions. What `Wait` means depends on the caller (stand still, or
/// let the current motion carry on).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Left = 0,
    Right = 1,
    Jump = 2,
    Wait = 3,
}

impl Action {
    pub const ALL: [Action; ACTION_COUNT] = [Action::Left, Action::Right, Action::Jump, Action::Wait];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// Bucket an observation into a table key
pub fn discretize(state: &Observation) -> StateKey {
    let mut key = [0i32; STATE_SIZE];
    for (slot, value) in key.iter_mut().zip(state) {
        // `as` truncates toward zero
        *slot = (value * 10.0) as i32;
    }
    key
}

/// Learning hyperparameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QLearningParams {
    pub learning_rate: f32,
    pub discount_factor: f32,
    pub initial_epsilon: f64,
}

impl Default for QLearningParams {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            discount_factor: 0.95,
            initial_epsilon: 0.1,
        }
    }
}

/// One persisted table row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QEntry {
    pub state: StateKey,
    pub values: [f32; ACTION_COUNT],
}

/// Serializable snapshot of a learned policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QModel {
    pub epsilon: f64,
    /// Rows sorted by state key
    pub entries: Vec<QEntry>,
}

impl QModel {
    /// A model with no learned rows
    pub fn empty(epsilon: f64) -> Self {
        Self {
            epsilon,
            entries: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Summary numbers for debugging overlays
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentStats {
    pub states_explored: usize,
    pub epsilon: f64,
    pub total_q_values: usize,
}

/// Epsilon-greedy tabular Q-learning agent
#[derive(Debug, Clone)]
pub struct QLearningAgent {
    params: QLearningParams,
    epsilon: f64,
    table: HashMap<StateKey, [f32; ACTION_COUNT]>,
}

impl Default for QLearningAgent {
    fn default() -> Self {
        Self::new(QLearningParams::default())
    }
}

impl QLearningAgent {
    pub fn new(params: QLearningParams) -> Self {
        Self {
            params,
            epsilon: params.initial_epsilon,
            table: HashMap::new(),
        }
    }

    /// Restore an agent from a stored model
    pub fn from_model(params: QLearningParams, model: &QModel) -> Self {
        let table = model
            .entries
            .iter()
            .map(|entry| (entry.state, entry.values))
            .collect();
        Self {
            params,
            epsilon: model.epsilon,
            table,
        }
    }

    /// Snapshot the table and exploration rate
    pub fn to_model(&self) -> QModel {
        let mut entries: Vec<QEntry> = self
            .table
            .iter()
            .map(|(state, values)| QEntry {
                state: *state,
                values: *values,
            })
            .collect();
        entries.sort_by(|a, b| a.state.cmp(&b.state));
        QModel {
            epsilon: self.epsilon,
            entries,
        }
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Action values for a state, if it has been visited
    pub fn q_values(&self, state: &Observation) -> Option<&[f32; ACTION_COUNT]> {
        self.table.get(&discretize(state))
    }

    fn row_mut(&mut self, key: StateKey) -> &mut [f32; ACTION_COUNT] {
        self.table.entry(key).or_insert([0.0; ACTION_COUNT])
    }

    /// Epsilon-greedy selection. Exploration does not touch the table;
    /// exploitation creates an all-zero row on first visit.
    pub fn choose_action<R: Rng + ?Sized>(&mut self, state: &Observation, rng: &mut R) -> Action {
        if rng.random::<f64>() < self.epsilon {
            let index = rng.random_range(0..ACTION_COUNT);
            return Action::from_index(index).unwrap_or(Action::Wait);
        }

        let row = self.row_mut(discretize(state));
        Action::from_index(argmax(row)).unwrap_or(Action::Left)
    }

    /// One-step Bellman update followed by epsilon decay
    pub fn learn(
        &mut self,
        state: &Observation,
        action: Action,
        reward: f32,
        next_state: &Observation,
        done: bool,
    ) {
        let key = discretize(state);
        let next_key = discretize(next_state);

        let max_next = if done {
            // Still register the successor so its row exists
            self.row_mut(next_key);
            0.0
        } else {
            let next = self.row_mut(next_key);
            next.iter().copied().fold(f32::NEG_INFINITY, f32::max)
        };

        let QLearningParams {
            learning_rate,
            discount_factor,
            ..
        } = self.params;
        let row = self.row_mut(key);
        let current = row[action.index()];
        row[action.index()] = current + learning_rate * (reward + discount_factor * max_next - current);

        if self.epsilon > MIN_EPSILON {
            self.epsilon = (self.epsilon * EPSILON_DECAY).max(MIN_EPSILON);
        }
    }

    pub fn stats(&self) -> AgentStats {
        AgentStats {
            states_explored: self.table.len(),
            epsilon: self.epsilon,
            total_q_values: self.table.len() * ACTION_COUNT,
        }
    }
}

/// Index of the first maximum value
fn argmax(values: &[f32; ACTION_COUNT]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate().skip(1) {
        if *v > values[best] {
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const S: Observation = [0.25, 0.5, 0.75, 0.5, 1.0, 1.0];
    const S2: Observation = [0.3, 0.5, 0.75, 0.5, 1.0, 1.0];

    fn greedy() -> QLearningAgent {
        QLearningAgent::new(QLearningParams {
            initial_epsilon: 0.0,
            ..Default::default()
        })
    }

    #[test]
    fn test_discretize_truncates() {
        assert_eq!(discretize(&[0.19, 0.99, 0.0, 1.0, 0.5, -0.15]), [1, 9, 0, 10, 5, -1]);
    }

    #[test]
    fn test_greedy_initializes_zero_row_and_picks_first_max() {
        let mut agent = greedy();
        let mut rng = Pcg32::seed_from_u64(1);
        assert_eq!(agent.choose_action(&S, &mut rng), Action::Left);
        assert_eq!(agent.q_values(&S), Some(&[0.0; ACTION_COUNT]));
    }

    #[test]
    fn test_learn_prefers_rewarded_action() {
        let mut agent = greedy();
        agent.learn(&S, Action::Jump, 1.0, &S2, false);
        let q = agent.q_values(&S).copied().unwrap_or_default();
        assert!((q[Action::Jump.index()] - 0.1).abs() < 1e-6);
        assert_eq!(argmax(&q), Action::Jump.index());
        // Already below the floor, so epsilon stays put
        assert_eq!(agent.epsilon(), 0.0);
    }

    #[test]
    fn test_done_ignores_successor_value() {
        let mut agent = greedy();
        // Give the successor a large value
        for _ in 0..50 {
            agent.learn(&S2, Action::Right, 1.0, &S2, false);
        }
        agent.learn(&S, Action::Left, 0.5, &S2, true);
        let q = agent.q_values(&S).copied().unwrap_or_default();
        assert!((q[Action::Left.index()] - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_full_exploration_never_creates_rows() {
        let mut agent = QLearningAgent::new(QLearningParams {
            initial_epsilon: 1.0,
            ..Default::default()
        });
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..100 {
            agent.choose_action(&S, &mut rng);
        }
        assert_eq!(agent.stats().states_explored, 0);
    }

    #[test]
    fn test_model_round_trip() {
        let mut agent = greedy();
        agent.learn(&S, Action::Wait, 0.7, &S2, false);
        agent.learn(&S2, Action::Left, 0.2, &S, false);
        let model = agent.to_model();
        assert!(model.entries.windows(2).all(|w| w[0].state < w[1].state));

        let restored = QLearningAgent::from_model(QLearningParams::default(), &model);
        assert_eq!(restored.to_model(), model);
        assert_eq!(restored.stats().states_explored, 2);
        assert_eq!(restored.stats().total_q_values, 8);
    }

    proptest! {
        #[test]
        fn prop_epsilon_decay_matches_closed_form(steps in 0usize..3000) {
            let mut agent = QLearningAgent::default();
            for _ in 0..steps {
                agent.learn(&S, Action::Left, 0.0, &S2, false);
            }
            let expected = (0.1 * EPSILON_DECAY.powi(steps as i32)).max(MIN_EPSILON);
            prop_assert!((agent.epsilon() - expected).abs() < 1e-9);
        }

        #[test]
        fn prop_epsilon_below_floor_never_rises(start in 0.0f64..MIN_EPSILON, steps in 1usize..50) {
            let mut agent = QLearningAgent::from_model(QLearningParams::default(), &QModel::empty(start));
            for _ in 0..steps {
                agent.learn(&S, Action::Jump, 1.0, &S2, false);
            }
            prop_assert_eq!(agent.epsilon(), start);
        }

        #[test]
        fn prop_update_moves_toward_target_without_overshoot(
            initial in -5.0f32..5.0,
            next_best in -5.0f32..5.0,
            reward in 0.0f32..1.0,
        ) {
            let model = QModel {
                epsilon: 0.0,
                entries: vec![
                    QEntry { state: discretize(&S), values: [initial, 0.0, 0.0, 0.0] },
                    QEntry { state: discretize(&S2), values: [next_best, next_best, next_best, next_best] },
                ],
            };
            let mut agent = QLearningAgent::from_model(QLearningParams::default(), &model);
            agent.learn(&S, Action::Left, reward, &S2, false);

            let target = reward + 0.95 * next_best;
            let updated = agent.q_values(&S).map(|r| r[0]).unwrap_or(initial);
            prop_assert!((updated - target).abs() <= (initial - target).abs() + 1e-5);
            if initial < target {
                prop_assert!(updated >= initial && updated <= target + 1e-5);
            } else {
                prop_assert!(updated <= initial && updated >= target - 1e-5);
            }
        }
    }
}
