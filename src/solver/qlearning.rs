use fxhash::{FxBuildHasher, FxHashSet};
use indexmap::IndexMap;
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::engine::{SearchResult, StepEvent, StepObserver};
use crate::grid::Grid;
use crate::point::Point;
use crate::solver::Solver;

type FxIndexMap<K, V> = IndexMap<K, V, FxBuildHasher>;

const ALPHA: f64 = 0.1;
const GAMMA: f64 = 0.9;
const EPSILON_INITIAL: f64 = 0.1;
const EPSILON_DECAY: f64 = 0.998;
const EPSILON_FLOOR: f64 = 0.05;
const EPISODES: usize = 500;
/// Episodes before epsilon starts decaying.
const DECAY_START: usize = 100;
/// Consecutive no-op repositions tolerated before an episode aborts.
const STUCK_LIMIT: u32 = 5;

const REWARD_GOAL: f64 = 100.0;
const REWARD_WALL: f64 = -20.0;
const REWARD_REVISIT: f64 = -5.0;
const REWARD_CLOSER: f64 = 5.0;
const REWARD_FARTHER: f64 = -3.0;
const REWARD_NEUTRAL: f64 = -0.5;
const REWARD_STUCK: f64 = -50.0;

/// An agent action. Enumeration order is the greedy tie-break order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::Up, Action::Down, Action::Left, Action::Right];

    pub const fn offset(self) -> Point {
        match self {
            Action::Up => Point::new(0, -1),
            Action::Down => Point::new(0, 1),
            Action::Left => Point::new(-1, 0),
            Action::Right => Point::new(1, 0),
        }
    }
}

/// Action-value record for one state. One entry exists per non-wall cell.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ActionValues {
    pub up: f64,
    pub down: f64,
    pub left: f64,
    pub right: f64,
}

impl ActionValues {
    fn get(&self, action: Action) -> f64 {
        match action {
            Action::Up => self.up,
            Action::Down => self.down,
            Action::Left => self.left,
            Action::Right => self.right,
        }
    }

    fn get_mut(&mut self, action: Action) -> &mut f64 {
        match action {
            Action::Up => &mut self.up,
            Action::Down => &mut self.down,
            Action::Left => &mut self.left,
            Action::Right => &mut self.right,
        }
    }

    fn max(&self) -> f64 {
        self.up.max(self.down).max(self.left).max(self.right)
    }
}

/// Tabular Q-learning agent: a training phase of epsilon-greedy episodes
/// followed by a greedy policy rollout. The table maps coordinates to
/// action values in row-major insertion order, so iteration is
/// deterministic for a given layout.
///
/// The table references coordinates and walls of the layout it was trained
/// against; call [reset](Self::reset) whenever the layout changes.
#[derive(Clone, Debug)]
pub struct QLearningSolver {
    q_table: FxIndexMap<Point, ActionValues>,
    epsilon: f64,
    rng: StdRng,
}

impl Default for QLearningSolver {
    fn default() -> QLearningSolver {
        QLearningSolver::new()
    }
}

impl QLearningSolver {
    pub fn new() -> QLearningSolver {
        QLearningSolver::with_rng(StdRng::from_entropy())
    }

    /// Deterministic agent for tests and reproducible demos.
    pub fn with_seed(seed: u64) -> QLearningSolver {
        QLearningSolver::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> QLearningSolver {
        QLearningSolver {
            q_table: FxIndexMap::default(),
            epsilon: EPSILON_INITIAL,
            rng,
        }
    }

    /// Clears the learned table and restores the exploration rate. Must be
    /// called when the grid layout changes; a stale table references stale
    /// coordinates and walls.
    pub fn reset(&mut self) {
        self.q_table.clear();
        self.epsilon = EPSILON_INITIAL;
    }

    fn initialize_table(&mut self, grid: &Grid) {
        self.q_table.clear();
        for y in 0..grid.height() {
            for x in 0..grid.width() {
                let p = Point::new(x, y);
                if grid.passable(p) {
                    self.q_table.insert(p, ActionValues::default());
                }
            }
        }
    }

    /// Out-of-bounds counts as a wall for the agent.
    fn blocked(grid: &Grid, p: Point) -> bool {
        !grid.passable(p)
    }

    fn surrounded_by_walls(grid: &Grid, p: Point) -> bool {
        Action::ALL
            .iter()
            .all(|a| Self::blocked(grid, p + a.offset()))
    }

    fn valid_actions(grid: &Grid, p: Point) -> Vec<Action> {
        Action::ALL
            .iter()
            .copied()
            .filter(|a| !Self::blocked(grid, p + a.offset()))
            .collect()
    }

    /// Greedy argmax over `actions` with ties broken by enumeration order.
    fn best_action(values: &ActionValues, actions: &[Action]) -> Action {
        let mut best = actions[0];
        for &action in &actions[1..] {
            if values.get(action) > values.get(best) {
                best = action;
            }
        }
        best
    }

    fn select_action(&mut self, grid: &Grid, p: Point) -> Action {
        let Some(values) = self.q_table.get(&p).copied() else {
            return Action::Right;
        };
        let valid = Self::valid_actions(grid, p);
        if valid.is_empty() {
            return Action::Right;
        }
        if self.rng.gen::<f64>() < self.epsilon {
            valid[self.rng.gen_range(0..valid.len())]
        } else {
            Self::best_action(&values, &valid)
        }
    }

    /// Reward for attempting to move from `from` to `attempted` (the
    /// pre-bounce destination, so wall attempts are penalized even though
    /// the agent ends up staying put).
    fn reward(grid: &Grid, from: Point, attempted: Point, visited: &FxHashSet<Point>) -> f64 {
        let end = grid.end();
        if attempted == end {
            return REWARD_GOAL;
        }
        if Self::blocked(grid, attempted) {
            return REWARD_WALL;
        }
        if visited.contains(&attempted) {
            return REWARD_REVISIT;
        }
        let dist_new = attempted.manhattan_distance(&end);
        let dist_old = from.manhattan_distance(&end);
        if dist_new < dist_old {
            REWARD_CLOSER
        } else if dist_new > dist_old {
            REWARD_FARTHER
        } else {
            REWARD_NEUTRAL
        }
    }

    fn update(&mut self, state: Point, action: Action, reward: f64, next: Point) {
        let max_next = self.q_table.get(&next).map(|v| v.max()).unwrap_or(0.0);
        if let Some(values) = self.q_table.get_mut(&state) {
            let current = values.get(action);
            *values.get_mut(action) = current + ALPHA * (reward + GAMMA * max_next - current);
        }
    }

    fn train(&mut self, grid: &Grid) {
        let max_steps = (grid.width() * grid.height()) as usize;
        let start = grid.start();
        let end = grid.end();

        for episode in 0..EPISODES {
            let mut pos = start;
            let mut steps = 0;
            let mut visited: FxHashSet<Point> = FxHashSet::default();
            let mut stuck = 0;
            let mut last: Option<Point> = None;

            while steps < max_steps && pos != end {
                if Self::surrounded_by_walls(grid, pos) {
                    break;
                }
                let action = self.select_action(grid, pos);
                let attempted = pos + action.offset();
                // Wall-bound moves bounce: the agent stays put.
                let next = if Self::blocked(grid, attempted) {
                    pos
                } else {
                    attempted
                };

                if last == Some(next) {
                    stuck += 1;
                    if stuck > STUCK_LIMIT {
                        self.update(pos, action, REWARD_STUCK, next);
                        break;
                    }
                } else {
                    stuck = 0;
                }

                let reward = Self::reward(grid, pos, attempted, &visited);
                self.update(pos, action, reward, next);

                visited.insert(next);
                last = Some(pos);
                pos = next;
                steps += 1;
            }

            if episode > DECAY_START {
                self.epsilon = (self.epsilon * EPSILON_DECAY).max(EPSILON_FLOOR);
            }
        }
    }

    /// Greedy rollout over the trained table. Success is reported only when
    /// the rollout actually stands on the end cell; otherwise the path is
    /// empty regardless of progress made.
    fn run_policy(&mut self, grid: &mut Grid, observer: &mut dyn StepObserver) -> SearchResult {
        let max_steps = (grid.width() * grid.height()) as usize;
        let start = grid.start();
        let end = grid.end();

        let mut path: Vec<Point> = Vec::new();
        let mut pos = start;
        let mut steps = 0;
        let mut visited: FxHashSet<Point> = FxHashSet::default();
        let mut stuck = 0;
        let mut last: Option<Point> = None;

        while steps < max_steps && pos != end {
            if Self::surrounded_by_walls(grid, pos) {
                break;
            }

            {
                let cell = grid.cell_mut(pos);
                if !cell.is_start && !cell.is_end {
                    cell.is_visited = true;
                    observer.visited(StepEvent {
                        pos,
                        distance: steps as i32,
                    });
                }
            }
            path.push(pos);

            let Some(values) = self.q_table.get(&pos).copied() else {
                break;
            };
            let valid = Self::valid_actions(grid, pos);
            if valid.is_empty() {
                break;
            }

            let mut best = Self::best_action(&values, &valid);

            // Anti-loop rule: if the greedy destination was already walked
            // this rollout, prefer the best-valued action leading somewhere
            // new; failing that, take the second-best action overall.
            let greedy_dest = pos + best.offset();
            if visited.contains(&greedy_dest) && valid.len() > 1 {
                let mut sorted = valid.clone();
                sorted.sort_by(|a, b| {
                    values
                        .get(*b)
                        .partial_cmp(&values.get(*a))
                        .unwrap_or(std::cmp::Ordering::Equal)
                });
                if let Some(alternative) = sorted
                    .iter()
                    .copied()
                    .find(|a| !visited.contains(&(pos + a.offset())))
                {
                    best = alternative;
                } else if sorted.len() > 1 {
                    best = sorted[1];
                }
            }

            let next = pos + best.offset();
            if last == Some(next) {
                stuck += 1;
                if stuck > STUCK_LIMIT {
                    break;
                }
            } else {
                stuck = 0;
            }

            visited.insert(pos);
            last = Some(pos);
            pos = next;
            steps += 1;
        }

        if pos == end {
            path.push(end);
        } else {
            path.clear();
        }
        let visited_count = path.len();
        if path.len() > 2 {
            for &p in &path[1..path.len() - 1] {
                grid.cell_mut(p).is_path = true;
            }
        }
        SearchResult {
            path,
            visited_count,
        }
    }
}

impl Solver for QLearningSolver {
    fn solve(&mut self, grid: &mut Grid, observer: &mut dyn StepObserver) -> SearchResult {
        self.initialize_table(grid);
        info!(
            "training q-learning agent: {} episodes on a {}x{} grid",
            EPISODES,
            grid.width(),
            grid.height()
        );
        self.train(grid);
        self.run_policy(grid, observer)
    }
}
