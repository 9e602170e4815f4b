use crate::room::grid::{Tile, TileGrid, TileState};
use crate::room::rotation::Rotation;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

const CARDINAL_COST: u32 = 10;
const DIAGONAL_COST: u32 = 14;

/// Expansion cap guaranteeing termination on degenerate maps.
const EXPANSION_BUDGET: usize = 500;

/// Largest climb or drop an avatar takes between adjacent tiles.
pub const HEIGHT_TOLERANCE: f32 = 1.1;

const CARDINALS: [Rotation; 4] = [
    Rotation::North,
    Rotation::East,
    Rotation::South,
    Rotation::West,
];

const DIAGONALS: [Rotation; 4] = [
    Rotation::Northeast,
    Rotation::Southeast,
    Rotation::Southwest,
    Rotation::Northwest,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PathStep {
    pub x: u16,
    pub y: u16,
}

#[derive(Debug, Clone, Copy)]
struct Node {
    x: u16,
    y: u16,
    g: u32,
    parent: Option<usize>,
}

/// Open-list entry. Reversed ordering turns the max-heap into a min-heap
/// on f, with insertion sequence breaking exact ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenEntry {
    f: u32,
    seq: u32,
    node: usize,
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .cmp(&self.f)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A* over the derived tile states. Returns the steps from exclusive
/// start to inclusive goal, or empty when start equals goal, the goal is
/// void or blocked, or no route exists within the expansion budget.
pub fn find_path(
    grid: &TileGrid,
    start: (u16, u16),
    goal: (u16, u16),
    allow_diagonal: bool,
) -> Vec<PathStep> {
    if start == goal {
        return Vec::new();
    }
    let Some(goal_tile) = grid.tile(goal.0, goal.1) else {
        return Vec::new();
    };
    if matches!(goal_tile.state, TileState::Invalid | TileState::Blocked) {
        return Vec::new();
    }
    if grid.tile(start.0, start.1).is_none() {
        return Vec::new();
    }

    let mut nodes = vec![Node {
        x: start.0,
        y: start.1,
        g: 0,
        parent: None,
    }];
    let mut best: HashMap<(u16, u16), u32> = HashMap::new();
    best.insert(start, 0);

    let mut open = BinaryHeap::new();
    let mut seq = 0u32;
    open.push(OpenEntry {
        f: heuristic(start, goal),
        seq,
        node: 0,
    });

    let mut expansions = 0usize;
    while let Some(entry) = open.pop() {
        let current = nodes[entry.node];
        if (current.x, current.y) == goal {
            return reconstruct(&nodes, entry.node);
        }
        // Stale entries remain in the heap when a node is re-opened with
        // a better g; skip them.
        if best
            .get(&(current.x, current.y))
            .is_some_and(|g| *g < current.g)
        {
            continue;
        }

        expansions += 1;
        if expansions > EXPANSION_BUDGET {
            return Vec::new();
        }

        let Some(from_tile) = grid.tile(current.x, current.y) else {
            continue;
        };
        for rotation in neighbor_rotations(allow_diagonal) {
            let Some(to_tile) = grid.neighbor(current.x, current.y, rotation) else {
                continue;
            };
            if !can_walk_to(from_tile, to_tile, goal) {
                continue;
            }
            let step_cost = if rotation.is_diagonal() {
                DIAGONAL_COST
            } else {
                CARDINAL_COST
            };
            let g = current.g + step_cost;
            let key = (to_tile.x, to_tile.y);
            if best.get(&key).is_some_and(|known| *known <= g) {
                continue;
            }
            best.insert(key, g);
            nodes.push(Node {
                x: to_tile.x,
                y: to_tile.y,
                g,
                parent: Some(entry.node),
            });
            seq += 1;
            open.push(OpenEntry {
                f: g + heuristic(key, goal),
                seq,
                node: nodes.len() - 1,
            });
        }
    }

    Vec::new()
}

fn neighbor_rotations(allow_diagonal: bool) -> impl Iterator<Item = Rotation> {
    CARDINALS
        .into_iter()
        .chain(DIAGONALS.into_iter().take(if allow_diagonal { 4 } else { 0 }))
}

/// Manhattan distance scaled to the cardinal step cost. Overestimates
/// diagonal-heavy routes; the legacy search behaved the same way and the
/// resulting paths are part of the observable behavior.
fn heuristic(from: (u16, u16), goal: (u16, u16)) -> u32 {
    let dx = i32::from(from.0) - i32::from(goal.0);
    let dy = i32::from(from.1) - i32::from(goal.1);
    (dx.unsigned_abs() + dy.unsigned_abs()) * CARDINAL_COST
}

/// Edge feasibility. Void and blocked tiles are never traversable, the
/// goal included. The height tolerance is waived for the final step onto
/// a seat or bed goal.
pub fn can_walk_to(from: &Tile, to: &Tile, goal: (u16, u16)) -> bool {
    match to.state {
        TileState::Invalid | TileState::Blocked => return false,
        TileState::Open | TileState::Sit | TileState::Lay => {}
    }
    let is_goal = (to.x, to.y) == goal;
    if is_goal && matches!(to.state, TileState::Sit | TileState::Lay) {
        return true;
    }
    (to.stack_height - from.stack_height).abs() <= HEIGHT_TOLERANCE
}

fn reconstruct(nodes: &[Node], end: usize) -> Vec<PathStep> {
    let mut steps = Vec::new();
    let mut cursor = Some(end);
    while let Some(index) = cursor {
        let node = nodes[index];
        // The start node is the only one without a parent and stays out
        // of the returned path.
        if node.parent.is_some() {
            steps.push(PathStep {
                x: node.x,
                y: node.y,
            });
        }
        cursor = node.parent;
    }
    steps.reverse();
    steps
}
