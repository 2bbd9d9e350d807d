use std::cmp::{max, min, Reverse};
use std::collections::BinaryHeap;

use crate::base::{dirs, HashMap, Point, LOS};

//////////////////////////////////////////////////////////////////////////////

// Status

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Status { Free, Blocked, Occupied, Unknown }

//////////////////////////////////////////////////////////////////////////////

// Cost model

const UNIT_COST: i32 = 16;
const DIAGONAL_PENALTY: i32 = 6;
const OCCUPIED_PENALTY: i32 = 64;

// Expose the path-cost metric for use in other heuristics.
#[allow(non_snake_case)]
pub fn PathLength(p: Point) -> i32 {
    let (x, y) = (p.0.abs(), p.1.abs());
    UNIT_COST * max(x, y) + DIAGONAL_PENALTY * min(x, y)
}

fn step_cost(dir: Point, status: Status) -> i32 {
    let diagonal = dir.0 != 0 && dir.1 != 0;
    UNIT_COST +
    if diagonal { DIAGONAL_PENALTY } else { 0 } +
    if status == Status::Occupied { OCCUPIED_PENALTY } else { 0 }
}

//////////////////////////////////////////////////////////////////////////////

// Paths

#[derive(Clone, Debug)]
pub struct Path {
    // Tiles from just after the source up to and including the endpoint.
    pub steps: Vec<Point>,
    pub cost: i32,
    // False if the endpoint is only the closest approach to the destination.
    pub complete: bool,
}

impl Path {
    pub fn first_step(&self) -> Option<Point> { self.steps.first().copied() }
}

//////////////////////////////////////////////////////////////////////////////

// Multi-destination Dijkstra

// One shared flood from `source` answering "shortest path to each of `dests`".
// Destinations the flood never reaches get the best partial path instead (the
// explored tile closest to them), or None if even that makes no progress.
//
// Ties in the frontier are ordered by (cost, y, x), so identical inputs always
// produce identical paths.
#[allow(non_snake_case)]
pub fn DijkstraPaths<F: Fn(Point) -> Status>(
        source: Point, dests: &[Point], limit: i32, check: F) -> Vec<Option<Path>> {
    let mut dist: HashMap<Point, i32> = HashMap::default();
    let mut parent: HashMap<Point, Point> = HashMap::default();
    let mut settled: Vec<Point> = vec![];
    let mut heap = BinaryHeap::new();

    let mut remaining = 0;
    let mut wanted: HashMap<Point, bool> = HashMap::default();
    for &dest in dests {
        if dest != source && wanted.insert(dest, false).is_none() { remaining += 1; }
    }

    dist.insert(source, 0);
    heap.push(Reverse((0, source.1, source.0)));

    let mut budget = limit;
    while budget > 0 {
        let Some(Reverse((cost, y, x))) = heap.pop() else { break };
        let pos = Point(x, y);
        if dist.get(&pos) != Some(&cost) { continue; }

        budget -= 1;
        settled.push(pos);
        if let Some(found) = wanted.get_mut(&pos) {
            if !*found { *found = true; remaining -= 1; }
            if remaining == 0 { break; }
        }

        for &dir in &dirs::ALL {
            let next = pos + dir;
            let status = check(next);
            if status == Status::Blocked { continue; }

            // No cutting corners: a diagonal step needs both orthogonal
            // neighbors to be open.
            if dir.0 != 0 && dir.1 != 0 {
                if check(pos + Point(dir.0, 0)) == Status::Blocked { continue; }
                if check(pos + Point(0, dir.1)) == Status::Blocked { continue; }
            }

            let next_cost = cost + step_cost(dir, status);
            let better = match dist.get(&next) {
                Some(&existing) => next_cost < existing,
                None => true,
            };
            if better {
                dist.insert(next, next_cost);
                parent.insert(next, pos);
                heap.push(Reverse((next_cost, next.1, next.0)));
            }
        }
    }

    let build = |end: Point, complete: bool| -> Path {
        let mut steps = vec![];
        let mut current = end;
        while current != source {
            steps.push(current);
            current = parent[&current];
        }
        steps.reverse();
        Path { steps, cost: dist[&end], complete }
    };

    dests.iter().map(|&dest| {
        if dest == source {
            return Some(Path { steps: vec![], cost: 0, complete: true });
        }
        if dist.contains_key(&dest) { return Some(build(dest, true)); }

        // Closest approach: the settled tile nearest the destination, with
        // path cost breaking ties. No progress at all means no path.
        let key = |p: Point| (PathLength(dest - p), dist[&p]);
        let best = settled.iter().copied().min_by_key(|&p| key(p))?;
        if best == source { return None; }
        Some(build(best, false))
    }).collect()
}

//////////////////////////////////////////////////////////////////////////////

// A* for pathfinding to a single known target

#[allow(non_snake_case)]
pub fn AStar<F: Fn(Point) -> Status>(
        source: Point, target: Point, limit: i32, check: F) -> Option<Path> {
    // Try line-of-sight - if that path is clear, then we don't need to search.
    // As with the full search below, we don't check if source is blocked here.
    let los = LOS(source, target);
    let free = (1..los.len() - 1).all(|i| check(los[i]) == Status::Free) &&
        los.windows(2).all(|w| {
            let d = w[1] - w[0];
            d.0 == 0 || d.1 == 0 ||
            (check(w[0] + Point(d.0, 0)) != Status::Blocked &&
             check(w[0] + Point(0, d.1)) != Status::Blocked)
        });
    if free && los.len() > 1 {
        let cost = los.windows(2).map(|w| step_cost(w[1] - w[0], Status::Free)).sum();
        return Some(Path { steps: los.into_iter().skip(1).collect(), cost, complete: true });
    }

    DijkstraPaths(source, &[target], limit, check).pop()?
}

//////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::Matrix;

    fn grid(rows: &[&str]) -> Matrix<char> {
        let size = Point(rows[0].len() as i32, rows.len() as i32);
        let mut result = Matrix::new(size, '#');
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                result.set(Point(x as i32, y as i32), ch);
            }
        }
        result
    }

    fn check(map: &Matrix<char>) -> impl Fn(Point) -> Status + '_ {
        |p| match map.get(p) {
            '.' => Status::Free,
            'o' => Status::Occupied,
            _ => Status::Blocked,
        }
    }

    #[test]
    fn test_straight_shot_uses_sightline() {
        let map = grid(&["....."]);
        let path = AStar(Point(0, 0), Point(4, 0), 100, check(&map)).unwrap();
        assert!(path.complete);
        assert_eq!(path.steps, vec![Point(1, 0), Point(2, 0), Point(3, 0), Point(4, 0)]);
        assert_eq!(path.cost, 4 * UNIT_COST);
    }

    #[test]
    fn test_path_goes_around_walls() {
        let map = grid(&[
            ".....",
            ".###.",
            ".....",
        ]);
        let path = AStar(Point(0, 1), Point(4, 1), 100, check(&map)).unwrap();
        assert!(path.complete);
        assert_eq!(*path.steps.last().unwrap(), Point(4, 1));
        for &p in &path.steps {
            assert!(map.get(p) != '#', "stepped into a wall at {:?}", p);
        }
    }

    #[test]
    fn test_no_corner_cutting() {
        let map = grid(&[
            ".#",
            "#.",
        ]);
        assert!(AStar(Point(0, 0), Point(1, 1), 100, check(&map)).is_none());
    }

    #[test]
    fn test_multi_destination_shares_one_flood() {
        let map = grid(&[
            ".....",
            ".....",
            ".....",
        ]);
        let dests = [Point(4, 0), Point(4, 2), Point(0, 0)];
        let paths = DijkstraPaths(Point(0, 0), &dests, 1000, check(&map));
        assert_eq!(paths.len(), 3);
        for path in &paths[..2] {
            let path = path.as_ref().unwrap();
            assert!(path.complete);
        }
        let own = paths[2].as_ref().unwrap();
        assert!(own.complete && own.steps.is_empty() && own.cost == 0);
    }

    #[test]
    fn test_unreachable_destination_gets_closest_approach() {
        let map = grid(&[
            "...#.",
            "...#.",
            "...#.",
        ]);
        let paths = DijkstraPaths(Point(0, 1), &[Point(4, 1)], 1000, check(&map));
        let path = paths[0].as_ref().unwrap();
        assert!(!path.complete);
        assert_eq!(*path.steps.last().unwrap(), Point(2, 1));
    }

    #[test]
    fn test_fully_cut_off_is_none() {
        let map = grid(&[
            ".#.",
        ]);
        let paths = DijkstraPaths(Point(0, 0), &[Point(2, 0)], 1000, check(&map));
        assert!(paths[0].is_none());
    }

    #[test]
    fn test_tie_break_is_deterministic() {
        let map = grid(&[
            ".......",
            ".......",
            ".......",
            ".......",
        ]);
        let dests = [Point(6, 0), Point(6, 3), Point(3, 3)];
        let first = DijkstraPaths(Point(0, 0), &dests, 1000, check(&map));
        for _ in 0..10 {
            let next = DijkstraPaths(Point(0, 0), &dests, 1000, check(&map));
            for (a, b) in first.iter().zip(next.iter()) {
                let (a, b) = (a.as_ref().unwrap(), b.as_ref().unwrap());
                assert_eq!(a.steps, b.steps);
                assert_eq!(a.cost, b.cost);
            }
        }
    }

    #[test]
    fn test_occupied_tiles_are_penalized_not_blocked() {
        let map = grid(&[
            ".o.",
            "...",
        ]);
        let path = AStar(Point(0, 0), Point(2, 0), 100, check(&map)).unwrap();
        assert!(path.complete);
        assert!(!path.steps.contains(&Point(1, 0)), "should dodge the occupant");
    }
}
