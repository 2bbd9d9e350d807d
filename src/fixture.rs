// A string-drawn board implementing WorldView, for tests only. The real map,
// roster, and turn engine live outside this crate; tests stand them in with
// this fixture.

use crate::actor::{ActorArgs, ActorMap, AID};
use crate::base::{Matrix, Point};
use crate::dex::{clear_sightline, StatusId};
use crate::world::{ActorView, Fidelity, TeamId, Tile, WorldView};

pub struct TestWorld {
    pub tiles: Matrix<char>,
    pub views: Vec<ActorView>,
    pub turn: i32,
    pub statuses: Vec<StatusId>,
    mint: ActorMap,
}

impl TestWorld {
    pub fn new(rows: &[&str]) -> Self {
        let size = Point(rows[0].len() as i32, rows.len() as i32);
        let mut tiles = Matrix::new(size, '#');
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                assert!(Tile::try_get(ch).is_some(), "bad test glyph: {}", ch);
                tiles.set(Point(x as i32, y as i32), ch);
            }
        }
        // Tests mint the acting actor from their own `ActorMap`, whose first
        // key would otherwise equal this mint's first key (independent slotmaps
        // hand out identical initial keys). Burn that first slot so world actors
        // get aids distinct from the acting actor's.
        let mut mint = ActorMap::default();
        mint.add(&ActorArgs::default());
        Self { tiles, views: vec![], turn: 0, statuses: vec![], mint }
    }

    // Registers a foe-by-default bystander and returns its id. The closure
    // can adjust the view (team, rank, priority, status flags).
    pub fn add_actor<F: FnOnce(&mut ActorView)>(&mut self, pos: Point, f: F) -> AID {
        let aid = self.mint.add(&ActorArgs::default());
        let mut view = ActorView {
            aid,
            pos,
            team: TeamId(1),
            rank: self.views.len(),
            priority: 0,
            asleep: false,
            frozen: false,
            acted: false,
        };
        f(&mut view);
        self.views.push(view);
        aid
    }

    // Registers the acting actor itself, so occupancy checks see it.
    pub fn add_actor_with_aid(&mut self, aid: AID, pos: Point) {
        self.views.push(ActorView {
            aid,
            pos,
            team: TeamId(0),
            rank: 0,
            priority: 0,
            asleep: false,
            frozen: false,
            acted: false,
        });
    }

    pub fn view_mut(&mut self, aid: AID) -> &mut ActorView {
        self.views.iter_mut().find(|x| x.aid == aid).unwrap()
    }
}

impl WorldView for TestWorld {
    fn tile(&self, p: Point) -> &'static Tile {
        Tile::get(self.tiles.get(p))
    }

    fn occupant(&self, p: Point) -> Option<ActorView> {
        self.views.iter().find(|x| x.pos == p).copied()
    }

    fn sees(&self, from: Point, to: Point, fidelity: Fidelity) -> bool {
        clear_sightline(from, to, |p| {
            let tile = self.tile(p);
            tile.wall() || (fidelity == Fidelity::Strict && tile.cover())
        })
    }

    fn actors(&self) -> Vec<ActorView> {
        self.views.clone()
    }

    fn turn_count(&self) -> i32 {
        self.turn
    }

    fn map_status(&self, id: StatusId) -> bool {
        self.statuses.contains(&id)
    }

    fn nearest_exit(&self, from: Point) -> Option<Point> {
        let mut best: Option<Point> = None;
        for y in 0..self.tiles.size.1 {
            for x in 0..self.tiles.size.0 {
                let p = Point(x, y);
                if !self.tile(p).exit() { continue; }
                let closer = match best {
                    Some(b) => (p - from).len_l2_squared() < (b - from).len_l2_squared(),
                    None => true,
                };
                if closer { best = Some(p); }
            }
        }
        best
    }
}
