use std::fmt::Debug;

use bitflags::bitflags;
use lazy_static::lazy_static;

use crate::actor::AID;
use crate::base::{HashMap, Point};
use crate::dex::StatusId;

//////////////////////////////////////////////////////////////////////////////

// Tile

const FLAG_WALL: u32 = 1 << 0;
const FLAG_WATER: u32 = 1 << 1;
const FLAG_LAVA: u32 = 1 << 2;
const FLAG_CHASM: u32 = 1 << 3;
const FLAG_COVER: u32 = 1 << 4;
const FLAG_EXIT: u32 = 1 << 5;

bitflags! {
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub struct Mobility: u32 {
        const WALK  = 1 << 0;
        const SWIM  = 1 << 1;
        const FLY   = 1 << 2;
        const PHASE = 1 << 3;
        const MAGMA = 1 << 4;
    }
}

pub struct Tile {
    pub flags: u32,
    pub glyph: char,
    pub description: &'static str,
}

impl Tile {
    pub fn get(ch: char) -> &'static Tile { TILES.get(&ch).unwrap() }
    pub fn try_get(ch: char) -> Option<&'static Tile> { TILES.get(&ch) }

    pub fn wall(&self) -> bool { self.flags & FLAG_WALL != 0 }
    pub fn cover(&self) -> bool { self.flags & FLAG_COVER != 0 }
    pub fn exit(&self) -> bool { self.flags & FLAG_EXIT != 0 }
    pub fn hazard(&self) -> bool { self.flags & FLAG_LAVA != 0 }

    pub fn passable(&self, mobility: Mobility) -> bool {
        if self.wall() { return mobility.contains(Mobility::PHASE); }
        if self.flags & FLAG_WATER != 0 {
            return mobility.intersects(Mobility::SWIM | Mobility::FLY);
        }
        if self.flags & FLAG_LAVA != 0 {
            return mobility.intersects(Mobility::MAGMA | Mobility::FLY);
        }
        if self.flags & FLAG_CHASM != 0 { return mobility.contains(Mobility::FLY); }
        true
    }
}

impl Debug for Tile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.glyph)
    }
}

impl Eq for &'static Tile {}

impl PartialEq for &'static Tile {
    fn eq(&self, next: &&'static Tile) -> bool {
        *self as *const Tile == *next as *const Tile
    }
}

lazy_static! {
    static ref TILES: HashMap<char, Tile> = {
        let items: Vec<(char, u32, &'static str)> = vec![
            ('.', 0,          "floor"),
            ('#', FLAG_WALL,  "wall"),
            ('~', FLAG_WATER, "water"),
            ('^', FLAG_LAVA,  "lava"),
            ('_', FLAG_CHASM, "chasm"),
            ('%', FLAG_COVER, "thicket"),
            ('>', FLAG_EXIT,  "stairs"),
        ];
        let mut result = HashMap::default();
        for (glyph, flags, description) in items {
            result.insert(glyph, Tile { flags, glyph, description });
        }
        result
    };
}

//////////////////////////////////////////////////////////////////////////////

// Teams and visibility

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct TeamId(pub u32);

// Loose is presence detection: "something is over there". Strict is a clear
// sightline, the level needed to aim an ability or confirm an identity.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Fidelity { Loose, Strict }

//////////////////////////////////////////////////////////////////////////////

// ActorView

// The per-actor projection the decision layer reads for everyone but itself.
// Produced by the world each turn; cheap to copy.
#[derive(Clone, Copy, Debug)]
pub struct ActorView {
    pub aid: AID,
    pub pos: Point,
    pub team: TeamId,
    pub rank: usize,
    pub priority: i32,
    pub asleep: bool,
    pub frozen: bool,
    pub acted: bool,
}

impl ActorView {
    pub fn incapacitated(&self) -> bool { self.asleep || self.frozen }
}

//////////////////////////////////////////////////////////////////////////////

// WorldView

// The world query surface. The turn engine owns the map and the roster; the
// decision layer only ever reads through this trait, and implementations in
// this crate exist solely for tests.
pub trait WorldView {
    fn tile(&self, p: Point) -> &'static Tile;

    fn occupant(&self, p: Point) -> Option<ActorView>;

    fn sees(&self, from: Point, to: Point, fidelity: Fidelity) -> bool;

    // Roster enumeration, in rank order per team (scan order for callers).
    fn actors(&self) -> Vec<ActorView>;

    fn turn_count(&self) -> i32;

    fn map_status(&self, id: StatusId) -> bool;

    fn nearest_exit(&self, from: Point) -> Option<Point>;

    fn teammates(&self, team: TeamId) -> Vec<ActorView> {
        let mut result: Vec<_> =
            self.actors().into_iter().filter(|x| x.team == team).collect();
        result.sort_by_key(|x| x.rank);
        result
    }

    // The nearest visible teammate that outranks `rank` (lower index leads).
    fn nearest_leader(&self, team: TeamId, rank: usize, from: Point) -> Option<ActorView> {
        let mut result: Option<ActorView> = None;
        for other in self.teammates(team) {
            if other.rank >= rank { continue; }
            if !self.sees(from, other.pos, Fidelity::Loose) { continue; }
            let closer = match &result {
                Some(x) => (other.pos - from).len_l2_squared() <
                           (x.pos - from).len_l2_squared(),
                None => true,
            };
            if closer { result = Some(other); }
        }
        result
    }
}

//////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_mobility() {
        let walker = Mobility::WALK;
        let flier = Mobility::WALK | Mobility::FLY;
        let ghost = Mobility::PHASE;

        assert!(Tile::get('.').passable(walker));
        assert!(!Tile::get('#').passable(walker));
        assert!(Tile::get('#').passable(ghost));
        assert!(!Tile::get('~').passable(walker));
        assert!(Tile::get('~').passable(flier));
        assert!(!Tile::get('^').passable(walker));
        assert!(Tile::get('^').passable(flier));
        assert!(!Tile::get('_').passable(walker));
        assert!(Tile::get('_').passable(flier));
    }

    #[test]
    fn test_tile_flags() {
        assert!(Tile::get('%').cover());
        assert!(!Tile::get('%').wall());
        assert!(Tile::get('>').exit());
        assert!(Tile::get('^').hazard());
        assert!(Tile::try_get('?').is_none());
    }
}
