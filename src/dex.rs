use lazy_static::lazy_static;

use crate::base::{HashMap, Point, LOS};
use crate::world::{Fidelity, WorldView};

//////////////////////////////////////////////////////////////////////////////

// Ability

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AbilityClass { Attack, Status, SelfStatus }

pub struct Ability {
    pub name: &'static str,
    pub class: AbilityClass,
    pub reach: i32,
    pub power: i32,
    pub weight: i32,
    pub escape: bool,
}

impl Ability {
    pub fn get(name: &str) -> &'static Ability {
        ABILITIES.get(name).unwrap_or_else(|| panic!("Unknown ability: {}", name))
    }

    pub fn try_get(name: &str) -> Option<&'static Ability> {
        ABILITIES.get(name)
    }

    pub fn damaging(&self) -> bool { self.class == AbilityClass::Attack }

    pub fn self_targeted(&self) -> bool { self.class == AbilityClass::SelfStatus }

    // The range footprint: true iff this ability, used from `from`, can hit an
    // actor standing at `target`. Reach is chebyshev; anything past melee also
    // needs a clear sightline.
    pub fn hits(&self, from: Point, target: Point, view: &dyn WorldView) -> bool {
        if self.self_targeted() { return true; }
        let delta = target - from;
        if delta == Point(0, 0) { return false; }
        if delta.len_l1() > self.reach { return false; }
        if self.reach <= 1 { return true; }
        view.sees(from, target, Fidelity::Strict)
    }

    // Every tile within reach of `target`, excluding the target's own tile.
    // Sightline filtering happens at the call site, where the map is known.
    pub fn footprint(&self, target: Point) -> Vec<Point> {
        let mut result = vec![];
        if self.self_targeted() { return result; }
        let r = self.reach;
        for y in -r..=r {
            for x in -r..=r {
                if x == 0 && y == 0 { continue; }
                result.push(target + Point(x, y));
            }
        }
        result
    }
}

impl std::fmt::Debug for Ability {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

impl Eq for &'static Ability {}

impl PartialEq for &'static Ability {
    fn eq(&self, next: &&'static Ability) -> bool {
        *self as *const Ability == *next as *const Ability
    }
}

lazy_static! {
    static ref ABILITIES: HashMap<&'static str, Ability> = {
        use AbilityClass::*;
        let items: Vec<(&'static str, AbilityClass, i32, i32, i32, bool)> = vec![
            // name         class       reach  power  weight  escape
            ("Strike",      Attack,     1,     40,    10,     false),
            ("Bite",        Attack,     1,     60,    8,      false),
            ("Spark",       Attack,     4,     50,    6,      false),
            ("Gale",        Attack,     8,     45,    4,      false),
            ("Torrent",     Attack,     10,    65,    3,      false),
            ("Screech",     Status,     3,     0,     6,      false),
            ("Lullaby",     Status,     3,     0,     4,      false),
            ("Harden",      SelfStatus, 0,     0,     5,      false),
            ("Focus",       SelfStatus, 0,     0,     5,      false),
            ("Blink",       SelfStatus, 0,     0,     2,      true),
        ];
        let mut result = HashMap::default();
        for (name, class, reach, power, weight, escape) in items {
            result.insert(name, Ability { name, class, reach, power, weight, escape });
        }
        result
    };
}

//////////////////////////////////////////////////////////////////////////////

// StatusId

// Statuses are interned by name. The payload a given id carries lives with the
// actor (see actor::StatusPayload); the combat and weather systems own the full
// effect tables, so the registry here is just the identifiers the decision
// layer reacts to.
#[derive(Clone, Copy, Eq, Hash, PartialEq)]
pub struct StatusId(pub &'static str);

impl std::fmt::Debug for StatusId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

pub mod status {
    use super::StatusId;

    pub const SLEEP: StatusId = StatusId("sleep");
    pub const FREEZE: StatusId = StatusId("freeze");
    pub const RATTLED: StatusId = StatusId("rattled");
    pub const ENRAGED: StatusId = StatusId("enraged");
    pub const STORM: StatusId = StatusId("storm");
}

pub fn incapacitating(id: StatusId) -> bool {
    id == status::SLEEP || id == status::FREEZE
}

//////////////////////////////////////////////////////////////////////////////

// A sightline test for worlds that only expose tiles. Implementors of
// WorldView can use it to answer Fidelity::Strict queries.

pub fn clear_sightline<F: Fn(Point) -> bool>(a: Point, b: Point, opaque: F) -> bool {
    let los = LOS(a, b);
    let last = los.len() - 1;
    los.iter().enumerate().all(|(i, &p)| {
        if i == 0 || i == last { return true; }
        !opaque(p)
    })
}

//////////////////////////////////////////////////////////////////////////////
