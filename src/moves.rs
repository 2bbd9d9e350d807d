use crate::actor::Actor;
use crate::base::{dirs, Point};
use crate::pathing::Status;
use crate::world::{ActorView, Mobility, WorldView};

//////////////////////////////////////////////////////////////////////////////

// Pass

// Pre-think runs before anyone in the turn batch has moved, so peer positions
// are not yet stable and occupants are ignored; Commit is the evaluation whose
// result actually executes. The legal moves seen in pre-think are a superset
// of the legal moves at commit time.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Pass { Prethink, Commit }

//////////////////////////////////////////////////////////////////////////////

// Action

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MoveAction { pub step: Point, pub deliberate: bool }

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AbilityAction { pub slot: usize, pub dir: Point }

// The committed result of a think: opaque to this crate once produced, handed
// to the turn engine for execution. Defer is Option::None at the Plan level.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Action {
    Wait,
    Move(MoveAction),
    UseAbility(AbilityAction),
}

//////////////////////////////////////////////////////////////////////////////

// Blocking predicates

// Tier 1: terrain and static hazards. Enforced in both passes.
fn terrain_blocked(view: &dyn WorldView, me: &Actor, mobility: Mobility, p: Point) -> bool {
    let tile = view.tile(p);
    if !tile.passable(mobility) { return true; }
    // Hazard-shy actors refuse tiles they could cross but would be hurt by.
    if tile.hazard() && !mobility.contains(Mobility::MAGMA) &&
       me.awareness.contains(crate::actor::Awareness::AVOIDS_HAZARDS) {
        return true;
    }
    false
}

// The shared check, shaped for pathfinding closures. Tier 2 (occupants) only
// applies on Commit; the actor's own tile is always free.
pub fn check_masked(view: &dyn WorldView, me: &Actor, mobility: Mobility,
                    p: Point, pass: Pass) -> Status {
    if p == me.pos { return Status::Free; }
    if terrain_blocked(view, me, mobility, p) { return Status::Blocked; }
    if pass == Pass::Commit {
        if let Some(other) = view.occupant(p) {
            if other.aid != me.aid { return Status::Occupied; }
        }
    }
    Status::Free
}

pub fn check(view: &dyn WorldView, me: &Actor, p: Point, pass: Pass) -> Status {
    check_masked(view, me, me.mobility, p, pass)
}

// The yielding rule: an occupied tile may still be entered when the occupant
// has strictly lower turn priority and has not yet acted this batch.
pub fn passable_occupant(me: &Actor, other: &ActorView) -> bool {
    other.priority < me.priority && !other.acted
}

pub fn can_step(view: &dyn WorldView, me: &Actor, dir: Point, pass: Pass) -> bool {
    if dir == dirs::NONE || me.cannot_walk { return false; }
    let next = me.pos + dir;

    // Diagonal steps cannot cut corners.
    if dir.0 != 0 && dir.1 != 0 {
        if check(view, me, me.pos + Point(dir.0, 0), pass) == Status::Blocked { return false; }
        if check(view, me, me.pos + Point(0, dir.1), pass) == Status::Blocked { return false; }
    }

    match check(view, me, next, pass) {
        Status::Free => true,
        Status::Occupied => match view.occupant(next) {
            Some(other) => passable_occupant(me, &other),
            None => true,
        },
        Status::Blocked | Status::Unknown => false,
    }
}

// A chosen step, degraded to Wait if it is not executable. Keeps blocked
// commits from silently failing in an order-dependent way.
pub fn step(view: &dyn WorldView, me: &Actor, dir: Point, pass: Pass,
            deliberate: bool) -> Action {
    if dir == dirs::NONE { return Action::Wait; }
    if !can_step(view, me, dir, pass) { return Action::Wait; }
    Action::Move(MoveAction { step: dir, deliberate })
}

//////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{ActorArgs, ActorMap, Awareness};
    use crate::fixture::TestWorld;

    fn actor_at(pos: Point) -> (ActorMap, crate::actor::AID) {
        let mut actors = ActorMap::default();
        let aid = actors.add(&ActorArgs { pos, ..Default::default() });
        (actors, aid)
    }

    #[test]
    fn test_prethink_ignores_occupants_commit_does_not() {
        let mut world = TestWorld::new(&["...."]);
        let (actors, aid) = actor_at(Point(0, 0));
        let me = &actors[aid];
        world.add_actor(Point(1, 0), |x| { x.priority = 10; });

        assert_eq!(check(&world, me, Point(1, 0), Pass::Prethink), Status::Free);
        assert_eq!(check(&world, me, Point(1, 0), Pass::Commit), Status::Occupied);
        assert!(can_step(&world, me, Point(1, 0), Pass::Prethink));
        assert!(!can_step(&world, me, Point(1, 0), Pass::Commit));
    }

    #[test]
    fn test_yielding_rule() {
        let mut world = TestWorld::new(&["...."]);
        let (mut actors, aid) = actor_at(Point(0, 0));
        actors[aid].priority = 5;

        // Lower priority, not yet acted: passable.
        world.add_actor(Point(1, 0), |x| { x.priority = 1; });
        assert!(can_step(&world, &actors[aid], Point(1, 0), Pass::Commit));

        // Lower priority but already acted: blocked, and the step waits.
        world.views[0].acted = true;
        assert!(!can_step(&world, &actors[aid], Point(1, 0), Pass::Commit));
        assert_eq!(step(&world, &actors[aid], Point(1, 0), Pass::Commit, true),
                   Action::Wait);
    }

    #[test]
    fn test_terrain_is_enforced_in_both_passes() {
        let world = TestWorld::new(&[".#"]);
        let (actors, aid) = actor_at(Point(0, 0));
        let me = &actors[aid];
        assert_eq!(check(&world, me, Point(1, 0), Pass::Prethink), Status::Blocked);
        assert_eq!(check(&world, me, Point(1, 0), Pass::Commit), Status::Blocked);
    }

    #[test]
    fn test_hazard_avoidance_flag() {
        let world = TestWorld::new(&[".^"]);
        let (mut actors, aid) = actor_at(Point(0, 0));
        actors[aid].mobility = Mobility::WALK | Mobility::FLY;

        assert_eq!(check(&world, &actors[aid], Point(1, 0), Pass::Commit), Status::Free);
        actors[aid].awareness = Awareness::AVOIDS_HAZARDS;
        assert_eq!(check(&world, &actors[aid], Point(1, 0), Pass::Commit), Status::Blocked);

        // Magma-proof actors do not count lava as a hazard.
        actors[aid].mobility = Mobility::WALK | Mobility::MAGMA;
        assert_eq!(check(&world, &actors[aid], Point(1, 0), Pass::Commit), Status::Free);
    }

    #[test]
    fn test_own_tile_is_free() {
        let mut world = TestWorld::new(&[".."]);
        let (actors, aid) = actor_at(Point(0, 0));
        world.add_actor_with_aid(aid, Point(0, 0));
        assert_eq!(check(&world, &actors[aid], Point(0, 0), Pass::Commit), Status::Free);
    }
}
