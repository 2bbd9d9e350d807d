use crate::actor::{Actor, Awareness};
use crate::world::{ActorView, Fidelity, WorldView};

//////////////////////////////////////////////////////////////////////////////

// Sense

// How a plan detects actors: ordinary sight, or the in-the-dark sense used by
// ambush-type plans, which is omniscient within its radius.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Sense { Sight, Dark(i32) }

//////////////////////////////////////////////////////////////////////////////

// Acceptability

fn player_like(me: &Actor) -> bool {
    me.awareness.contains(Awareness::PLAYER_SENSE)
}

// Whether `other` is something `me` would react to at all, ignoring line of
// sight. An empty result downstream is a normal outcome, not an error.
pub fn acceptable(me: &Actor, other: &ActorView) -> bool {
    if other.aid == me.aid { return false; }
    if other.team == me.team && !me.awareness.contains(Awareness::ATTACKS_ALLIES) {
        return false;
    }

    // Player-sensible actors never bother sleeping or frozen targets; others
    // only hold back when configured not to disturb them.
    let shy = player_like(me) || me.awareness.contains(Awareness::WONT_DISTURB);
    if other.incapacitated() && shy { return false; }

    true
}

fn sensed(me: &Actor, view: &dyn WorldView, sense: Sense, other: &ActorView) -> bool {
    let delta = other.pos - me.pos;

    // The dark sense skips sightline checks entirely. Player-sensible actors
    // don't get that shortcut: their detection has to look intentional.
    if let Sense::Dark(radius) = sense {
        if !player_like(me) { return delta.len_l1() <= radius; }
    }

    if !delta.in_l2_range(me.sight) { return false; }
    let fidelity = if player_like(me) { Fidelity::Strict } else { Fidelity::Loose };
    view.sees(me.pos, other.pos, fidelity)
}

//////////////////////////////////////////////////////////////////////////////

// Acquisition

// All acceptable, sensed targets, nearest first. The sort is stable, so ties
// in squared distance fall back to roster scan order.
pub fn acquire(me: &Actor, view: &dyn WorldView, sense: Sense) -> Vec<ActorView> {
    let mut result: Vec<_> = view.actors().into_iter()
        .filter(|x| acceptable(me, x) && sensed(me, view, sense, x))
        .collect();
    result.sort_by_key(|x| (x.pos - me.pos).len_l2_squared());
    tracing::trace!(count = result.len(), "target acquisition");
    result
}

//////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{ActorArgs, ActorMap, AID};
    use crate::base::Point;
    use crate::fixture::TestWorld;
    use crate::world::TeamId;

    fn actor(args: ActorArgs) -> (ActorMap, AID) {
        let mut actors = ActorMap::default();
        let aid = actors.add(&args);
        (actors, aid)
    }

    #[test]
    fn test_nearest_first_with_scan_order_ties() {
        let mut world = TestWorld::new(&[
            ".........",
            ".........",
            ".........",
        ]);
        let (actors, aid) = actor(ActorArgs { pos: Point(4, 1), ..Default::default() });
        let far = world.add_actor(Point(8, 1), |_| {});
        let tie_a = world.add_actor(Point(2, 1), |_| {});
        let tie_b = world.add_actor(Point(6, 1), |_| {});

        let found = acquire(&actors[aid], &world, Sense::Sight);
        let aids: Vec<_> = found.iter().map(|x| x.aid).collect();
        assert_eq!(aids, vec![tie_a, tie_b, far]);
    }

    #[test]
    fn test_allies_excluded_unless_flagged() {
        let mut world = TestWorld::new(&["....."]);
        let (mut actors, aid) = actor(ActorArgs { pos: Point(0, 0), ..Default::default() });
        world.add_actor(Point(2, 0), |x| { x.team = TeamId(0); });

        assert!(acquire(&actors[aid], &world, Sense::Sight).is_empty());
        actors[aid].awareness = crate::actor::Awareness::ATTACKS_ALLIES;
        assert_eq!(acquire(&actors[aid], &world, Sense::Sight).len(), 1);
    }

    #[test]
    fn test_wont_disturb_skips_sleepers() {
        let mut world = TestWorld::new(&["....."]);
        let (mut actors, aid) = actor(ActorArgs { pos: Point(0, 0), ..Default::default() });
        world.add_actor(Point(2, 0), |x| { x.asleep = true; });

        assert_eq!(acquire(&actors[aid], &world, Sense::Sight).len(), 1);
        actors[aid].awareness = crate::actor::Awareness::WONT_DISTURB;
        assert!(acquire(&actors[aid], &world, Sense::Sight).is_empty());
    }

    #[test]
    fn test_dark_sense_ignores_walls_within_radius() {
        let mut world = TestWorld::new(&[
            "...#...",
        ]);
        let (actors, aid) = actor(ActorArgs { pos: Point(0, 0), ..Default::default() });
        world.add_actor(Point(5, 0), |_| {});

        assert!(acquire(&actors[aid], &world, Sense::Sight).is_empty());
        assert_eq!(acquire(&actors[aid], &world, Sense::Dark(6)).len(), 1);
        assert!(acquire(&actors[aid], &world, Sense::Dark(4)).is_empty());
    }

    #[test]
    fn test_player_sense_needs_a_clear_strict_sightline() {
        let mut world = TestWorld::new(&[
            "...%...",
        ]);
        let (mut actors, aid) = actor(ActorArgs { pos: Point(0, 0), ..Default::default() });
        world.add_actor(Point(5, 0), |_| {});

        // Cover doesn't stop loose detection...
        assert_eq!(acquire(&actors[aid], &world, Sense::Sight).len(), 1);

        // ...but a player-sensible actor needs the strict sightline, and gets
        // no dark-sense shortcut.
        actors[aid].awareness = crate::actor::Awareness::PLAYER_SENSE;
        assert!(acquire(&actors[aid], &world, Sense::Sight).is_empty());
        assert!(acquire(&actors[aid], &world, Sense::Dark(6)).is_empty());
    }

    #[test]
    fn test_player_sense_always_spares_sleepers() {
        let mut world = TestWorld::new(&["....."]);
        let (mut actors, aid) = actor(ActorArgs { pos: Point(0, 0), ..Default::default() });
        world.add_actor(Point(2, 0), |x| { x.asleep = true; });

        actors[aid].awareness = crate::actor::Awareness::PLAYER_SENSE;
        assert!(acquire(&actors[aid], &world, Sense::Sight).is_empty());
    }
}
