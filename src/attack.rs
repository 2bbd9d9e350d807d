use crate::actor::{Actor, Awareness};
use crate::base::{dirs, weighted, Point, RNG};
use crate::dex::AbilityClass;
use crate::moves::{AbilityAction, Action};
use crate::world::{ActorView, WorldView};

//////////////////////////////////////////////////////////////////////////////

// Policies

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AttackPolicy {
    // Ignore everything but the basic strike in slot 0.
    BasicOnly,
    // Weighted-random pick; movement may still have to walk it into range.
    WeightedWalkIn,
    // Weighted-random pick, but only among abilities that can hit right now.
    WeightedInRange,
    // Prefer non-damaging abilities when one can land.
    StatusBiased,
    // Deterministically best-scoring choice.
    Optimal,
}

// Minimum engagement distances, one per ability class. A plan tuned to keep
// its distance sets these above zero so close-quarters turns pick movement
// over attacks.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct EngageRanges {
    pub attack: i32,
    pub status: i32,
    pub self_status: i32,
}

impl EngageRanges {
    pub fn min_range(&self, class: AbilityClass) -> i32 {
        match class {
            AbilityClass::Attack => self.attack,
            AbilityClass::Status => self.status,
            AbilityClass::SelfStatus => self.self_status,
        }
    }
}

//////////////////////////////////////////////////////////////////////////////

// Eligibility

// Slot indices offered to the selector: the slot must be usable (ability
// present, charges left, not sealed, enabled) and the current distance must
// satisfy the class minimum.
pub fn eligible(me: &Actor, ranges: EngageRanges, distance: i32) -> Vec<usize> {
    let mut result = vec![];
    for (i, slot) in me.abilities.iter().enumerate() {
        if !slot.usable() { continue; }
        let Some(ability) = slot.ability else { continue };
        if distance < ranges.min_range(ability.class) { continue; }
        result.push(i);
    }
    result
}

fn hits_now(me: &Actor, slot: usize, target: &ActorView, view: &dyn WorldView) -> bool {
    let Some(ability) = me.abilities[slot].ability else { return false };
    ability.hits(me.pos, target.pos, view)
}

fn to_action(me: &Actor, slot: usize, target: &ActorView) -> Action {
    let ability = me.abilities[slot].ability.unwrap();
    let dir = if ability.self_targeted() {
        dirs::NONE
    } else {
        (target.pos - me.pos).signum()
    };
    Action::UseAbility(AbilityAction { slot, dir })
}

fn pick_weighted(me: &Actor, slots: &[usize], rng: &mut RNG) -> usize {
    let values: Vec<_> = slots.iter().map(|&i| {
        let weight = me.abilities[i].ability.map(|x| x.weight).unwrap_or(0);
        (std::cmp::max(weight, 1), i)
    }).collect();
    *weighted(&values, rng)
}

//////////////////////////////////////////////////////////////////////////////

// Selection

// Picks this turn's ability against `target`, or Wait when nothing qualifies.
// Callers treat Wait as "no attack chosen" and fall through to movement.
pub fn choose(me: &Actor, target: &ActorView, policy: AttackPolicy,
              ranges: EngageRanges, view: &dyn WorldView, rng: &mut RNG) -> Action {
    let distance = (target.pos - me.pos).len_l1();
    let offered = eligible(me, ranges, distance);
    if offered.is_empty() { return Action::Wait; }

    let in_range: Vec<usize> =
        offered.iter().copied().filter(|&i| hits_now(me, i, target, view)).collect();

    match policy {
        AttackPolicy::BasicOnly => {
            if in_range.contains(&0) { to_action(me, 0, target) } else { Action::Wait }
        }
        AttackPolicy::WeightedWalkIn => {
            let slot = pick_weighted(me, &offered, rng);
            if in_range.contains(&slot) { to_action(me, slot, target) } else { Action::Wait }
        }
        AttackPolicy::WeightedInRange => {
            if in_range.is_empty() { return Action::Wait; }
            to_action(me, pick_weighted(me, &in_range, rng), target)
        }
        AttackPolicy::StatusBiased => {
            let split = |damaging: bool| -> Vec<usize> {
                in_range.iter().copied().filter(|&i| {
                    me.abilities[i].ability.map_or(false, |x| x.damaging() == damaging)
                }).collect()
            };
            let biased = split(false);
            let pool = if biased.is_empty() { split(true) } else { biased };
            if pool.is_empty() { return Action::Wait; }
            to_action(me, pick_weighted(me, &pool, rng), target)
        }
        AttackPolicy::Optimal => {
            // Actors that don't actually know what's effective can't make the
            // optimal call; they degrade to a weighted in-range pick.
            if !me.awareness.contains(Awareness::TYPE_MATCHUPS) {
                if in_range.is_empty() { return Action::Wait; }
                return to_action(me, pick_weighted(me, &in_range, rng), target);
            }
            let score = |i: usize| {
                let ability = me.abilities[i].ability.unwrap();
                (ability.power, ability.reach, std::cmp::Reverse(i))
            };
            match in_range.iter().copied().max_by_key(|&i| score(i)) {
                Some(slot) => to_action(me, slot, target),
                None => Action::Wait,
            }
        }
    }
}

pub fn direction_to(from: Point, to: Point) -> Point {
    (to - from).signum()
}

//////////////////////////////////////////////////////////////////////////////
