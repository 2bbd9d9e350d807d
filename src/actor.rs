use std::iter::FusedIterator;
use std::num::NonZeroU64;
use std::ops::{Index, IndexMut};

use bitflags::bitflags;
use slotmap::{DefaultKey, Key, KeyData};
use slotmap::hop::HopSlotMap;

use thin_vec::ThinVec;

use crate::static_assert_size;
use crate::base::{dirs, Point};
use crate::dex::{incapacitating, Ability, StatusId};
use crate::world::{ActorView, Mobility, TeamId};

//////////////////////////////////////////////////////////////////////////////

const DEFAULT_CHARGES: i32 = 12;
const DEFAULT_HP: i32 = 20;
const DEFAULT_SIGHT: i32 = 10;

//////////////////////////////////////////////////////////////////////////////

// Awareness

bitflags! {
    // Per-actor intelligence flags. Recognized configuration per the data
    // model; the item-related bits are read by the item systems outside this
    // crate, not by the decision layer.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub struct Awareness: u32 {
        const ATTACKS_ALLIES = 1 << 0;
        const PICKS_UP_ITEMS = 1 << 1;
        const USES_ITEMS     = 1 << 2;
        const TYPE_MATCHUPS  = 1 << 3;
        const ESCAPE_ARTIST  = 1 << 4;
        const WONT_DISTURB   = 1 << 5;
        const AVOIDS_HAZARDS = 1 << 6;
        const PLAYER_SENSE   = 1 << 7;
    }
}

//////////////////////////////////////////////////////////////////////////////

// Ability slots and statuses

#[derive(Clone, Copy)]
pub struct AbilitySlot {
    pub ability: Option<&'static Ability>,
    pub charges: i32,
    pub sealed: bool,
    pub enabled: bool,
}

impl AbilitySlot {
    pub fn empty() -> Self {
        Self { ability: None, charges: 0, sealed: false, enabled: true }
    }

    pub fn of(ability: &'static Ability) -> Self {
        Self { ability: Some(ability), charges: DEFAULT_CHARGES, sealed: false, enabled: true }
    }

    pub fn usable(&self) -> bool {
        self.ability.is_some() && self.charges > 0 && !self.sealed && self.enabled
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StatusPayload { None, Stacks(i32), Countdown(i32) }

#[derive(Clone, Copy, Debug)]
pub struct StatusEffect {
    pub id: StatusId,
    pub payload: StatusPayload,
}

//////////////////////////////////////////////////////////////////////////////

// Actor

pub struct ActorArgs {
    pub pos: Point,
    pub team: TeamId,
    pub rank: usize,
    pub priority: i32,
    pub hp: i32,
    pub sight: i32,
    pub awareness: Awareness,
    pub mobility: Mobility,
    pub abilities: Vec<&'static Ability>,
}

impl Default for ActorArgs {
    fn default() -> Self {
        Self {
            pos: Point::default(),
            team: TeamId::default(),
            rank: 0,
            priority: 0,
            hp: DEFAULT_HP,
            sight: DEFAULT_SIGHT,
            awareness: Awareness::default(),
            mobility: Mobility::WALK,
            abilities: vec![Ability::get("Strike")],
        }
    }
}

pub struct Actor {
    pub aid: AID,
    pub cur_hp: i32,
    pub max_hp: i32,
    pub team: TeamId,
    pub rank: usize,
    pub priority: i32,
    pub sight: i32,
    pub banked_turns: i32,
    pub awareness: Awareness,
    pub mobility: Mobility,
    pub abilities: ThinVec<AbilitySlot>,
    pub statuses: ThinVec<StatusEffect>,

    // Location:
    pub pos: Point,
    pub dir: Point,

    // Flags:
    pub cannot_walk: bool,
    pub cannot_act: bool,
}

impl Actor {
    fn new(aid: AID, args: &ActorArgs) -> Self {
        Self {
            aid,
            cur_hp: args.hp,
            max_hp: args.hp,
            team: args.team,
            rank: args.rank,
            priority: args.priority,
            sight: args.sight,
            banked_turns: 0,
            awareness: args.awareness,
            mobility: args.mobility,
            abilities: args.abilities.iter().map(|&x| AbilitySlot::of(x)).collect(),
            statuses: ThinVec::new(),

            // Location:
            pos: args.pos,
            dir: dirs::S,

            // Flags:
            cannot_walk: false,
            cannot_act: false,
        }
    }

    pub fn hp_fraction(&self) -> f64 {
        self.cur_hp as f64 / self.max_hp as f64
    }

    pub fn slot(&self, index: usize) -> Option<&AbilitySlot> {
        self.abilities.get(index)
    }

    pub fn status(&self, id: StatusId) -> Option<&StatusEffect> {
        self.statuses.iter().find(|x| x.id == id)
    }

    pub fn has_status(&self, id: StatusId) -> bool {
        self.status(id).is_some()
    }

    pub fn apply_status(&mut self, id: StatusId, payload: StatusPayload) {
        match self.statuses.iter_mut().find(|x| x.id == id) {
            Some(x) => x.payload = payload,
            None => self.statuses.push(StatusEffect { id, payload }),
        }
    }

    pub fn clear_status(&mut self, id: StatusId) {
        self.statuses.retain(|x| x.id != id);
    }

    pub fn incapacitated(&self) -> bool {
        self.statuses.iter().any(|x| incapacitating(x.id))
    }

    pub fn view(&self, acted: bool) -> ActorView {
        ActorView {
            aid: self.aid,
            pos: self.pos,
            team: self.team,
            rank: self.rank,
            priority: self.priority,
            asleep: self.has_status(crate::dex::status::SLEEP),
            frozen: self.has_status(crate::dex::status::FREEZE),
            acted,
        }
    }
}

//////////////////////////////////////////////////////////////////////////////

// AID

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct AID(NonZeroU64);
static_assert_size!(Option<AID>, 8);

impl Default for AID {
    fn default() -> Self {
        to_aid(DefaultKey::null())
    }
}

fn to_key(aid: AID) -> DefaultKey {
    KeyData::from_ffi(aid.0.get()).into()
}

fn to_aid(key: DefaultKey) -> AID {
    AID(NonZeroU64::new(key.data().as_ffi()).unwrap())
}

//////////////////////////////////////////////////////////////////////////////

// ActorMap

type BaseMap = HopSlotMap<DefaultKey, Actor>;

#[derive(Default)]
pub struct ActorMap(BaseMap);

impl ActorMap {
    pub fn add(&mut self, args: &ActorArgs) -> AID {
        to_aid(self.0.insert_with_key(|x| Actor::new(to_aid(x), args)))
    }

    pub fn clear(&mut self) { self.0.clear(); }

    pub fn get(&self, aid: AID) -> Option<&Actor> { self.0.get(to_key(aid)) }

    pub fn get_mut(&mut self, aid: AID) -> Option<&mut Actor> { self.0.get_mut(to_key(aid)) }

    pub fn has(&self, aid: AID) -> bool { self.0.contains_key(to_key(aid)) }

    pub fn remove(&mut self, aid: AID) -> Option<Actor> { self.0.remove(to_key(aid)) }

    pub fn iter(&self) -> Iter<'_> { Iter(self.0.iter()) }

    pub fn iter_mut(&mut self) -> IterMut<'_> { IterMut(self.0.iter_mut()) }
}

impl Index<AID> for ActorMap {
    type Output = Actor;
    fn index(&self, aid: AID) -> &Self::Output {
        self.get(aid).unwrap()
    }
}

impl IndexMut<AID> for ActorMap {
    fn index_mut(&mut self, aid: AID) -> &mut Self::Output {
        self.get_mut(aid).unwrap()
    }
}

impl<'a> IntoIterator for &'a ActorMap {
    type Item = (AID, &'a Actor);
    type IntoIter = Iter<'a>;
    fn into_iter(self) -> Self::IntoIter { self.iter() }
}

impl<'a> IntoIterator for &'a mut ActorMap {
    type Item = (AID, &'a mut Actor);
    type IntoIter = IterMut<'a>;
    fn into_iter(self) -> Self::IntoIter { self.iter_mut() }
}

//////////////////////////////////////////////////////////////////////////////

// ActorMap iterators

pub struct Iter<'a>(slotmap::hop::Iter<'a, DefaultKey, Actor>);

pub struct IterMut<'a>(slotmap::hop::IterMut<'a, DefaultKey, Actor>);

impl<'a> FusedIterator for Iter<'a> {}

impl<'a> FusedIterator for IterMut<'a> {}

impl<'a> Iterator for Iter<'a> {
    type Item = (AID, &'a Actor);
    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(k, v)| (to_aid(k), v))
    }
}

impl<'a> Iterator for IterMut<'a> {
    type Item = (AID, &'a mut Actor);
    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(k, v)| (to_aid(k), v))
    }
}

//////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dex::status;

    #[test]
    fn test_slot_usability() {
        let mut slot = AbilitySlot::of(Ability::get("Spark"));
        assert!(slot.usable());
        slot.sealed = true;
        assert!(!slot.usable());
        slot.sealed = false;
        slot.charges = 0;
        assert!(!slot.usable());
        assert!(!AbilitySlot::empty().usable());
    }

    #[test]
    fn test_status_set_is_keyed_by_id() {
        let mut actors = ActorMap::default();
        let aid = actors.add(&ActorArgs::default());
        let actor = &mut actors[aid];

        actor.apply_status(status::RATTLED, StatusPayload::Countdown(3));
        actor.apply_status(status::RATTLED, StatusPayload::Countdown(5));
        assert_eq!(actor.statuses.len(), 1);
        assert_eq!(actor.status(status::RATTLED).unwrap().payload,
                   StatusPayload::Countdown(5));

        assert!(!actor.incapacitated());
        actor.apply_status(status::SLEEP, StatusPayload::None);
        assert!(actor.incapacitated());
        actor.clear_status(status::SLEEP);
        assert!(!actor.incapacitated());
    }

    #[test]
    fn test_actor_map_round_trip() {
        let mut actors = ActorMap::default();
        let aid = actors.add(&ActorArgs { pos: Point(3, 4), ..Default::default() });
        assert!(actors.has(aid));
        assert_eq!(actors[aid].pos, Point(3, 4));
        assert_eq!(actors[aid].aid, aid);

        let removed = actors.remove(aid).unwrap();
        assert_eq!(removed.pos, Point(3, 4));
        assert!(!actors.has(aid));
    }
}
