use crate::actor::{Actor, Awareness, AID};
use crate::attack::{self, AttackPolicy, EngageRanges};
use crate::base::{dirs, sample, weighted, Point, RNG};
use crate::dex::{status, Ability, StatusId};
use crate::moves::{self, Action, AbilityAction, Pass};
use crate::pathing::{AStar, PathLength, Status};
use crate::position::{self, Stance};
use crate::target::{self, Sense};
use crate::trail::Trail;
use crate::world::{Fidelity, Mobility, WorldView};

//////////////////////////////////////////////////////////////////////////////

// Constants

const PATH_LIMIT_ENGAGE: i32 = 256;
const PATH_LIMIT_TRACK: i32 = 1024;

const ESCORT_RADIUS: i32 = 2;
const AMBUSH_SENSE_RADIUS: i32 = 6;

//////////////////////////////////////////////////////////////////////////////

// Interface

#[derive(Default)]
pub struct AIDebug {
    pub targets: Vec<Point>,
    pub destination: Option<Point>,
}

pub struct AIEnv<'a> {
    pub rng: &'a mut RNG,
    pub debug: Option<&'a mut AIDebug>,
}

pub struct Ctx<'a, 'b> {
    pub view: &'a dyn WorldView,
    pub pass: Pass,
    pub env: &'a mut AIEnv<'b>,
}

// What a pursuit plan holds onto between sightings. The actor reference goes
// first, the bare location one cycle later.
#[derive(Clone, Copy, Debug)]
pub struct TargetMemory {
    pub aid: Option<AID>,
    pub pos: Point,
}

// One reusable behavior strategy: stateless in configuration, holding only
// transient per-activation memory. Returning None defers to the next plan in
// the actor's chain. The trail/remembered accessors let a newly-activated
// plan inherit select state from whichever plan ran before it.
pub trait Plan {
    fn name(&self) -> &'static str;
    fn initialize(&mut self, _me: &Actor) {}
    fn switched_in(&mut self, _prev: &dyn Plan) {}
    fn think(&mut self, me: &mut Actor, ctx: &mut Ctx) -> Option<Action>;

    fn trail(&self) -> Option<&Trail> { None }
    fn remembered(&self) -> Option<TargetMemory> { None }
}

//////////////////////////////////////////////////////////////////////////////

// Shared helpers

fn sensed_at(me: &Actor, ctx: &Ctx, pos: Point) -> bool {
    (pos - me.pos).in_l2_range(me.sight) &&
    ctx.view.sees(me.pos, pos, Fidelity::Loose)
}

// The best legal step strictly increasing the distance to the nearest threat.
// None means cornered.
fn flee_step(me: &Actor, ctx: &Ctx, threats: &[Point]) -> Option<Point> {
    let spacing = |p: Point| {
        threats.iter().map(|&t| PathLength(t - p)).min().unwrap_or(i32::MAX)
    };
    let current = spacing(me.pos);

    let mut best: Option<(i32, Point)> = None;
    for &dir in &dirs::ALL {
        if !moves::can_step(ctx.view, me, dir, ctx.pass) { continue; }
        let score = spacing(me.pos + dir);
        if score <= current { continue; }
        let better = match best {
            Some((existing, _)) => score > existing,
            None => true,
        };
        if better { best = Some((score, dir)); }
    }
    best.map(|x| x.1)
}

fn escape_slot(me: &Actor) -> Option<usize> {
    me.abilities.iter().position(|x| {
        x.usable() && x.ability.map_or(false, |a| a.escape)
    })
}

// Cornered handling shared by the avoid family. Hold never defers; Defer
// hands the turn to the next plan (e.g. to fight back).
fn cornered_action(me: &Actor, cornered: Cornered) -> Option<Action> {
    if me.awareness.contains(Awareness::ESCAPE_ARTIST) {
        if let Some(slot) = escape_slot(me) {
            return Some(Action::UseAbility(AbilityAction { slot, dir: dirs::NONE }));
        }
    }
    match cornered {
        Cornered::Hold => Some(Action::Wait),
        Cornered::Defer => None,
    }
}

fn flee_behavior(me: &Actor, ctx: &mut Ctx, threats: &[Point],
                 cornered: Cornered) -> Option<Action> {
    if let Some(dir) = flee_step(me, ctx, threats) {
        return Some(moves::step(ctx.view, me, dir, ctx.pass, true));
    }
    cornered_action(me, cornered)
}

//////////////////////////////////////////////////////////////////////////////

// SeekPlan

#[derive(Clone, Copy)]
pub struct SeekConfig {
    pub stance: Stance,
    pub policy: AttackPolicy,
    pub ranges: EngageRanges,
    pub sense: Sense,
    pub mobility: Option<Mobility>,
}

impl Default for SeekConfig {
    fn default() -> Self {
        Self {
            stance: Stance::Approach,
            policy: AttackPolicy::WeightedWalkIn,
            ranges: EngageRanges::default(),
            sense: Sense::Sight,
            mobility: None,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SeekState { Searching, Tracking, Engaging }

// Pursue-and-strike. Acquires the nearest acceptable target, attacks when the
// selector picks something, otherwise repositions per its stance; with no
// visible target it tracks the last-known location until that memory decays.
pub struct SeekPlan {
    config: SeekConfig,
    state: SeekState,
    memory: Option<TargetMemory>,
    trail: Trail,
}

impl SeekPlan {
    pub fn new(config: SeekConfig) -> Self {
        Self { config, state: SeekState::Searching, memory: None, trail: Trail::new() }
    }

    pub fn state(&self) -> SeekState { self.state }

    fn mobility(&self, me: &Actor) -> Mobility {
        self.config.mobility.unwrap_or(me.mobility)
    }

    fn engage(&mut self, me: &mut Actor, ctx: &mut Ctx) -> Option<Action> {
        let found = target::acquire(me, ctx.view, self.config.sense);
        let Some(t) = found.first().copied() else { return None };

        self.state = SeekState::Engaging;
        self.memory = Some(TargetMemory { aid: Some(t.aid), pos: t.pos });
        if let Some(debug) = ctx.env.debug.as_deref_mut() {
            debug.targets = found.iter().map(|x| x.pos).collect();
        }

        let SeekConfig { stance, policy, ranges, .. } = self.config;
        let action = attack::choose(me, &t, policy, ranges, ctx.view, ctx.env.rng);
        if action != Action::Wait { return Some(action); }

        // No attack chosen; reposition. Destinations we recently walked away
        // from only stay in the running if nothing else is available.
        let cands = position::candidates(me, &t, stance, ranges, ctx.view);
        let fresh: Vec<_> = cands.iter().copied()
            .filter(|x| !self.trail.would_backtrack(x.dest)).collect();
        let cands = if fresh.is_empty() { cands } else { fresh };
        let chosen = position::choose_destination(
            me, &cands, stance, self.mobility(me), ctx.view, ctx.pass,
            PATH_LIMIT_ENGAGE);
        let Some((cand, path)) = chosen else { return Some(Action::Wait) };

        if let Some(debug) = ctx.env.debug.as_deref_mut() {
            debug.destination = Some(cand.dest);
        }
        match path.first_step() {
            Some(next) => Some(moves::step(ctx.view, me, next - me.pos, ctx.pass, true)),
            None => Some(Action::Wait),
        }
    }

    fn track(&mut self, me: &mut Actor, ctx: &mut Ctx) -> Option<Action> {
        let mut memory = self.memory.take()?;

        // Memory decay is pre-think bookkeeping: losing the sightline to the
        // remembered location forgets the actor first, then the location.
        if ctx.pass == Pass::Prethink && !sensed_at(me, ctx, memory.pos) {
            if memory.aid.take().is_none() {
                self.state = SeekState::Searching;
                return None;
            }
        }

        if me.pos == memory.pos {
            // Arrived and found nothing.
            self.state = SeekState::Searching;
            return None;
        }

        self.state = SeekState::Tracking;
        self.memory = Some(memory);

        let mobility = self.mobility(me);
        let check = |p: Point| moves::check_masked(ctx.view, me, mobility, p, ctx.pass);
        let path = AStar(me.pos, memory.pos, PATH_LIMIT_TRACK, check);
        match path.and_then(|x| x.first_step()) {
            Some(next) => Some(moves::step(ctx.view, me, next - me.pos, ctx.pass, true)),
            None => Some(Action::Wait),
        }
    }
}

impl Plan for SeekPlan {
    fn name(&self) -> &'static str { "seek" }

    fn initialize(&mut self, _me: &Actor) {
        self.state = SeekState::Searching;
        self.memory = None;
        self.trail.clear();
    }

    fn switched_in(&mut self, prev: &dyn Plan) {
        self.state = SeekState::Searching;
        self.memory = None;
        self.trail = prev.trail().cloned().unwrap_or_default();
    }

    fn think(&mut self, me: &mut Actor, ctx: &mut Ctx) -> Option<Action> {
        if ctx.pass == Pass::Commit { self.trail.record(me.pos); }
        self.trail.trim(me.pos, me.sight);

        if let Some(action) = self.engage(me, ctx) { return Some(action); }
        self.track(me, ctx)
    }

    fn trail(&self) -> Option<&Trail> { Some(&self.trail) }

    fn remembered(&self) -> Option<TargetMemory> { self.memory }
}

//////////////////////////////////////////////////////////////////////////////

// AvoidPlan

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Cornered { Hold, Defer }

#[derive(Clone, Copy)]
pub struct AvoidConfig {
    pub foes: bool,
    pub allies: bool,
    pub cornered: Cornered,
    pub to_exit: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AvoidState { Calm, Fleeing, Cornered }

// Flee from foes and/or allies. The cornered switch is the only difference
// between several named variants in the library.
pub struct AvoidPlan {
    config: AvoidConfig,
    state: AvoidState,
}

impl AvoidPlan {
    pub fn new(config: AvoidConfig) -> Self {
        Self { config, state: AvoidState::Calm }
    }

    pub fn state(&self) -> AvoidState { self.state }

    fn threats(&self, me: &Actor, ctx: &Ctx) -> Vec<Point> {
        ctx.view.actors().into_iter().filter_map(|x| {
            if x.aid == me.aid { return None; }
            let flagged = if x.team == me.team { self.config.allies } else { self.config.foes };
            if !flagged || !sensed_at(me, ctx, x.pos) { return None; }
            Some(x.pos)
        }).collect()
    }
}

impl Plan for AvoidPlan {
    fn name(&self) -> &'static str { "avoid" }

    fn initialize(&mut self, _me: &Actor) {
        self.state = AvoidState::Calm;
    }

    fn switched_in(&mut self, _prev: &dyn Plan) {
        self.state = AvoidState::Calm;
    }

    fn think(&mut self, me: &mut Actor, ctx: &mut Ctx) -> Option<Action> {
        let threats = self.threats(me, ctx);
        if threats.is_empty() {
            self.state = AvoidState::Calm;
            return None;
        }
        self.state = AvoidState::Fleeing;

        // Route toward the stairs when so configured and they're known.
        if self.config.to_exit {
            if let Some(exit) = ctx.view.nearest_exit(me.pos) {
                if exit != me.pos {
                    let check = |p: Point| moves::check(ctx.view, me, p, ctx.pass);
                    let path = AStar(me.pos, exit, PATH_LIMIT_TRACK, check);
                    if let Some(next) = path.and_then(|x| x.first_step()) {
                        return Some(moves::step(
                            ctx.view, me, next - me.pos, ctx.pass, true));
                    }
                }
            }
        }

        let action = flee_behavior(me, ctx, &threats, self.config.cornered);
        if matches!(action, Some(Action::Wait) | None) {
            self.state = AvoidState::Cornered;
        }
        action
    }
}

//////////////////////////////////////////////////////////////////////////////

// RetreatPlan

// Flee from foes once health drops below 1/factor of max; defer otherwise.
// With factor 2 this is the classic "flee below half health".
pub struct RetreatPlan {
    factor: i32,
    cornered: Cornered,
}

impl RetreatPlan {
    pub fn new(factor: i32, cornered: Cornered) -> Self {
        Self { factor, cornered }
    }
}

impl Plan for RetreatPlan {
    fn name(&self) -> &'static str { "retreat" }

    fn think(&mut self, me: &mut Actor, ctx: &mut Ctx) -> Option<Action> {
        if me.cur_hp * self.factor >= me.max_hp { return None; }

        let threats: Vec<Point> = ctx.view.actors().into_iter().filter_map(|x| {
            let foe = x.aid != me.aid && x.team != me.team;
            if foe && sensed_at(me, ctx, x.pos) { Some(x.pos) } else { None }
        }).collect();
        if threats.is_empty() { return None; }

        flee_behavior(me, ctx, &threats, self.cornered)
    }
}

//////////////////////////////////////////////////////////////////////////////

// BossPlan

// Standard pursue-and-strike behind a one-way escalation latch: at or below
// half health, every slot holding a real ability becomes enabled, and nothing
// ever disables them again.
pub struct BossPlan {
    seek: SeekPlan,
    latched: bool,
}

impl BossPlan {
    pub fn new(config: SeekConfig) -> Self {
        Self { seek: SeekPlan::new(config), latched: false }
    }
}

impl Plan for BossPlan {
    fn name(&self) -> &'static str { "boss" }

    fn initialize(&mut self, me: &Actor) {
        self.seek.initialize(me);
        self.latched = false;
    }

    fn switched_in(&mut self, prev: &dyn Plan) {
        self.seek.switched_in(prev);
    }

    fn think(&mut self, me: &mut Actor, ctx: &mut Ctx) -> Option<Action> {
        if !self.latched && 2 * me.cur_hp <= me.max_hp {
            for slot in me.abilities.iter_mut() {
                if slot.ability.is_some() { slot.enabled = true; }
            }
            self.latched = true;
            tracing::debug!("escalation latch engaged");
        }
        self.seek.think(me, ctx)
    }

    fn trail(&self) -> Option<&Trail> { self.seek.trail() }

    fn remembered(&self) -> Option<TargetMemory> { self.seek.remembered() }
}

//////////////////////////////////////////////////////////////////////////////

// WaitPeriodPlan

// Dormant except when the floor turn counter hits the period: on those turns
// it defers so the plans below get to act.
pub struct WaitPeriodPlan {
    period: i32,
}

impl WaitPeriodPlan {
    pub fn new(period: i32) -> Self {
        Self { period }
    }
}

impl Plan for WaitPeriodPlan {
    fn name(&self) -> &'static str { "wait-period" }

    fn think(&mut self, _me: &mut Actor, ctx: &mut Ctx) -> Option<Action> {
        if self.period > 0 && ctx.view.turn_count() % self.period == 0 { return None; }
        Some(Action::Wait)
    }
}

//////////////////////////////////////////////////////////////////////////////

// DormantPlan

#[derive(Clone, Copy, Debug)]
pub enum Trigger {
    SelfStatus(StatusId),
    MapStatus(StatusId),
}

// Waits until the trigger condition appears, then permanently defers. The
// wake is a latch: it survives control transfers for the rest of the
// encounter.
pub struct DormantPlan {
    trigger: Trigger,
    woken: bool,
}

impl DormantPlan {
    pub fn new(trigger: Trigger) -> Self {
        Self { trigger, woken: false }
    }
}

impl Plan for DormantPlan {
    fn name(&self) -> &'static str { "dormant" }

    fn initialize(&mut self, _me: &Actor) {
        self.woken = false;
    }

    fn think(&mut self, me: &mut Actor, ctx: &mut Ctx) -> Option<Action> {
        if !self.woken {
            let hit = match self.trigger {
                Trigger::SelfStatus(id) => me.has_status(id),
                Trigger::MapStatus(id) => ctx.view.map_status(id),
            };
            if hit {
                self.woken = true;
                tracing::debug!(trigger = ?self.trigger, "dormancy broken");
            }
        }
        if self.woken { None } else { Some(Action::Wait) }
    }
}

//////////////////////////////////////////////////////////////////////////////

// EscortPlan

// Orbit the nearest visible higher-rank teammate: uniformly-random legal
// steps whose destination stays within the radius. Waits when no step
// satisfies the constraint; defers when no leader is visible at all.
pub struct EscortPlan {
    radius: i32,
}

impl EscortPlan {
    pub fn new(radius: i32) -> Self {
        Self { radius }
    }
}

impl Plan for EscortPlan {
    fn name(&self) -> &'static str { "escort" }

    fn think(&mut self, me: &mut Actor, ctx: &mut Ctx) -> Option<Action> {
        let leader = ctx.view.nearest_leader(me.team, me.rank, me.pos)?;

        let mut options: Vec<Point> = vec![];
        for &dir in &dirs::ALL {
            if (me.pos + dir - leader.pos).len_l1() > self.radius { continue; }
            if !moves::can_step(ctx.view, me, dir, ctx.pass) { continue; }
            options.push(dir);
        }
        if options.is_empty() { return Some(Action::Wait); }

        let dir = *sample(&options, ctx.env.rng);
        Some(moves::step(ctx.view, me, dir, ctx.pass, false))
    }
}

//////////////////////////////////////////////////////////////////////////////

// AmbushPlan

// Lurk in cover: stand in (and only move through) vision-limiting terrain,
// striking whatever wanders into reach. A provocation status lifts the
// terrain restriction and swaps sight for an omniscient short-range sense.
pub struct AmbushPlan {
    seek: SeekPlan,
    provoke: StatusId,
}

impl AmbushPlan {
    pub fn new(radius: i32) -> Self {
        let config = SeekConfig { sense: Sense::Dark(radius), ..Default::default() };
        Self { seek: SeekPlan::new(config), provoke: status::ENRAGED }
    }
}

impl Plan for AmbushPlan {
    fn name(&self) -> &'static str { "ambush" }

    fn initialize(&mut self, me: &Actor) {
        self.seek.initialize(me);
    }

    fn switched_in(&mut self, prev: &dyn Plan) {
        self.seek.switched_in(prev);
    }

    fn think(&mut self, me: &mut Actor, ctx: &mut Ctx) -> Option<Action> {
        if me.has_status(self.provoke) { return self.seek.think(me, ctx); }

        // Not yet provoked: never leave cover.
        if !ctx.view.tile(me.pos).cover() {
            for &dir in &dirs::ALL {
                if !ctx.view.tile(me.pos + dir).cover() { continue; }
                if !moves::can_step(ctx.view, me, dir, ctx.pass) { continue; }
                return Some(moves::step(ctx.view, me, dir, ctx.pass, false));
            }
            return Some(Action::Wait);
        }

        let found = target::acquire(me, ctx.view, Sense::Sight);
        if let Some(t) = found.first() {
            let config = self.seek.config;
            let action = attack::choose(
                me, t, config.policy, config.ranges, ctx.view, ctx.env.rng);
            if action != Action::Wait { return Some(action); }

            // Reposition, staying strictly inside cover.
            let check = |p: Point| {
                if p != me.pos && !ctx.view.tile(p).cover() { return Status::Blocked; }
                moves::check(ctx.view, me, p, ctx.pass)
            };
            let path = AStar(me.pos, t.pos, PATH_LIMIT_ENGAGE, check);
            if let Some(next) = path.and_then(|x| x.first_step()) {
                return Some(moves::step(ctx.view, me, next - me.pos, ctx.pass, true));
            }
        }
        Some(Action::Wait)
    }
}

//////////////////////////////////////////////////////////////////////////////

// LeadInPlan

// A one-shot opener: the first time a target is in reach of the configured
// ability, use it, then defer for the rest of the encounter.
pub struct LeadInPlan {
    ability: &'static Ability,
    used: bool,
}

impl LeadInPlan {
    pub fn new(ability: &'static Ability) -> Self {
        Self { ability, used: false }
    }
}

impl Plan for LeadInPlan {
    fn name(&self) -> &'static str { "lead-in" }

    fn initialize(&mut self, _me: &Actor) {
        self.used = false;
    }

    fn think(&mut self, me: &mut Actor, ctx: &mut Ctx) -> Option<Action> {
        if self.used { return None; }

        let found = target::acquire(me, ctx.view, Sense::Sight);
        let t = found.first()?;

        let Some(slot) = me.abilities.iter().position(|x| {
            x.usable() && x.ability == Some(self.ability)
        }) else {
            // The opener is gone (sealed, drained, forgotten); stop offering.
            self.used = true;
            return None;
        };

        if !self.ability.hits(me.pos, t.pos, ctx.view) { return None; }

        if ctx.pass == Pass::Commit { self.used = true; }
        let dir = if self.ability.self_targeted() {
            dirs::NONE
        } else {
            attack::direction_to(me.pos, t.pos)
        };
        Some(Action::UseAbility(AbilityAction { slot, dir }))
    }
}

//////////////////////////////////////////////////////////////////////////////

// WanderPlan

// Exploration biased forward of the trail heading, so the actor keeps
// covering new ground instead of pacing. Terminal: it always produces
// something, even if only a Wait.
#[derive(Default)]
pub struct WanderPlan {
    trail: Trail,
}

impl WanderPlan {
    pub fn new() -> Self { Self::default() }
}

impl Plan for WanderPlan {
    fn name(&self) -> &'static str { "wander" }

    fn initialize(&mut self, _me: &Actor) {
        self.trail.clear();
    }

    fn switched_in(&mut self, prev: &dyn Plan) {
        // Inherit the previous plan's path history so we don't immediately
        // double back over ground it just covered.
        self.trail = prev.trail().cloned().unwrap_or_default();
    }

    fn think(&mut self, me: &mut Actor, ctx: &mut Ctx) -> Option<Action> {
        if ctx.pass == Pass::Commit { self.trail.record(me.pos); }
        self.trail.trim(me.pos, me.sight);

        let mut options: Vec<(i32, Point)> = vec![];
        for &dir in &dirs::ALL {
            if !moves::can_step(ctx.view, me, dir, ctx.pass) { continue; }
            let dest = me.pos + dir;
            let mut weight = 1;
            if self.trail.is_forward(me.pos, dest) { weight += 3; }
            if !self.trail.would_backtrack(dest) { weight += 4; }
            options.push((weight, dir));
        }
        if options.is_empty() { return Some(Action::Wait); }

        let dir = *weighted(&options, ctx.env.rng);
        Some(moves::step(ctx.view, me, dir, ctx.pass, false))
    }

    fn trail(&self) -> Option<&Trail> { Some(&self.trail) }
}

//////////////////////////////////////////////////////////////////////////////

// StillPlan

pub struct StillPlan;

impl Plan for StillPlan {
    fn name(&self) -> &'static str { "still" }

    fn think(&mut self, _me: &mut Actor, _ctx: &mut Ctx) -> Option<Action> {
        Some(Action::Wait)
    }
}

//////////////////////////////////////////////////////////////////////////////

// Library

// The named configurations actors are actually assigned. Several entries are
// the same plan under a different switch.
pub mod library {
    use super::*;

    pub fn attack_foes() -> Box<dyn Plan> {
        Box::new(SeekPlan::new(SeekConfig::default()))
    }

    pub fn brute() -> Box<dyn Plan> {
        let config = SeekConfig { policy: AttackPolicy::BasicOnly, ..Default::default() };
        Box::new(SeekPlan::new(config))
    }

    pub fn ranged_attacker() -> Box<dyn Plan> {
        let config = SeekConfig {
            stance: Stance::Close,
            policy: AttackPolicy::WeightedInRange,
            ..Default::default()
        };
        Box::new(SeekPlan::new(config))
    }

    pub fn cautious_attacker() -> Box<dyn Plan> {
        let config = SeekConfig {
            stance: Stance::Avoid,
            policy: AttackPolicy::WeightedInRange,
            ranges: EngageRanges { attack: 2, ..Default::default() },
            ..Default::default()
        };
        Box::new(SeekPlan::new(config))
    }

    pub fn status_setter() -> Box<dyn Plan> {
        let config = SeekConfig {
            stance: Stance::Close,
            policy: AttackPolicy::StatusBiased,
            ..Default::default()
        };
        Box::new(SeekPlan::new(config))
    }

    pub fn tactician() -> Box<dyn Plan> {
        let config = SeekConfig {
            stance: Stance::Close,
            policy: AttackPolicy::Optimal,
            ..Default::default()
        };
        Box::new(SeekPlan::new(config))
    }

    pub fn avoid_foes() -> Box<dyn Plan> {
        Box::new(AvoidPlan::new(AvoidConfig {
            foes: true, allies: false, cornered: Cornered::Hold, to_exit: false,
        }))
    }

    pub fn avoid_foes_or_fight() -> Box<dyn Plan> {
        Box::new(AvoidPlan::new(AvoidConfig {
            foes: true, allies: false, cornered: Cornered::Defer, to_exit: false,
        }))
    }

    pub fn avoid_allies() -> Box<dyn Plan> {
        Box::new(AvoidPlan::new(AvoidConfig {
            foes: false, allies: true, cornered: Cornered::Defer, to_exit: false,
        }))
    }

    pub fn avoid_everyone() -> Box<dyn Plan> {
        Box::new(AvoidPlan::new(AvoidConfig {
            foes: true, allies: true, cornered: Cornered::Hold, to_exit: false,
        }))
    }

    pub fn flee_to_stairs() -> Box<dyn Plan> {
        Box::new(AvoidPlan::new(AvoidConfig {
            foes: true, allies: false, cornered: Cornered::Hold, to_exit: true,
        }))
    }

    pub fn coward(factor: i32) -> Box<dyn Plan> {
        Box::new(RetreatPlan::new(factor, Cornered::Defer))
    }

    pub fn escort_leader() -> Box<dyn Plan> {
        Box::new(EscortPlan::new(ESCORT_RADIUS))
    }

    pub fn ambusher() -> Box<dyn Plan> {
        Box::new(AmbushPlan::new(AMBUSH_SENSE_RADIUS))
    }

    pub fn boss() -> Box<dyn Plan> {
        Box::new(BossPlan::new(SeekConfig::default()))
    }

    pub fn sleeper_cycle(period: i32) -> Box<dyn Plan> {
        Box::new(WaitPeriodPlan::new(period))
    }

    pub fn sleeper_until_hit() -> Box<dyn Plan> {
        Box::new(DormantPlan::new(Trigger::SelfStatus(status::RATTLED)))
    }

    pub fn sleeper_until_storm() -> Box<dyn Plan> {
        Box::new(DormantPlan::new(Trigger::MapStatus(status::STORM)))
    }

    pub fn opener(ability: &str) -> Box<dyn Plan> {
        Box::new(LeadInPlan::new(Ability::get(ability)))
    }

    pub fn wanderer() -> Box<dyn Plan> {
        Box::new(WanderPlan::new())
    }

    pub fn statue() -> Box<dyn Plan> {
        Box::new(StillPlan)
    }
}

//////////////////////////////////////////////////////////////////////////////

// Execution

// The behavior chain: plans in fixed order, first non-deferred result wins,
// and a no-op Wait if every plan defers. Out-of-bounds or empty ability slots
// in a produced action degrade to Wait rather than reaching the turn engine.
pub struct Tactic {
    plans: Vec<Box<dyn Plan>>,
    active: Option<usize>,
}

impl Tactic {
    pub fn new(plans: Vec<Box<dyn Plan>>) -> Self {
        Self { plans, active: None }
    }

    // Called once when this chain is assigned to an actor.
    pub fn initialize(&mut self, me: &Actor) {
        for plan in &mut self.plans { plan.initialize(me); }
        self.active = None;
    }

    // Called when this chain replaces another one on the same actor: every
    // plan gets the chance to inherit transient state from whichever plan was
    // last in control.
    pub fn switch_in(&mut self, previous: &dyn Plan) {
        for plan in &mut self.plans { plan.switched_in(previous); }
    }

    // The plan whose result was last executed, if any.
    pub fn active_plan(&self) -> Option<&dyn Plan> {
        self.active.map(|i| &*self.plans[i])
    }

    pub fn think(&mut self, me: &mut Actor, view: &dyn WorldView, pass: Pass,
                 env: &mut AIEnv) -> Action {
        if me.cannot_act { return Action::Wait; }

        let mut ctx = Ctx { view, pass, env };
        for i in 0..self.plans.len() {
            let Some(action) = self.plans[i].think(me, &mut ctx) else { continue };
            let action = validated(me, action);
            if pass == Pass::Commit { self.active = Some(i); }
            tracing::debug!(plan = self.plans[i].name(), ?action, ?pass, "think");
            return action;
        }
        if pass == Pass::Commit { self.active = None; }
        Action::Wait
    }
}

fn validated(me: &Actor, action: Action) -> Action {
    if let Action::UseAbility(x) = action {
        let ok = me.slot(x.slot).map_or(false, |s| s.ability.is_some());
        if !ok { return Action::Wait; }
    }
    action
}

//////////////////////////////////////////////////////////////////////////////
