pub mod actor;
pub mod ai;
pub mod attack;
pub mod base;
pub mod dex;
pub mod moves;
pub mod pathing;
pub mod position;
pub mod target;
pub mod trail;
pub mod world;

pub use actor::{Actor, ActorMap, AID};
pub use ai::{library, AIEnv, Ctx, Plan, Tactic};
pub use attack::{AttackPolicy, EngageRanges};
pub use moves::{AbilityAction, Action, MoveAction, Pass};
pub use position::Stance;
pub use target::Sense;
pub use trail::Trail;
pub use world::{ActorView, Fidelity, Mobility, TeamId, WorldView};

#[cfg(test)]
mod fixture;
