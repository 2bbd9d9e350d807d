use crate::actor::{Actor, AID};
use crate::attack::{eligible, EngageRanges};
use crate::base::{HashMap, Point};
use crate::moves::{check_masked, Pass};
use crate::pathing::{DijkstraPaths, Path};
use crate::world::{ActorView, Mobility, WorldView};

//////////////////////////////////////////////////////////////////////////////

// Stance

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Stance {
    // Head straight for the nearest target's tile, range be damned.
    Approach,
    // Stand in range, as close as the map allows.
    Close,
    // Stand in range, at the edge of the longest engagement range available.
    Avoid,
}

//////////////////////////////////////////////////////////////////////////////

// Candidates

// An ephemeral per-turn destination: a tile some eligible ability could hit
// `target` from. The weight is the range-footprint ring distance, compared
// only under Close/Avoid.
#[derive(Clone, Copy, Debug)]
pub struct Candidate {
    pub dest: Point,
    pub weight: i32,
    pub aid: AID,
    pub target: Point,
}

// Builds the candidate destination set for one target. The actor's current
// tile only qualifies when it has banked turns to spare; otherwise trivial
// "already there" paths would dominate the search.
pub fn candidates(me: &Actor, target: &ActorView, stance: Stance,
                  ranges: EngageRanges, view: &dyn WorldView) -> Vec<Candidate> {
    let mut result: Vec<Candidate> = vec![];

    if stance == Stance::Approach {
        result.push(Candidate { dest: target.pos, weight: 0, aid: target.aid, target: target.pos });
        return result;
    }

    let distance = (target.pos - me.pos).len_l1();
    let mut seen: HashMap<Point, usize> = HashMap::default();

    for slot in eligible(me, ranges, distance) {
        let Some(ability) = me.abilities[slot].ability else { continue };
        if ability.self_targeted() { continue; }

        for dest in ability.footprint(target.pos) {
            if dest == me.pos && me.banked_turns <= 0 { continue; }
            if check_masked(view, me, me.mobility, dest, Pass::Prethink) ==
               crate::pathing::Status::Blocked { continue; }
            if !ability.hits(dest, target.pos, view) { continue; }

            let weight = (dest - target.pos).len_l1();
            match seen.get(&dest).copied() {
                Some(i) => {
                    let keep = &mut result[i].weight;
                    let better = match stance {
                        Stance::Avoid => weight > *keep,
                        _ => weight < *keep,
                    };
                    if better { *keep = weight; }
                }
                None => {
                    seen.insert(dest, result.len());
                    result.push(Candidate {
                        dest, weight, aid: target.aid, target: target.pos,
                    });
                }
            }
        }
    }
    result
}

//////////////////////////////////////////////////////////////////////////////

// Selection

// One shared pathfinding call over the whole candidate set. Ordering:
// complete paths over partial ones, cheaper over dearer, then the stance's
// weight preference, then physical proximity to the target, then scan order.
// Partial paths toward the actor's own tile earn no credit.
pub fn choose_destination(me: &Actor, cands: &[Candidate], stance: Stance,
                          mobility: Mobility, view: &dyn WorldView, pass: Pass,
                          limit: i32) -> Option<(Candidate, Path)> {
    if cands.is_empty() { return None; }

    let dests: Vec<Point> = cands.iter().map(|x| x.dest).collect();
    let check = |p: Point| check_masked(view, me, mobility, p, pass);
    let paths = DijkstraPaths(me.pos, &dests, limit, check);

    let mut best: Option<(usize, &Path)> = None;
    for (i, path) in paths.iter().enumerate() {
        let Some(path) = path else { continue };
        if !path.complete && cands[i].dest == me.pos { continue; }

        let key = |i: usize, path: &Path| {
            let cand = &cands[i];
            let weight = match stance {
                Stance::Avoid => -cand.weight,
                _ => cand.weight,
            };
            let proximity = (cand.dest - cand.target).len_l2_squared();
            (!path.complete, path.cost, weight, proximity, i)
        };
        let better = match best {
            Some((j, existing)) => key(i, path) < key(j, existing),
            None => true,
        };
        if better { best = Some((i, path)); }
    }

    best.map(|(i, path)| (cands[i], path.clone()))
}

//////////////////////////////////////////////////////////////////////////////
