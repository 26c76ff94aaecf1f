#![allow(dead_code)]

use magistracy::model::*;
use magistracy::testutil::office_with;
use magistracy::{OfficeCatalog, Roster, SeatLedger, Simulation};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

pub const START_YEAR: i32 = -248;

pub const CANDIDATE_A: u64 = 1;
pub const CANDIDATE_B: u64 = 2;
pub const SITTING_CONSUL: u64 = 99;
pub const CONSUL_ELECT: u64 = 98;

/// Two consular seats in `START_YEAR`: one already claimed for next year, one open.
/// A (45, patrician, influence 20) and B (42, plebeian, influence 10) contest the open seat.
pub fn consul_race(seed: u64) -> (Simulation, Roster) {
    let consul = office_with("consul", 2, 1, 40, 5, |o| {
        o.assembly = Assembly::Centuriate;
    });

    let mut ledger = SeatLedger::new();
    ledger
        .assign(&consul, SITTING_CONSUL, START_YEAR, false)
        .unwrap();
    ledger
        .assign(&consul, CONSUL_ELECT, START_YEAR, true)
        .unwrap();

    let mut roster = Roster::new();
    roster.insert(person(CANDIDATE_A, 45, SocialClass::Patrician, 20.0));
    roster.insert(person(CANDIDATE_B, 42, SocialClass::Plebeian, 10.0));

    let sim = Simulation::builder(seed)
        .catalog(OfficeCatalog::from_definitions(vec![consul]))
        .ledger(ledger)
        .build()
        .unwrap();
    (sim, roster)
}

pub fn person(id: u64, age: u32, class: SocialClass, influence: f64) -> Character {
    let mut c = Character::new(id, format!("Citizen {id}"));
    c.age = age;
    c.class = class;
    c.influence = influence;
    c
}

const TRAIT_POOL: [Trait; 10] = [
    Trait::Ambitious,
    Trait::Proud,
    Trait::Charismatic,
    Trait::Eloquent,
    Trait::Generous,
    Trait::Pious,
    Trait::Shrewd,
    Trait::Cautious,
    Trait::Content,
    Trait::Bold,
];

/// A mixed population of `count` characters, reproducible from `seed`.
pub fn generated_roster(count: u64, seed: u64) -> Roster {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut roster = Roster::new();
    for id in 1..=count {
        let mut c = Character::new(id, format!("Citizen {id}"));
        c.age = rng.random_range(25..70);
        c.class = if rng.random_bool(0.3) {
            SocialClass::Patrician
        } else {
            SocialClass::Plebeian
        };
        if rng.random_bool(0.1) {
            c.gender = Gender::Female;
        }
        c.influence = rng.random_range(0.0..25.0);
        c.wealth = rng.random_range(0.0..8000.0);
        for _ in 0..rng.random_range(0..3) {
            let t = TRAIT_POOL[rng.random_range(0..TRAIT_POOL.len())].clone();
            if !c.traits.contains(&t) {
                c.traits.push(t);
            }
        }
        roster.insert(c);
    }
    roster
}

/// The default cursus honorum over a generated roster.
pub fn republic(seed: u64, population: u64) -> (Simulation, Roster) {
    let sim = Simulation::builder(seed)
        .catalog(OfficeCatalog::roman_republic())
        .build()
        .unwrap();
    (sim, generated_roster(population, seed ^ 0x5eed))
}

pub fn read_lines(path: &std::path::Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}
