//! # Duel Card Game
//!
//! A small two-player card game in the style of digital collectible card
//! games. It exists so the agent and the arena have a stochastic, multi-action
//! turn structure to play against; the real rules engine is out of scope.
//!
//! ## Rules
//! - Each hero starts with 20 health and a 20-card deck
//! - Player 0 starts with 3 cards, player 1 with 4
//! - At the start of a turn the active player gains a mana crystal (up to 10),
//!   refills mana, readies their minions and draws a random card from their deck
//! - Drawing from an empty deck deals 1, 2, 3, ... fatigue damage
//! - A player may play any affordable card, attack with each ready minion once,
//!   and ends the turn explicitly
//! - A hero at 0 health loses; if both die together, or turn 60 ends, the game is a draw

use crate::arena::GameSetup;
use crate::error::SearchError;
use crate::policy::{MctsAgent, Policy};
use crate::{GameRng, PlayerId, SearchConfig, Simulator};
use rand::Rng;
use std::fmt;
use thiserror::Error;

pub const STARTING_HEALTH: i32 = 20;
pub const MAX_MANA: u32 = 10;
pub const MAX_HAND: usize = 10;
pub const MAX_BOARD: usize = 7;
/// The game is drawn once this many turns have been played.
pub const TURN_LIMIT: u32 = 60;

/// Every player plays the same list.
pub const STANDARD_DECK: [Card; 20] = [
    Card::Bolt,
    Card::Bolt,
    Card::Bolt,
    Card::Recruit,
    Card::Recruit,
    Card::Recruit,
    Card::Heal,
    Card::Heal,
    Card::Insight,
    Card::Insight,
    Card::Knight,
    Card::Knight,
    Card::Knight,
    Card::Knight,
    Card::Fireball,
    Card::Fireball,
    Card::Ogre,
    Card::Ogre,
    Card::Ogre,
    Card::Recruit,
];

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Card {
    /// Deal 2 damage to the enemy hero.
    Bolt,
    /// Deal 5 damage to the enemy hero.
    Fireball,
    /// Restore 4 health to your hero.
    Heal,
    /// Draw 2 cards.
    Insight,
    /// A 1/2 minion.
    Recruit,
    /// A 3/3 minion.
    Knight,
    /// A 6/6 minion.
    Ogre,
}

impl Card {
    pub fn cost(self) -> u32 {
        match self {
            Card::Bolt | Card::Recruit => 1,
            Card::Heal => 2,
            Card::Insight | Card::Knight => 3,
            Card::Fireball => 4,
            Card::Ogre => 5,
        }
    }

    /// Attack and health of minion cards.
    pub fn minion_stats(self) -> Option<(i32, i32)> {
        match self {
            Card::Recruit => Some((1, 2)),
            Card::Knight => Some((3, 3)),
            Card::Ogre => Some((6, 6)),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Minion {
    pub card: Card,
    pub attack: i32,
    pub health: i32,
    /// Minions cannot attack on the turn they are summoned, nor twice a turn.
    pub ready: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Target {
    Hero,
    Minion(usize),
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum DuelAction {
    Play(Card),
    Attack { attacker: usize, target: Target },
    EndTurn,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DuelError {
    #[error("{action:?} is not legal for player {player}")]
    IllegalAction { action: DuelAction, player: PlayerId },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hero {
    pub health: i32,
    pub mana: u32,
    pub max_mana: u32,
    pub deck: Vec<Card>,
    pub hand: Vec<Card>,
    pub board: Vec<Minion>,
    fatigue: i32,
}

impl Hero {
    fn new() -> Self {
        Self {
            health: STARTING_HEALTH,
            mana: 0,
            max_mana: 0,
            deck: STANDARD_DECK.to_vec(),
            hand: Vec::with_capacity(MAX_HAND),
            board: Vec::with_capacity(MAX_BOARD),
            fatigue: 0,
        }
    }

    /// Draws a random card from the deck, burning it if the hand is full.
    fn draw(&mut self, rng: &mut GameRng) {
        if self.deck.is_empty() {
            self.fatigue += 1;
            self.health -= self.fatigue;
            return;
        }
        let card = self.deck.swap_remove(rng.random_range(0..self.deck.len()));
        if self.hand.len() < MAX_HAND {
            self.hand.push(card);
        }
    }
}

/// Complete state of a duel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Duel {
    heroes: [Hero; 2],
    active: PlayerId,
    turn: u32,
}

impl Duel {
    /// Deals opening hands and starts player 0's first turn.
    pub fn new(rng: &mut GameRng) -> Self {
        let mut game = Self {
            heroes: [Hero::new(), Hero::new()],
            active: 0,
            turn: 1,
        };
        for _ in 0..3 {
            game.heroes[0].draw(rng);
        }
        for _ in 0..4 {
            game.heroes[1].draw(rng);
        }
        game.begin_turn(rng);
        game
    }

    pub fn hero(&self, player: PlayerId) -> &Hero {
        &self.heroes[player]
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    fn begin_turn(&mut self, rng: &mut GameRng) {
        let hero = &mut self.heroes[self.active];
        hero.max_mana = (hero.max_mana + 1).min(MAX_MANA);
        hero.mana = hero.max_mana;
        for minion in &mut hero.board {
            minion.ready = true;
        }
        hero.draw(rng);
    }

    fn play_card(&mut self, card: Card, rng: &mut GameRng) {
        let (own, enemy) = self.split_heroes();
        if let Some(position) = own.hand.iter().position(|&c| c == card) {
            own.hand.remove(position);
        }
        own.mana -= card.cost();
        match card {
            Card::Bolt => enemy.health -= 2,
            Card::Fireball => enemy.health -= 5,
            Card::Heal => own.health = (own.health + 4).min(STARTING_HEALTH),
            Card::Insight => {
                own.draw(rng);
                own.draw(rng);
            }
            Card::Recruit | Card::Knight | Card::Ogre => {
                if let Some((attack, health)) = card.minion_stats() {
                    own.board.push(Minion {
                        card,
                        attack,
                        health,
                        ready: false,
                    });
                }
            }
        }
    }

    fn attack(&mut self, attacker: usize, target: Target) {
        let (own, enemy) = self.split_heroes();
        let minion = &mut own.board[attacker];
        minion.ready = false;
        match target {
            Target::Hero => enemy.health -= minion.attack,
            Target::Minion(defender) => {
                let defender = &mut enemy.board[defender];
                defender.health -= minion.attack;
                minion.health -= defender.attack;
            }
        }
        own.board.retain(|m| m.health > 0);
        enemy.board.retain(|m| m.health > 0);
    }

    /// Mutable access to the active hero and the opponent.
    fn split_heroes(&mut self) -> (&mut Hero, &mut Hero) {
        let [first, second] = &mut self.heroes;
        if self.active == 0 {
            (first, second)
        } else {
            (second, first)
        }
    }
}

impl fmt::Display for Duel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Turn {}, player {} to move", self.turn, self.active)?;
        for (player, hero) in self.heroes.iter().enumerate() {
            write!(
                f,
                "P{}: {} hp, mana {}/{}, deck {}, hand {:?}, board [",
                player,
                hero.health,
                hero.mana,
                hero.max_mana,
                hero.deck.len(),
                hero.hand
            )?;
            for (i, minion) in hero.board.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{:?} {}/{}", minion.card, minion.attack, minion.health)?;
            }
            writeln!(f, "]")?;
        }
        Ok(())
    }
}

impl Simulator for Duel {
    type Action = DuelAction;
    type Error = DuelError;

    fn legal_actions(&self) -> Vec<DuelAction> {
        if self.is_decided() {
            return Vec::new();
        }
        let own = &self.heroes[self.active];
        let enemy = &self.heroes[1 - self.active];
        let mut actions = Vec::new();

        for &card in &own.hand {
            let play = DuelAction::Play(card);
            let board_full = card.minion_stats().is_some() && own.board.len() >= MAX_BOARD;
            if card.cost() <= own.mana && !board_full && !actions.contains(&play) {
                actions.push(play);
            }
        }
        for (attacker, _) in own.board.iter().enumerate().filter(|(_, m)| m.ready) {
            actions.push(DuelAction::Attack {
                attacker,
                target: Target::Hero,
            });
            for defender in 0..enemy.board.len() {
                actions.push(DuelAction::Attack {
                    attacker,
                    target: Target::Minion(defender),
                });
            }
        }
        actions.push(DuelAction::EndTurn);
        actions
    }

    fn apply_action(&mut self, action: &DuelAction, rng: &mut GameRng) -> Result<bool, DuelError> {
        if !self.legal_actions().contains(action) {
            return Err(DuelError::IllegalAction {
                action: *action,
                player: self.active,
            });
        }
        match *action {
            DuelAction::Play(card) => self.play_card(card, rng),
            DuelAction::Attack { attacker, target } => self.attack(attacker, target),
            DuelAction::EndTurn => return Ok(false),
        }
        Ok(!self.is_decided())
    }

    fn advance_turn(&mut self, rng: &mut GameRng) {
        self.active = 1 - self.active;
        self.turn += 1;
        if self.turn <= TURN_LIMIT {
            self.begin_turn(rng);
        }
    }

    fn is_decided(&self) -> bool {
        self.turn > TURN_LIMIT || self.heroes.iter().any(|hero| hero.health <= 0)
    }

    fn winner(&self) -> Option<PlayerId> {
        match (self.heroes[0].health <= 0, self.heroes[1].health <= 0) {
            (false, true) => Some(0),
            (true, false) => Some(1),
            _ => None,
        }
    }

    fn active_player(&self) -> PlayerId {
        self.active
    }
}

/// Fixed heuristic opponent: plays the most expensive affordable card, then
/// sends every ready minion at the enemy hero, then ends the turn.
#[derive(Debug, Default, Clone)]
pub struct AggroPolicy;

impl Policy<Duel> for AggroPolicy {
    fn name(&self) -> &str {
        "Aggro"
    }

    fn choose_action(
        &mut self,
        state: &Duel,
        legal_actions: &[DuelAction],
        _rng: &mut GameRng,
    ) -> Result<DuelAction, SearchError> {
        let mut best_play: Option<Card> = None;
        for action in legal_actions {
            if let DuelAction::Play(card) = *action {
                let useless_heal = card == Card::Heal
                    && state.hero(state.active_player()).health == STARTING_HEALTH;
                if !useless_heal && best_play.map_or(true, |best| card.cost() > best.cost()) {
                    best_play = Some(card);
                }
            }
        }
        if let Some(card) = best_play {
            return Ok(DuelAction::Play(card));
        }
        let face_attack = legal_actions.iter().find(|action| {
            matches!(
                action,
                DuelAction::Attack {
                    target: Target::Hero,
                    ..
                }
            )
        });
        if let Some(action) = face_attack {
            return Ok(*action);
        }
        legal_actions
            .iter()
            .find(|action| **action == DuelAction::EndTurn)
            .or_else(|| legal_actions.first())
            .copied()
            .ok_or(SearchError::EmptyActionSet {
                player: state.active_player(),
            })
    }
}

/// The arena match-up used by the `arena` binary: an MCTS agent in seat 0
/// against the aggro heuristic in seat 1.
#[derive(Debug, Clone)]
pub struct DuelSetup {
    pub search: SearchConfig,
}

impl DuelSetup {
    pub fn new(iterations: u32) -> Self {
        Self {
            search: SearchConfig::default().with_iterations(iterations),
        }
    }
}

impl GameSetup for DuelSetup {
    type Game = Duel;

    fn player_names(&self) -> [String; 2] {
        [
            format!("MCTS ({} iterations)", self.search.iterations),
            "Aggro".to_string(),
        ]
    }

    fn new_game(&self, rng: &mut GameRng) -> Duel {
        Duel::new(rng)
    }

    fn new_players(&self) -> [Box<dyn Policy<Duel>>; 2] {
        [
            Box::new(MctsAgent::new(self.search.clone())),
            Box::new(AggroPolicy),
        ]
    }

    /// Scores draws the way the searching agent values them.
    fn draw_score(&self) -> f64 {
        self.search.draw_reward
    }
}
