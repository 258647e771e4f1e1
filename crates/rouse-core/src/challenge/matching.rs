//! Match-objects: group items by category.
//!
//! Items from several categories are dealt face up in random order. The
//! user selects items one by one; a selection of `items_per_category`
//! items from a single category is matched, while mixing categories
//! clears the selection at no cost.

use std::collections::BTreeSet;
use std::time::Duration;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use tracing::debug;

use super::{
    ChallengeInput, ChallengeMachine, ChallengeSnapshot, FailureReason, PuzzleView, Status,
    Verdict,
};
use crate::alarm::ChallengeKind;
use crate::difficulty::Difficulty;
use crate::timer::Countdown;

/// Category name with its `(emoji, name)` items.
pub static CATEGORY_POOL: [(&str, [(&str, &str); 8]); 7] = [
    (
        "Fruits",
        [
            ("🍎", "Apple"),
            ("🍌", "Banana"),
            ("🍊", "Orange"),
            ("🍇", "Grapes"),
            ("🍓", "Strawberry"),
            ("🥝", "Kiwi"),
            ("🍑", "Cherry"),
            ("🥭", "Mango"),
        ],
    ),
    (
        "Animals",
        [
            ("🐱", "Cat"),
            ("🐶", "Dog"),
            ("🐰", "Rabbit"),
            ("🐻", "Bear"),
            ("🦁", "Lion"),
            ("🐯", "Tiger"),
            ("🐼", "Panda"),
            ("🐨", "Koala"),
        ],
    ),
    (
        "Sports",
        [
            ("⚽", "Soccer"),
            ("🏀", "Basketball"),
            ("🎾", "Tennis"),
            ("🏈", "Football"),
            ("🏐", "Volleyball"),
            ("🏓", "Ping Pong"),
            ("🏸", "Badminton"),
            ("🏒", "Hockey"),
        ],
    ),
    (
        "Vehicles",
        [
            ("🚗", "Car"),
            ("🚲", "Bike"),
            ("✈️", "Plane"),
            ("🚢", "Ship"),
            ("🚌", "Bus"),
            ("🚂", "Train"),
            ("🏍️", "Motorcycle"),
            ("🚁", "Helicopter"),
        ],
    ),
    (
        "Food",
        [
            ("🍕", "Pizza"),
            ("🍔", "Burger"),
            ("🌮", "Taco"),
            ("🍜", "Noodles"),
            ("🍣", "Sushi"),
            ("🥗", "Salad"),
            ("🍝", "Pasta"),
            ("🥪", "Sandwich"),
        ],
    ),
    (
        "Objects",
        [
            ("📱", "Phone"),
            ("💻", "Laptop"),
            ("⌚", "Watch"),
            ("🎧", "Headphones"),
            ("📚", "Book"),
            ("✏️", "Pencil"),
            ("🔑", "Key"),
            ("💡", "Bulb"),
        ],
    ),
    (
        "Nature",
        [
            ("🌳", "Tree"),
            ("🌸", "Flower"),
            ("🍄", "Mushroom"),
            ("🌊", "Wave"),
            ("⛰️", "Mountain"),
            ("🌙", "Moon"),
            ("⭐", "Star"),
            ("☀️", "Sun"),
        ],
    ),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchItem {
    pub category: &'static str,
    pub name: &'static str,
    pub emoji: &'static str,
}

/// Dealt items, already shuffled for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchPuzzle {
    items: Vec<MatchItem>,
    categories: usize,
    items_per_category: usize,
}

impl MatchPuzzle {
    pub fn new(items: Vec<MatchItem>, categories: usize, items_per_category: usize) -> Self {
        assert_eq!(
            items.len(),
            categories * items_per_category,
            "deal does not match its category layout"
        );
        Self {
            items,
            categories,
            items_per_category,
        }
    }

    pub fn generate<R: Rng + ?Sized>(difficulty: Difficulty, rng: &mut R) -> Self {
        let categories = difficulty.pick(2, 3, 4);
        let per_category = Self::items_per_category(difficulty);
        assert!(categories <= CATEGORY_POOL.len(), "not enough categories");
        assert!(per_category <= CATEGORY_POOL[0].1.len(), "not enough items");

        let mut pool: Vec<_> = CATEGORY_POOL.iter().collect();
        pool.shuffle(rng);

        let mut items = Vec::with_capacity(categories * per_category);
        for (category, entries) in pool.into_iter().take(categories) {
            for &(emoji, name) in entries.choose_multiple(rng, per_category) {
                items.push(MatchItem {
                    category: *category,
                    name,
                    emoji,
                });
            }
        }
        items.shuffle(rng);

        Self::new(items, categories, per_category)
    }

    pub fn items_per_category(difficulty: Difficulty) -> usize {
        difficulty.pick(3, 3, 4)
    }

    pub fn items(&self) -> &[MatchItem] {
        &self.items
    }

    pub fn categories(&self) -> usize {
        self.categories
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchItemView {
    pub emoji: &'static str,
    pub name: &'static str,
    pub selected: bool,
    pub matched: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchView {
    pub items: Vec<MatchItemView>,
    pub matches: usize,
    pub categories: usize,
    pub items_per_category: usize,
}

#[derive(Debug, Clone)]
pub struct MatchChallenge {
    difficulty: Difficulty,
    puzzle: MatchPuzzle,
    selected: BTreeSet<usize>,
    matched: BTreeSet<usize>,
    matches: usize,
    countdown: Countdown,
    status: Status,
}

impl MatchChallenge {
    pub fn new(difficulty: Difficulty, puzzle: MatchPuzzle) -> Self {
        Self {
            difficulty,
            puzzle,
            selected: BTreeSet::new(),
            matched: BTreeSet::new(),
            matches: 0,
            countdown: Countdown::new(Self::time_budget(difficulty)),
            status: Status::Playing,
        }
    }

    pub fn time_budget(difficulty: Difficulty) -> u32 {
        difficulty.pick(60, 75, 90)
    }

    pub fn matches(&self) -> usize {
        self.matches
    }

    pub fn selected(&self) -> impl Iterator<Item = usize> + '_ {
        self.selected.iter().copied()
    }

    pub fn puzzle(&self) -> &MatchPuzzle {
        &self.puzzle
    }

    fn selected_categories(&self) -> BTreeSet<&'static str> {
        self.selected
            .iter()
            .map(|&i| self.puzzle.items[i].category)
            .collect()
    }
}

impl ChallengeMachine for MatchChallenge {
    fn kind(&self) -> ChallengeKind {
        ChallengeKind::Match
    }

    fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    fn status(&self) -> Status {
        self.status
    }

    fn start(&mut self) {}

    fn submit(&mut self, input: ChallengeInput) -> Verdict {
        if !self.status.is_playing() {
            return Verdict::Pending;
        }
        let ChallengeInput::Item(index) = input else {
            return Verdict::Pending;
        };
        if index >= self.puzzle.items.len()
            || self.matched.contains(&index)
            || self.selected.contains(&index)
        {
            debug!(index, "selection ignored");
            return Verdict::Pending;
        }

        self.countdown.start();
        self.selected.insert(index);

        let categories = self.selected_categories();
        if categories.len() > 1 || self.selected.len() > self.puzzle.items_per_category {
            debug!(selected = self.selected.len(), "mixed selection cleared");
            self.selected.clear();
            return Verdict::Pending;
        }
        if self.selected.len() == self.puzzle.items_per_category {
            self.matched.append(&mut self.selected);
            self.matches += 1;
            debug!(matches = self.matches, "category matched");
            if self.matches == self.puzzle.categories {
                self.countdown.cancel();
                return self.status.record(Verdict::Success);
            }
        }
        Verdict::Pending
    }

    fn advance(&mut self, dt: Duration) -> Verdict {
        if self.status.is_playing() && self.countdown.advance(dt) {
            return self.status.record(Verdict::Failure(FailureReason::TimedOut));
        }
        Verdict::Pending
    }

    fn teardown(&mut self) {
        self.countdown.cancel();
        if self.status.is_playing() {
            self.status = Status::Discarded;
        }
    }

    fn remaining_secs(&self) -> u32 {
        self.countdown.remaining_secs()
    }

    fn snapshot(&self) -> ChallengeSnapshot {
        let items = self
            .puzzle
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| MatchItemView {
                emoji: item.emoji,
                name: item.name,
                selected: self.selected.contains(&i),
                matched: self.matched.contains(&i),
            })
            .collect();
        ChallengeSnapshot {
            kind: ChallengeKind::Match,
            difficulty: self.difficulty,
            difficulty_label: format!(
                "{} ({} categories)",
                self.difficulty.label(),
                self.puzzle.categories
            ),
            status: self.status,
            timer: self.countdown.state(),
            remaining_secs: self.countdown.remaining_secs(),
            view: PuzzleView::Match(MatchView {
                items,
                matches: self.matches,
                categories: self.puzzle.categories,
                items_per_category: self.puzzle.items_per_category,
            }),
        }
    }
}
