//! Animal label taxonomy
//!
//! Output index `i` of the model corresponds to `Animal::ALL[i]`. Each animal
//! belongs to exactly one of two categories, safe or unsafe.

use thiserror::Error;

/// Animals the classifier can recognize, in model output order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Animal {
    Bear,
    Cat,
    Cow,
    Dog,
    Donkey,
    Elephant,
    Horse,
    Lion,
    Monkey,
    Sheep,
}

impl Animal {
    pub const ALL: [Animal; 10] = [
        Animal::Bear,
        Animal::Cat,
        Animal::Cow,
        Animal::Dog,
        Animal::Donkey,
        Animal::Elephant,
        Animal::Horse,
        Animal::Lion,
        Animal::Monkey,
        Animal::Sheep,
    ];

    /// Lowercase name, also used for illustration file names
    pub fn name(&self) -> &'static str {
        match self {
            Animal::Bear => "bear",
            Animal::Cat => "cat",
            Animal::Cow => "cow",
            Animal::Dog => "dog",
            Animal::Donkey => "donkey",
            Animal::Elephant => "elephant",
            Animal::Horse => "horse",
            Animal::Lion => "lion",
            Animal::Monkey => "monkey",
            Animal::Sheep => "sheep",
        }
    }

    /// Capitalized name for display ("Dog")
    pub fn display_name(&self) -> String {
        let name = self.name();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    pub fn from_index(index: usize) -> Option<Animal> {
        Self::ALL.get(index).copied()
    }

    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl std::fmt::Display for Animal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

pub const SAFE_ANIMALS: [Animal; 6] = [
    Animal::Cat,
    Animal::Cow,
    Animal::Dog,
    Animal::Donkey,
    Animal::Horse,
    Animal::Sheep,
];

pub const UNSAFE_ANIMALS: [Animal; 4] = [
    Animal::Bear,
    Animal::Elephant,
    Animal::Lion,
    Animal::Monkey,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Safety {
    Safe,
    Unsafe,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum LabelError {
    #[error("{0} is listed as both safe and unsafe")]
    Overlap(Animal),

    #[error("{0} is listed as neither safe nor unsafe")]
    Unclassified(Animal),
}

/// Index → animal mapping with safety lookup
#[derive(Debug, Clone)]
pub struct LabelTable {
    animals: Vec<(Animal, Safety)>,
}

impl LabelTable {
    /// Build the table, checking that the safe and unsafe sets partition
    /// every animal.
    pub fn new() -> Result<Self, LabelError> {
        let mut animals = Vec::with_capacity(Animal::ALL.len());
        for animal in Animal::ALL {
            let safe = SAFE_ANIMALS.contains(&animal);
            let unsafe_ = UNSAFE_ANIMALS.contains(&animal);
            let safety = match (safe, unsafe_) {
                (true, false) => Safety::Safe,
                (false, true) => Safety::Unsafe,
                (true, true) => return Err(LabelError::Overlap(animal)),
                (false, false) => return Err(LabelError::Unclassified(animal)),
            };
            animals.push((animal, safety));
        }
        Ok(Self { animals })
    }

    /// Number of classes the model must output
    pub fn len(&self) -> usize {
        self.animals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.animals.is_empty()
    }

    pub fn resolve(&self, index: usize) -> Option<Animal> {
        self.animals.get(index).map(|(animal, _)| *animal)
    }

    pub fn safety(&self, animal: Animal) -> Safety {
        self.animals
            .iter()
            .find(|(a, _)| *a == animal)
            .map(|(_, s)| *s)
            .unwrap_or(Safety::Unsafe)
    }

    pub fn is_safe(&self, animal: Animal) -> bool {
        self.safety(animal) == Safety::Safe
    }
}
