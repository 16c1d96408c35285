use crate::base::Sex;
use crate::errors::SimError;
use crate::simulation::animal::{Animal, AnimalId};

/// Append-only store of every animal ever simulated.
///
/// Ids are dense, 1-based, and equal the creation order; id 0 is the
/// unknown-parent sentinel and never resolves. Callers hold ids rather
/// than references, so growth never invalidates anything. Active herd
/// views are recomputed on demand.
#[derive(Debug, Default)]
pub struct Registry {
    animals: Vec<Animal>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            animals: Vec::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.animals.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.animals.is_empty()
    }

    /// The id the next inserted animal will receive.
    #[inline]
    pub fn next_id(&self) -> AnimalId {
        self.animals.len() as AnimalId + 1
    }

    /// Insert an animal, overwriting its id with the next sequential one.
    pub fn add(&mut self, mut animal: Animal) -> AnimalId {
        let id = self.next_id();
        animal.id = id;
        self.animals.push(animal);
        id
    }

    /// Resolve an id that must exist.
    pub fn get(&self, id: AnimalId) -> Result<&Animal, SimError> {
        self.lookup(id).ok_or(SimError::UnknownAnimal(id))
    }

    pub fn get_mut(&mut self, id: AnimalId) -> Result<&mut Animal, SimError> {
        if id == 0 {
            return Err(SimError::UnknownAnimal(0));
        }
        self.animals
            .get_mut(id as usize - 1)
            .ok_or(SimError::UnknownAnimal(id))
    }

    /// Resolve an id that may legitimately be unknown (parent links).
    #[inline]
    pub fn lookup(&self, id: AnimalId) -> Option<&Animal> {
        if id == 0 {
            return None;
        }
        self.animals.get(id as usize - 1)
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Animal> {
        self.animals.iter()
    }

    #[inline]
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Animal> {
        self.animals.iter_mut()
    }

    /// Ids of the active cows of a herd, in registry order.
    pub fn active_cows(&self, herd: &str) -> Vec<AnimalId> {
        self.ids_by(herd, Sex::Cow)
    }

    /// Ids of the active bulls of a herd, in registry order.
    pub fn active_bulls(&self, herd: &str) -> Vec<AnimalId> {
        self.ids_by(herd, Sex::Bull)
    }

    fn ids_by(&self, herd: &str, sex: Sex) -> Vec<AnimalId> {
        self.animals
            .iter()
            .filter(|a| a.active && a.sex == sex && a.herd.as_ref() == herd)
            .map(|a| a.id)
            .collect()
    }
}
