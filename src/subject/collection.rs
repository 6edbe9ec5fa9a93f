//! Global subject collection: stable iteration order, O(1) lookup by id

use ahash::AHashMap;

use crate::core::error::{Result, SkirmishError};
use crate::core::types::SubjectId;
use crate::subject::actor::Subject;

#[derive(Debug, Clone, Default)]
pub struct Subjects {
    subjects: Vec<Subject>,
    index: AHashMap<SubjectId, usize>,
}

impl Subjects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a subject at the end of the iteration order
    pub fn push(&mut self, subject: Subject) -> Result<SubjectId> {
        let id = subject.id;
        if self.index.contains_key(&id) {
            return Err(SkirmishError::DuplicateSubject(id));
        }
        self.index.insert(id, self.subjects.len());
        self.subjects.push(subject);
        Ok(id)
    }

    /// Append all subjects, or none of them if any id collides
    pub fn extend(&mut self, subjects: Vec<Subject>) -> Result<()> {
        let mut incoming = ahash::AHashSet::with_capacity(subjects.len());
        for subject in &subjects {
            if self.index.contains_key(&subject.id) || !incoming.insert(subject.id) {
                return Err(SkirmishError::DuplicateSubject(subject.id));
            }
        }
        for subject in subjects {
            self.push(subject)?;
        }
        Ok(())
    }

    pub fn get(&self, id: SubjectId) -> Option<&Subject> {
        self.index.get(&id).map(|&i| &self.subjects[i])
    }

    pub fn get_mut(&mut self, id: SubjectId) -> Option<&mut Subject> {
        match self.index.get(&id) {
            Some(&i) => Some(&mut self.subjects[i]),
            None => None,
        }
    }

    /// Lookup that treats a miss as a fault
    pub fn require(&self, id: SubjectId) -> Result<&Subject> {
        self.get(id).ok_or(SkirmishError::SubjectNotFound(id))
    }

    pub fn require_mut(&mut self, id: SubjectId) -> Result<&mut Subject> {
        self.get_mut(id).ok_or(SkirmishError::SubjectNotFound(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Subject> {
        self.subjects.iter()
    }

    pub fn iter_alive(&self) -> impl Iterator<Item = &Subject> {
        self.subjects.iter().filter(|s| s.is_alive())
    }

    /// Ids of living subjects, in iteration order
    pub fn alive_ids(&self) -> Vec<SubjectId> {
        self.iter_alive().map(|s| s.id).collect()
    }

    pub fn is_alive(&self, id: SubjectId) -> bool {
        self.get(id).map(Subject::is_alive).unwrap_or(false)
    }

    /// Kill a subject. Returns false when it was already dead.
    pub fn apply_death(&mut self, id: SubjectId) -> Result<bool> {
        Ok(self.require_mut(id)?.die())
    }

    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }

    pub fn alive_count(&self) -> usize {
        self.iter_alive().count()
    }
}
