//! [`ResourceListStore`] definitions.

use std::sync::Arc;

use derive_more::{Display, Error, From};
use tracing as log;

#[cfg(doc)]
use crate::domain::record::Id;
use crate::{
    domain::{record, Record, Resource},
    validation::{FieldErrors, Form},
};

/// In-memory, insertion-ordered collection of `T` [`Record`]s.
///
/// Every mutation replaces the collection with a new snapshot, so snapshots
/// handed out earlier never change and may be compared by pointer.
#[derive(Debug)]
pub struct ResourceListStore<T> {
    /// Current snapshot of the collection.
    records: Arc<[Record<T>]>,

    /// Highest [`Id`] ever issued by this store.
    last_id: Option<record::Id>,
}

impl<T> Default for ResourceListStore<T> {
    fn default() -> Self {
        Self {
            records: Arc::from([]),
            last_id: None,
        }
    }
}

impl<T: Resource> ResourceListStore<T> {
    /// Creates a new empty [`ResourceListStore`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new [`ResourceListStore`] seeded with the provided
    /// [`Record`]s, in the given order.
    #[must_use]
    pub fn from_records(records: impl IntoIterator<Item = Record<T>>) -> Self {
        let records: Arc<[Record<T>]> = records.into_iter().collect();
        let last_id = records.iter().map(|r| r.id).max();
        Self { records, last_id }
    }

    /// Returns the current snapshot of the collection.
    #[must_use]
    pub fn snapshot(&self) -> Arc<[Record<T>]> {
        Arc::clone(&self.records)
    }

    /// Iterates over the [`Record`]s in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Record<T>> {
        self.records.iter()
    }

    /// Returns the number of [`Record`]s.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Indicates whether there are no [`Record`]s.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the [`Record`] with the provided [`Id`], if any.
    #[must_use]
    pub fn get(&self, id: record::Id) -> Option<&Record<T>> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Returns the [`Id`] the next created [`Record`] will get, if any is
    /// left.
    ///
    /// It's one above both the current maximum and any [`Id`] issued before,
    /// so IDs of deleted [`Record`]s are never reused.
    #[must_use]
    pub fn next_id(&self) -> Option<record::Id> {
        self.records
            .iter()
            .map(|r| r.id)
            .chain(self.last_id)
            .max()
            .map_or(Some(record::Id::from(1)), record::Id::next)
    }

    /// Appends a new [`Record`] with the provided `fields`.
    ///
    /// The `fields` are expected to be validated already, see
    /// [`ResourceListStore::submit()`].
    ///
    /// # Errors
    ///
    /// If every [`Id`] has been issued already, leaving the collection
    /// intact.
    pub fn create(&mut self, fields: T) -> Result<Record<T>, Exhausted> {
        let Some(id) = self.next_id() else {
            log::warn!("`{}` IDs are exhausted", T::NAME);
            return Err(Exhausted);
        };
        let record = Record { id, fields };
        self.records = self
            .records
            .iter()
            .cloned()
            .chain([record.clone()])
            .collect();
        self.last_id = Some(record.id);

        log::debug!("created `{}(id: {})`", T::NAME, record.id);
        Ok(record)
    }

    /// Validates the provided [`Form`] and creates a new [`Record`] out of it.
    ///
    /// # Errors
    ///
    /// With every invalid field, or if every [`Id`] has been issued already,
    /// leaving the collection intact.
    pub fn submit(&mut self, form: &Form) -> Result<Record<T>, SubmitError> {
        let fields = T::from_form(form)?;
        Ok(self.create(fields)?)
    }

    /// Replaces the fields of the [`Record`] with the provided [`Id`],
    /// keeping its position.
    ///
    /// # Errors
    ///
    /// If there is no such [`Record`], leaving the collection intact.
    pub fn update(
        &mut self,
        id: record::Id,
        fields: T,
    ) -> Result<Record<T>, NotFound> {
        if self.get(id).is_none() {
            log::debug!("`{}(id: {id})` to update is missing", T::NAME);
            return Err(NotFound(id));
        }

        let updated = Record { id, fields };
        self.records = self
            .records
            .iter()
            .map(|r| if r.id == id { updated.clone() } else { r.clone() })
            .collect();

        log::debug!("updated `{}(id: {id})`", T::NAME);
        Ok(updated)
    }

    /// Validates the provided [`Form`] and replaces the fields of the
    /// [`Record`] with the provided [`Id`].
    ///
    /// # Errors
    ///
    /// If the [`Form`] is invalid or there is no such [`Record`].
    pub fn submit_update(
        &mut self,
        id: record::Id,
        form: &Form,
    ) -> Result<Record<T>, SubmitError> {
        let fields = T::from_form(form)?;
        Ok(self.update(id, fields)?)
    }

    /// Removes the [`Record`] with the provided [`Id`].
    ///
    /// Returns whether a [`Record`] was actually removed.
    pub fn delete(&mut self, id: record::Id) -> bool {
        if self.get(id).is_none() {
            return false;
        }

        self.records = self
            .records
            .iter()
            .filter(|r| r.id != id)
            .cloned()
            .collect();

        log::debug!("deleted `{}(id: {id})`", T::NAME);
        true
    }

    /// Replaces the whole collection with the provided [`Record`]s.
    ///
    /// Issued IDs are still never reused.
    pub fn replace_all(&mut self, records: impl IntoIterator<Item = Record<T>>) {
        let last_id = self.last_id;
        *self = Self::from_records(records);
        self.last_id = self.last_id.max(last_id);
    }

    /// Lazily filters the [`Record`]s whose searched fields contain the
    /// provided `term`, ignoring case.
    ///
    /// A blank `term` matches every [`Record`]. Insertion order is preserved.
    pub fn search<'s>(
        &'s self,
        term: &str,
    ) -> impl Iterator<Item = &'s Record<T>> + 's {
        let needle = term.trim().to_lowercase();
        self.records
            .iter()
            .filter(move |r| matches(&r.fields, &needle))
    }

    /// Same as [`ResourceListStore::search()`], additionally narrowing the
    /// [`Record`]s to the ones having the provided `status`, if any.
    pub fn search_with<'s>(
        &'s self,
        term: &str,
        status: Option<T::Status>,
    ) -> impl Iterator<Item = &'s Record<T>> + 's {
        self.search(term)
            .filter(move |r| status.map_or(true, |s| r.fields.status() == s))
    }
}

/// Checks whether any searched field of the `resource` contains the
/// lower-cased `needle`.
fn matches<T: Resource>(resource: &T, needle: &str) -> bool {
    needle.is_empty()
        || resource
            .search_fields()
            .any(|field| field.to_lowercase().contains(needle))
}

/// [`Record`] with the provided [`Id`] doesn't exist.
#[derive(Clone, Copy, Debug, Display, Error, Eq, PartialEq)]
#[display("`Record(id: {_0})` does not exist")]
pub struct NotFound(#[error(not(source))] pub record::Id);

/// Every [`Id`] has been issued already, so no new [`Record`] can be
/// created.
#[derive(Clone, Copy, Debug, Display, Error, Eq, PartialEq)]
#[display("no `Record` IDs are left")]
pub struct Exhausted;

/// Error of submitting a [`Form`].
#[derive(Clone, Debug, Display, Error, From)]
pub enum SubmitError {
    /// [`Form`] is invalid.
    #[display("Invalid form: {_0}")]
    Invalid(FieldErrors),

    /// [`Record`] doesn't exist.
    #[display("{_0}")]
    NotFound(NotFound),

    /// No [`Id`] is left for a new [`Record`].
    #[display("{_0}")]
    Exhausted(Exhausted),
}
