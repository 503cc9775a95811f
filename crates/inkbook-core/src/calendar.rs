//! Weekly calendar notes.

use crate::storage::{KeyValueStore, StorageResult, calendar_key, load_json, save_json};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One user's notes, keyed by weekday. Every edit is written through.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CalendarEntries {
    entries: BTreeMap<Weekday, String>,
}

impl CalendarEntries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text for a day, empty if never written.
    pub fn entry(&self, day: Weekday) -> &str {
        self.entries.get(&day).map(String::as_str).unwrap_or("")
    }

    /// Days in display order with their text.
    pub fn days(&self) -> impl Iterator<Item = (Weekday, &str)> {
        Weekday::ALL.into_iter().map(|day| (day, self.entry(day)))
    }

    pub async fn load<S: KeyValueStore + ?Sized>(store: &S, user: &str) -> StorageResult<Self> {
        load_json(store, &calendar_key(user)).await
    }

    /// Update one day and persist the whole calendar.
    pub async fn set_entry<S: KeyValueStore + ?Sized>(
        &mut self,
        store: &S,
        user: &str,
        day: Weekday,
        text: impl Into<String>,
    ) -> StorageResult<()> {
        self.entries.insert(day, text.into());
        save_json(store, &calendar_key(user), self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn block_on<F: std::future::Future>(f: F) -> F::Output {
        use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

        fn dummy_raw_waker() -> RawWaker {
            fn no_op(_: *const ()) {}
            fn clone(_: *const ()) -> RawWaker {
                dummy_raw_waker()
            }
            static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, no_op, no_op, no_op);
            RawWaker::new(std::ptr::null(), &VTABLE)
        }

        let waker = unsafe { Waker::from_raw(dummy_raw_waker()) };
        let mut cx = Context::from_waker(&waker);
        let mut f = std::pin::pin!(f);

        loop {
            match f.as_mut().poll(&mut cx) {
                Poll::Ready(result) => return result,
                Poll::Pending => {}
            }
        }
    }

    #[test]
    fn test_every_edit_is_persisted() {
        let store = MemoryStore::new();
        let mut calendar = CalendarEntries::new();

        block_on(calendar.set_entry(&store, "ana", Weekday::Friday, "quiz")).unwrap();

        assert_eq!(
            block_on(store.load("calendarEntries_ana")).unwrap().as_deref(),
            Some(r#"{"Friday":"quiz"}"#)
        );
        let loaded = block_on(CalendarEntries::load(&store, "ana")).unwrap();
        assert_eq!(loaded.entry(Weekday::Friday), "quiz");
        assert_eq!(loaded.entry(Weekday::Monday), "");
    }

    #[test]
    fn test_days_in_week_order() {
        let calendar = CalendarEntries::new();
        let names: Vec<&str> = calendar.days().map(|(day, _)| day.name()).collect();
        assert_eq!(names.first(), Some(&"Monday"));
        assert_eq!(names.last(), Some(&"Sunday"));
        assert_eq!(names.len(), 7);
    }

    #[test]
    fn test_calendars_are_per_user() {
        let store = MemoryStore::new();
        let mut calendar = CalendarEntries::new();
        block_on(calendar.set_entry(&store, "ana", Weekday::Monday, "gym")).unwrap();

        let other = block_on(CalendarEntries::load(&store, "ben")).unwrap();
        assert_eq!(other.entry(Weekday::Monday), "");
    }
}
