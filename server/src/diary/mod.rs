//! The diary domain core: date window resolution, calendar merging and the showing/rota
//! lifecycle. All functions in here work on a [crate::data_store::DiaryStoreFacade] and a
//! [clock::Clock], so they can be tested against the store mock with a fixed point in time.

pub mod calendar;
pub mod clock;
pub mod copy_text;
pub mod date_range;
pub mod edit_prefs;
pub mod reconcile;
pub mod showings;
