//! Collection browser core: paged company list, multi-select, optimistic
//! transfers, background-job polling, and collection count bookkeeping.
//!
//! The pieces are wired Elm-style: [`State`] holds all data, [`Msg`] carries
//! every event, [`update`](app::update) is the single mutation point, and
//! effects come back as messages via [`crate::command::Command`].

pub mod app;
pub mod commands;
pub mod job;
pub mod list;
pub mod msg;
pub mod notifications;
pub mod registry;
pub mod selection;
pub mod state;

pub use app::update;
pub use job::{JobTracker, JobTransition};
pub use list::PagedListStore;
pub use msg::Msg;
pub use notifications::{Notification, NotificationLevel, NotificationLog};
pub use registry::CollectionRegistry;
pub use selection::SelectionTracker;
pub use state::{State, TransferContext};
