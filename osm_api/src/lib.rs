//! Clients for the two remote protocols: bounding-box feature queries against
//! the spatial database, and XML-over-HTTP changeset edits with optimistic
//! versioning. Both return errors as values; nothing here retries on its own.

#[macro_use]
extern crate log;

mod changeset;
mod error;
mod overpass;
mod session;
mod xml;

pub use crate::changeset::{Credentials, EditSession, CREATED_BY};
pub use crate::error::ApiError;
pub use crate::overpass::{entrance_site_filter, QueryClient, QueryIntent};
pub use crate::session::SessionStore;
