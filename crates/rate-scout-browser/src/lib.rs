//! Chrome-backed implementation of the rate-scout browser capabilities.

mod chrome_finder;
mod error;
mod launcher;
mod page;
mod profile;
mod session;

pub use chrome_finder::ChromeFinder;
pub use error::{Error, Result};
pub use launcher::{ChromeLauncher, ChromeOptions};
pub use page::{ChromeElement, ChromePage};
pub use profile::TempProfile;
pub use session::{ChromeDriver, ChromeSession};
