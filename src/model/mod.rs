//! Record types shared by the store, the JSON API, and the HTML pages.

mod country;
mod user;

pub use country::{default_languages, default_timezones, Country, CountryUpdate, NewCountry};
pub use user::{NewUser, User};
