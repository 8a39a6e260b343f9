// HTTP routes and handlers

pub mod auth;
pub mod changes;
pub mod classes;
pub mod coaches;
pub mod events;
pub mod health;
pub mod programs;
pub mod routes;
pub mod settings;
pub mod sponsors;
pub mod sponsorship;
pub mod workouts;

use chrono::NaiveDate;

/// Calendar date used for status and schedule computations
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
