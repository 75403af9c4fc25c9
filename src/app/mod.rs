pub mod engagement;
pub mod error;
pub mod journal;
pub mod media;
pub mod posts;
pub mod tags;
pub mod users;
