pub mod engagement;
pub mod journal;
pub mod post;
pub mod tag;
pub mod timestamp;
pub mod user;
