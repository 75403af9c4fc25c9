pub mod app;
pub mod config;
pub mod domain;
pub mod http;
pub mod infra;

use time::Date;

use crate::infra::{db::Db, storage::FileStorage};

#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub storage: FileStorage,
    pub upload_max_bytes: usize,
    pub journal_epoch: Date,
}
