use time::Date;

use crate::app::error::BoardError;
use crate::app::posts::PostService;
use crate::domain::journal::{bucket_by_day, DayBucket};
use crate::infra::db::Db;

#[derive(Clone)]
pub struct JournalService {
    posts: PostService,
    epoch: Date,
}

impl JournalService {
    pub fn new(db: Db, epoch: Date) -> Self {
        Self {
            posts: PostService::new(db),
            epoch,
        }
    }

    pub async fn days(&self) -> Result<Vec<DayBucket>, BoardError> {
        let posts = self.posts.timeline(false).await?;
        Ok(bucket_by_day(self.epoch, posts))
    }
}
