//! Day bucketing for the journal view.
//!
//! Day numbers count calendar days from a fixed epoch, starting at 1 on the
//! epoch itself. Anything earlier than the epoch lands in day 1.

use std::collections::BTreeMap;

use serde::Serialize;
use time::macros::date;
use time::{Date, Duration, OffsetDateTime, PrimitiveDateTime, Time};

use crate::domain::post::Post;
use crate::domain::timestamp;

pub const DEFAULT_EPOCH: Date = date!(2025 - 06 - 01);

#[derive(Debug, Clone, Serialize)]
pub struct DayBucket {
    pub day_number: i64,
    pub date: String,
    pub posts: Vec<Post>,
}

pub fn day_number(epoch: Date, at: OffsetDateTime) -> i64 {
    let start = PrimitiveDateTime::new(epoch, Time::MIDNIGHT).assume_utc();
    let hours = (at - start).whole_hours();
    (hours.div_euclid(24) + 1).max(1)
}

pub fn day_date(epoch: Date, day_number: i64) -> Option<Date> {
    epoch.checked_add(Duration::days(day_number - 1))
}

/// Groups journal posts into day buckets, most recent day first.
///
/// Posts keep their input order within a bucket. Days without posts are not
/// emitted. A post whose timestamp cannot be parsed is logged and left out.
pub fn bucket_by_day(epoch: Date, posts: Vec<Post>) -> Vec<DayBucket> {
    let mut days: BTreeMap<i64, Vec<Post>> = BTreeMap::new();

    for post in posts {
        let Some(at) = timestamp::parse(&post.created_at) else {
            tracing::warn!(post_id = %post.id, created_at = %post.created_at, "dropping journal post with unparseable timestamp");
            continue;
        };
        days.entry(day_number(epoch, at)).or_default().push(post);
    }

    days.into_iter()
        .rev()
        .map(|(day_number, posts)| DayBucket {
            day_number,
            date: day_date(epoch, day_number)
                .map(timestamp::day_label)
                .unwrap_or_default(),
            posts,
        })
        .collect()
}
