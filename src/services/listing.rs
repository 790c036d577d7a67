//! Search, ordering and grouping of a user's object listing.
//!
//! Everything here is a pure transformation over an in-memory list.

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, TimeZone, Utc};
use std::collections::HashMap;

use crate::models::{SortKey, StoredObject, TypeUsage};

pub fn filter_by_name(objects: Vec<StoredObject>, query: &str) -> Vec<StoredObject> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return objects;
    }

    objects
        .into_iter()
        .filter(|o| o.name.to_lowercase().contains(&needle))
        .collect()
}

pub fn sort_objects(objects: &mut [StoredObject], key: SortKey) {
    match key {
        SortKey::Name => objects.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.name.cmp(&b.name))
        }),
        SortKey::Size => objects.sort_by(|a, b| b.size.cmp(&a.size)),
        SortKey::Date => objects.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at)),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayGroup {
    Today,
    Yesterday,
    Older,
}

/// Buckets a timestamp by calendar day as seen from `now`'s offset.
pub fn day_group<Tz: TimeZone>(uploaded_at: DateTime<Utc>, now: &DateTime<Tz>) -> DayGroup {
    let today: NaiveDate = now.date_naive();
    let local = uploaded_at.with_timezone(&now.timezone()).date_naive();

    if local >= today {
        DayGroup::Today
    } else if Some(local) == today.pred_opt() {
        DayGroup::Yesterday
    } else {
        DayGroup::Older
    }
}

#[derive(Debug, Default)]
pub struct DayGroups {
    pub today: Vec<StoredObject>,
    pub yesterday: Vec<StoredObject>,
    pub older: Vec<StoredObject>,
}

/// Partitions objects, preserving their relative order within each group.
pub fn group_by_day<Tz: TimeZone>(objects: Vec<StoredObject>, now: &DateTime<Tz>) -> DayGroups {
    let mut groups = DayGroups::default();
    for object in objects {
        match day_group(object.uploaded_at, now) {
            DayGroup::Today => groups.today.push(object),
            DayGroup::Yesterday => groups.yesterday.push(object),
            DayGroup::Older => groups.older.push(object),
        }
    }
    groups
}

/// Resolves a caller-supplied UTC offset, ignoring values outside +/-14h.
pub fn caller_now(tz_offset_minutes: Option<i32>) -> DateTime<FixedOffset> {
    let offset = tz_offset_minutes
        .filter(|m| m.abs() <= 14 * 60)
        .and_then(|m| FixedOffset::east_opt(m * 60))
        .unwrap_or_else(|| Utc.fix());
    Utc::now().with_timezone(&offset)
}

/// Bytes and object counts per top-level MIME type, largest first.
pub fn usage_breakdown(objects: &[StoredObject]) -> Vec<TypeUsage> {
    let mut by_kind: HashMap<String, TypeUsage> = HashMap::new();
    for object in objects {
        let kind = object
            .mime_type
            .split('/')
            .next()
            .filter(|k| !k.is_empty())
            .unwrap_or("other")
            .to_string();
        let entry = by_kind.entry(kind.clone()).or_insert_with(|| TypeUsage {
            kind,
            count: 0,
            bytes: 0,
        });
        entry.count += 1;
        entry.bytes += object.size;
    }

    let mut usage: Vec<TypeUsage> = by_kind.into_values().collect();
    usage.sort_by(|a, b| b.bytes.cmp(&a.bytes).then_with(|| a.kind.cmp(&b.kind)));
    usage
}

pub fn usage_percent(used: i64, limit: i64) -> f64 {
    if limit <= 0 {
        return 0.0;
    }
    used as f64 / limit as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use uuid::Uuid;

    fn days(n: i64) -> Duration {
        Duration::days(n)
    }

    fn object(name: &str, size: i64, mime: &str, uploaded_at: DateTime<Utc>) -> StoredObject {
        StoredObject {
            id: Uuid::new_v4(),
            name: name.to_string(),
            size,
            mime_type: mime.to_string(),
            category: "other".to_string(),
            uploaded_at,
            url: format!("http://localhost/{}", name),
            path: format!("u1/{}", name),
        }
    }

    fn sample() -> Vec<StoredObject> {
        let now = Utc::now();
        vec![
            object("b.png", 10, "image/png", now - days(2)),
            object("A.txt", 30, "text/plain", now - days(1)),
            object("c.pdf", 20, "application/pdf", now),
        ]
    }

    fn names(objects: &[StoredObject]) -> Vec<&str> {
        objects.iter().map(|o| o.name.as_str()).collect()
    }

    #[test]
    fn test_filter_then_sort_by_name() {
        let mut filtered = filter_by_name(sample(), "a");
        sort_objects(&mut filtered, SortKey::Name);
        assert_eq!(names(&filtered), vec!["A.txt"]);
    }

    #[test]
    fn test_filter_is_case_insensitive() {
        let filtered = filter_by_name(sample(), "PDF");
        assert_eq!(names(&filtered), vec!["c.pdf"]);
        assert_eq!(filter_by_name(sample(), "").len(), 3);
    }

    #[test]
    fn test_sort_by_size_descending() {
        let mut objects = sample();
        sort_objects(&mut objects, SortKey::Size);
        assert_eq!(names(&objects), vec!["A.txt", "c.pdf", "b.png"]);
        assert_eq!(
            objects.iter().map(|o| o.size).collect::<Vec<_>>(),
            vec![30, 20, 10]
        );
    }

    #[test]
    fn test_sort_by_name_ignores_case() {
        let mut objects = sample();
        sort_objects(&mut objects, SortKey::Name);
        assert_eq!(names(&objects), vec!["A.txt", "b.png", "c.pdf"]);
    }

    #[test]
    fn test_sort_by_date_newest_first() {
        let mut objects = sample();
        sort_objects(&mut objects, SortKey::Date);
        assert_eq!(names(&objects), vec!["c.pdf", "A.txt", "b.png"]);
    }

    #[test]
    fn test_day_group_at_rollover() {
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        // Local midnight, 2024-05-10 00:00 +02:00.
        let now = offset.with_ymd_and_hms(2024, 5, 10, 0, 0, 0).unwrap();
        let now_utc = now.with_timezone(&Utc);

        assert_eq!(day_group(now_utc, &now), DayGroup::Today);
        assert_eq!(
            day_group(now_utc - Duration::seconds(1), &now),
            DayGroup::Yesterday
        );
        assert_eq!(
            day_group(now_utc - Duration::hours(24), &now),
            DayGroup::Yesterday
        );
        assert_eq!(
            day_group(now_utc - Duration::hours(24) - Duration::seconds(1), &now),
            DayGroup::Older
        );
    }

    #[test]
    fn test_day_group_uses_caller_offset() {
        // 23:30 UTC on the 9th is already the 10th in UTC+2.
        let uploaded = Utc.with_ymd_and_hms(2024, 5, 9, 23, 30, 0).unwrap();
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let now_plus_two = plus_two.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap();
        assert_eq!(day_group(uploaded, &now_plus_two), DayGroup::Today);

        let now_utc = Utc.with_ymd_and_hms(2024, 5, 10, 10, 0, 0).unwrap();
        assert_eq!(day_group(uploaded, &now_utc), DayGroup::Yesterday);
    }

    #[test]
    fn test_group_by_day_preserves_order() {
        let now = Utc::now();
        let objects = vec![
            object("new", 1, "text/plain", now),
            object("newer", 1, "text/plain", now),
            object("ancient", 1, "text/plain", now - days(30)),
        ];
        let groups = group_by_day(objects, &now);
        assert_eq!(names(&groups.today), vec!["new", "newer"]);
        assert!(groups.yesterday.is_empty());
        assert_eq!(names(&groups.older), vec!["ancient"]);
    }

    #[test]
    fn test_caller_now_rejects_absurd_offsets() {
        assert_eq!(caller_now(Some(24 * 60)).offset().local_minus_utc(), 0);
        assert_eq!(caller_now(Some(-300)).offset().local_minus_utc(), -300 * 60);
        assert_eq!(caller_now(None).offset().local_minus_utc(), 0);
    }

    #[test]
    fn test_usage_breakdown() {
        let now = Utc::now();
        let objects = vec![
            object("a.png", 100, "image/png", now),
            object("b.jpg", 50, "image/jpeg", now),
            object("c.pdf", 120, "application/pdf", now),
        ];
        let usage = usage_breakdown(&objects);
        assert_eq!(usage.len(), 2);
        assert_eq!(usage[0].kind, "image");
        assert_eq!(usage[0].count, 2);
        assert_eq!(usage[0].bytes, 150);
        assert_eq!(usage[1].kind, "application");
    }

    #[test]
    fn test_usage_percent() {
        assert_eq!(usage_percent(50, 200), 25.0);
        assert_eq!(usage_percent(50, 0), 0.0);
    }
}
