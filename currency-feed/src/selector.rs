//! Item selection.

use crate::date::parse_date;
use crate::decoder::FeedItem;

/// Returns the item with the most recent publication date.
///
/// Items with an unparseable date rank below every dated item. When several
/// items share the maximal date the last of them in feed order is returned.
/// An empty input yields `FeedItem::default()`; callers are expected to treat
/// an empty feed as "no rates" before getting here.
pub fn latest(items: Vec<FeedItem>) -> FeedItem {
    items
        .into_iter()
        .max_by_key(|item| parse_date(&item.pub_date))
        .unwrap_or_default()
}

/// Every item, in feed order.
pub fn all(items: Vec<FeedItem>) -> Vec<FeedItem> {
    items
}
