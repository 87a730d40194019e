//! Plain-text rows for the console: the offer table and the award feed.

use std::fmt::Display;

use chrono::TimeZone;

use crate::domain::{FeedEntry, Offer};

/// Header line matching [`offer_row`].
pub const OFFER_HEADER: &str = "  ID  NAME                          MIN STAKE  BONUS  ACTIVE";

/// Header line matching [`award_row`].
pub const AWARD_HEADER: &str = "TIME      USER          OFFER      STAKE      BONUS";

/// One offer as a table row: stake in pounds, bonus as a whole percentage.
#[must_use]
pub fn offer_row(offer: &Offer) -> String {
    format!(
        "{:>4}  {:<28}  £{:>8.2}  {:>4.0}%  {}",
        offer.id,
        truncate(&offer.name, 28),
        offer.min_stake,
        offer.bonus_pct * 100.0,
        if offer.active { "Yes" } else { "No" },
    )
}

/// The whole offer list with a header, in the order given.
#[must_use]
pub fn offer_table(offers: &[Offer]) -> String {
    let mut table = String::from(OFFER_HEADER);
    for offer in offers {
        table.push('\n');
        table.push_str(&offer_row(offer));
    }
    table
}

/// One feed entry as a table row, with its display time in `tz`.
#[must_use]
pub fn award_row<Tz>(entry: &FeedEntry, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let award = &entry.award;
    format!(
        "{}  {:<12}  {:>5}  £{:>8.2}  £{:>8.2}",
        entry.display_time().with_timezone(tz).format("%H:%M:%S"),
        truncate(&award.user_id, 12),
        award.offer_id,
        award.stake,
        award.bonus_amount,
    )
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
