//! Grouping of quest cards into dashboard sections.
//!
//! The dashboard shows four buckets: incomplete challenges, tasks due today
//! or overdue, tasks due later, and everything completed. The grouping is
//! pure so UI layers can re-run it on any card list without touching the
//! network.

use chrono::NaiveDate;

use crate::models::Card;

/// Cards partitioned into the dashboard's display sections.
///
/// Within each bucket, cards keep their backend order.
#[derive(Debug, Clone, Default)]
pub struct DashboardGroups {
    /// Incomplete challenges, shown in their own section.
    pub challenges: Vec<Card>,
    /// Incomplete tasks due on or before `today` (overdue included).
    pub today: Vec<Card>,
    /// Incomplete tasks due after `today`.
    pub tomorrow: Vec<Card>,
    /// Completed cards, tasks and challenges alike.
    pub done: Vec<Card>,
}

/// Partition cards relative to the given date.
///
/// A card with an unparseable due date lands in the today bucket so it is
/// never silently hidden.
pub fn group_cards(cards: &[Card], today: NaiveDate) -> DashboardGroups {
    let mut groups = DashboardGroups::default();

    for card in cards {
        if card.is_complete() {
            groups.done.push(card.clone());
        } else if card.is_challenge() {
            groups.challenges.push(card.clone());
        } else {
            match card.due_date() {
                Some(due) if due > today => groups.tomorrow.push(card.clone()),
                _ => groups.today.push(card.clone()),
            }
        }
    }

    groups
}

/// Today's date in the local timezone, for feeding `group_cards`.
pub fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
