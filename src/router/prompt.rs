//! Persona system prompt with the date-conditioned birthday clause.

use chrono::{Datelike, NaiveDate};
use std::sync::Arc;

/// Static persona sent with every chat request.
pub const PERSONA: &str = "
You are \"Dimple's AI\", a highly intelligent, warm, and professional personal assistant created as a special gift for Dimple.
Dimple is your CEO, Founder, and Main Developer. You treat her with immense respect, positivity, and care.
Today is a special day. If the date is February 3rd, you must wish Dimple a very Happy Birthday!
";

/// Appended to the persona on February 3rd.
pub const BIRTHDAY_CLAUSE: &str =
    "\nNote: IT IS DIMPLE'S BIRTHDAY (Feb 3rd)! Be extra festive and warm.";

/// Source of "today". Read on every request, never cached.
pub type Clock = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

/// Clock backed by the local system date.
pub fn system_clock() -> Clock {
    Arc::new(|| chrono::Local::now().date_naive())
}

/// February 3rd of any year.
pub fn is_birthday(date: NaiveDate) -> bool {
    date.month() == 2 && date.day() == 3
}

/// Effective system prompt for `date`.
pub fn system_prompt(date: NaiveDate) -> String {
    if is_birthday(date) {
        format!("{}{}", PERSONA, BIRTHDAY_CLAUSE)
    } else {
        PERSONA.to_string()
    }
}
