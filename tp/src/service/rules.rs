//! Rule-based entity extraction
//!
//! Pure functions over the raw message text. Everything here is
//! deterministic and cheap; the AI extractor in `ai` supplements these
//! results, it never replaces them wholesale.

use chrono::{Datelike, Duration, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;

use crate::context::{Budget, Travelers};

/// Month name alternation shared by the date patterns
const MONTH_PAT: &str = "jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|jun(?:e)?|jul(?:y)?|aug(?:ust)?|sep(?:tember)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?";

static MONTHS: &[(&str, u32)] = &[
    ("january", 1),
    ("february", 2),
    ("march", 3),
    ("april", 4),
    ("may", 5),
    ("june", 6),
    ("july", 7),
    ("august", 8),
    ("september", 9),
    ("october", 10),
    ("november", 11),
    ("december", 12),
];

fn month_number(name: &str) -> Option<u32> {
    let lower = name.trim().to_lowercase();
    if lower.len() < 3 || !lower.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    MONTHS.iter().find(|(m, _)| m.starts_with(&lower)).map(|(_, n)| *n)
}

// -- place phrases -----------------------------------------------------------

static IATA_PAIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-Z]{3})\s+to\s+([A-Z]{3})\b").expect("valid regex"));

static FROM_TO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bfrom\s+([A-Z][a-zA-Z'-]+(?:\s+[A-Z][a-zA-Z'-]+)*)\s+to\s+([A-Z][a-zA-Z'-]+(?:\s+[A-Z][a-zA-Z'-]+)*)")
        .expect("valid regex")
});

static TO_PLACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:going to|travel(?:ing|ling)? to|fly(?:ing)? to|trip to|visit(?:ing)?|headed to|off to|to)\s+([A-Z][a-zA-Z'-]+(?:\s+[A-Z][a-zA-Z'-]+)*)",
    )
    .expect("valid regex")
});

static IN_PLACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bin\s+([A-Z][a-zA-Z'-]+(?:\s+[A-Z][a-zA-Z'-]+)*)").expect("valid regex")
});

static BARE_PLACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Z][a-z][a-zA-Z'-]*(?:\s+[A-Z][a-z][a-zA-Z'-]*)*)\b").expect("valid regex")
});

/// Capitalized words that are never place mentions
const PLACE_STOPWORDS: &[&str] = &[
    "i", "we", "my", "our", "the", "a", "an", "please", "hi", "hello", "thanks", "ok", "okay",
    "january", "february", "march", "april", "may", "june", "july", "august", "september",
    "october", "november", "december", "monday", "tuesday", "wednesday", "thursday", "friday",
    "saturday", "sunday",
];

/// Drop trailing temporal tokens from a captured place phrase
///
/// "Paris next week" captures as one phrase because "Paris" and "next"
/// are not separable by the capitalization pattern alone.
fn trim_place(raw: &str) -> String {
    let mut words: Vec<&str> = raw.split_whitespace().collect();
    while let Some(last) = words.last() {
        let lower = last.to_lowercase();
        let temporal = matches!(lower.as_str(), "next" | "this" | "last" | "tomorrow" | "today" | "soon" | "in" | "on" | "for")
            || month_number(&lower).is_some();
        if temporal {
            words.pop();
        } else {
            break;
        }
    }
    words.join(" ")
}

fn is_place_candidate(phrase: &str) -> bool {
    !phrase.is_empty() && !PLACE_STOPWORDS.contains(&phrase.to_lowercase().as_str())
}

/// Place mentions split by trip role
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceMentions {
    pub departures: Vec<String>,
    pub destinations: Vec<String>,
}

impl PlaceMentions {
    fn push_departure(&mut self, phrase: String) {
        if is_place_candidate(&phrase) && !self.departures.contains(&phrase) {
            self.departures.push(phrase);
        }
    }

    fn push_destination(&mut self, phrase: String) {
        if is_place_candidate(&phrase)
            && !self.destinations.contains(&phrase)
            && !self.departures.contains(&phrase)
        {
            self.destinations.push(phrase);
        }
    }
}

/// Pull place phrases out of a message
///
/// Patterns run in decreasing precision: explicit IATA pairs, from/to
/// phrasing, directional verbs, "in X", then a bare capitalized fallback
/// that only fires when nothing stronger matched.
pub fn extract_places(text: &str) -> PlaceMentions {
    let mut mentions = PlaceMentions::default();

    for caps in IATA_PAIR.captures_iter(text) {
        mentions.push_departure(caps[1].to_string());
        mentions.push_destination(caps[2].to_string());
    }
    for caps in FROM_TO.captures_iter(text) {
        mentions.push_departure(trim_place(&caps[1]));
        mentions.push_destination(trim_place(&caps[2]));
    }
    for caps in TO_PLACE.captures_iter(text) {
        mentions.push_destination(trim_place(&caps[1]));
    }
    for caps in IN_PLACE.captures_iter(text) {
        mentions.push_destination(trim_place(&caps[1]));
    }

    if mentions.destinations.is_empty() && mentions.departures.is_empty() {
        for caps in BARE_PLACE.captures_iter(text) {
            // skip sentence-initial capitals, they are usually not places
            if caps.get(1).map(|m| m.start()) == Some(0) {
                continue;
            }
            mentions.push_destination(trim_place(&caps[1]));
        }
    }

    mentions
}

// -- dates -------------------------------------------------------------------

static DATE_SCAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?:\d{{4}}-\d{{2}}-\d{{2}}|\d{{1,2}}/\d{{1,2}}/\d{{4}}|(?:{m})\s+\d{{1,2}}(?:st|nd|rd|th)?(?:,?\s*\d{{4}})?|\d{{1,2}}(?:st|nd|rd|th)?\s+(?:of\s+)?(?:{m})(?:,?\s*\d{{4}})?|today|tomorrow|next\s+week|next\s+month|in\s+\d+\s+(?:days?|weeks?))\b",
        m = MONTH_PAT
    ))
    .expect("valid regex")
});

static IN_N: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^in\s+(\d+)\s+(days?|weeks?)$").expect("valid regex"));

static MONTH_DAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-z]+)\s+(\d{1,2})(?:st|nd|rd|th)?(?:,?\s*(\d{4}))?$").expect("valid regex")
});

static DAY_MONTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})(?:st|nd|rd|th)?\s+(?:of\s+)?([a-z]+)(?:,?\s*(\d{4}))?$").expect("valid regex")
});

static IN_MONTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\b(?:in|during)\s+({m})\b", m = MONTH_PAT)).expect("valid regex")
});

static RETURN_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:return(?:ing)?|back|until|till|through|to)\s*$").expect("valid regex")
});

/// Parse one date phrase relative to `today`
pub fn parse_date_phrase(phrase: &str, today: NaiveDate) -> Option<NaiveDate> {
    let p = phrase.trim().to_lowercase();

    if let Ok(d) = NaiveDate::parse_from_str(&p, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(d) = NaiveDate::parse_from_str(&p, "%m/%d/%Y") {
        return Some(d);
    }

    match p.as_str() {
        "today" => return Some(today),
        "tomorrow" => return Some(today + Duration::days(1)),
        "next week" => return Some(today + Duration::days(7)),
        "next month" => return Some(today + Duration::days(30)),
        _ => {}
    }

    if let Some(caps) = IN_N.captures(&p) {
        let n: i64 = caps[1].parse().ok()?;
        let days = if caps[2].starts_with("week") { n * 7 } else { n };
        return Some(today + Duration::days(days));
    }

    if let Some(caps) = MONTH_DAY.captures(&p) {
        let month = month_number(&caps[1])?;
        let day: u32 = caps[2].parse().ok()?;
        let year = caps.get(3).and_then(|y| y.as_str().parse().ok());
        return month_day_date(month, day, year, today);
    }
    if let Some(caps) = DAY_MONTH.captures(&p) {
        let day: u32 = caps[1].parse().ok()?;
        let month = month_number(&caps[2])?;
        let year = caps.get(3).and_then(|y| y.as_str().parse().ok());
        return month_day_date(month, day, year, today);
    }

    // bare month, next occurrence of its first day
    if let Some(month) = month_number(&p) {
        let year = if month <= today.month() { today.year() + 1 } else { today.year() };
        return NaiveDate::from_ymd_opt(year, month, 1);
    }

    None
}

/// Year-less month/day dates roll forward to their next occurrence
fn month_day_date(month: u32, day: u32, year: Option<i32>, today: NaiveDate) -> Option<NaiveDate> {
    match year {
        Some(y) => NaiveDate::from_ymd_opt(y, month, day),
        None => {
            let candidate = NaiveDate::from_ymd_opt(today.year(), month, day)?;
            if candidate < today {
                NaiveDate::from_ymd_opt(today.year() + 1, month, day)
            } else {
                Some(candidate)
            }
        }
    }
}

/// Extract departure and return dates from a message
///
/// Phrases preceded by return wording ("returning June 20", "back on the
/// 20th") are treated as the trip end; otherwise the first date found is
/// the start and the second the end.
pub fn extract_dates(text: &str, today: NaiveDate) -> (Option<String>, Option<String>) {
    let mut start = None;
    let mut end = None;

    for found in DATE_SCAN.find_iter(text) {
        let Some(date) = parse_date_phrase(found.as_str(), today) else {
            continue;
        };
        let iso = date.format("%Y-%m-%d").to_string();

        let mut window_start = found.start().saturating_sub(30);
        while !text.is_char_boundary(window_start) {
            window_start += 1;
        }
        let preceding = &text[window_start..found.start()];
        let is_return = RETURN_MARKER.is_match(preceding);

        if is_return && end.is_none() {
            end = Some(iso);
        } else if start.is_none() {
            start = Some(iso);
        } else if end.is_none() {
            end = Some(iso);
        }
    }

    // bare month only counts when nothing firmer matched
    if start.is_none()
        && end.is_none()
        && let Some(caps) = IN_MONTH.captures(text)
        && let Some(date) = parse_date_phrase(&caps[1], today)
    {
        start = Some(date.format("%Y-%m-%d").to_string());
    }

    (start, end)
}

// -- travelers ---------------------------------------------------------------

static ADULTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d+)\s+adults?\b").expect("valid regex"));
static CHILDREN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d+)\s+(?:children|child|kids?)\b").expect("valid regex"));
static INFANTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d+)\s+(?:infants?|babies|baby)\b").expect("valid regex"));
static GENERIC_COUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d+)\s+(?:travelers?|travellers?|people|persons?|passengers?)\b").expect("valid regex")
});
static FAMILY_OF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bfamily of (\d+)\b").expect("valid regex"));
static SOLO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:solo|by myself|on my own|alone)\b").expect("valid regex"));
static COUPLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:couple|my (?:wife|husband|partner|girlfriend|boyfriend))\b").expect("valid regex")
});

fn capture_u32(re: &Regex, text: &str) -> Option<u32> {
    re.captures(text).and_then(|c| c[1].parse().ok())
}

/// Extract traveler counts; None when the message says nothing about them
pub fn extract_travelers(text: &str) -> Option<Travelers> {
    let adults = capture_u32(&ADULTS, text);
    let children = capture_u32(&CHILDREN, text);
    let infants = capture_u32(&INFANTS, text);

    if adults.is_some() || children.is_some() || infants.is_some() {
        // children/infants alone still imply one accompanying adult
        return Some(Travelers {
            adults: adults.unwrap_or(1),
            children: children.unwrap_or(0),
            infants: infants.unwrap_or(0),
        });
    }

    if let Some(n) = capture_u32(&FAMILY_OF, text) {
        return Some(if n > 2 {
            Travelers { adults: 2, children: n - 2, infants: 0 }
        } else {
            Travelers { adults: n.max(1), children: 0, infants: 0 }
        });
    }
    if let Some(n) = capture_u32(&GENERIC_COUNT, text) {
        return Some(Travelers { adults: n, children: 0, infants: 0 });
    }
    if SOLO.is_match(text) {
        return Some(Travelers { adults: 1, children: 0, infants: 0 });
    }
    if COUPLE.is_match(text) {
        return Some(Travelers { adults: 2, children: 0, infants: 0 });
    }

    None
}

// -- budget ------------------------------------------------------------------

static AMOUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:([$€£])\s*([\d,]+(?:\.\d+)?)\s*(k)?|([\d,]+(?:\.\d+)?)\s*(k)?\s*(dollars|usd|bucks|euros?|eur|pounds|quid|gbp))")
        .expect("valid regex")
});
static RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)between\s+[$€£]?\s*([\d,]+)\s*(k)?\s+and\s+[$€£]?\s*([\d,]+)\s*(k)?").expect("valid regex")
});
static MAXIMUM_HINT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:under|less than|at most|no more than|max(?:imum)?(?: of)?|up to|budget of|within)\b")
        .expect("valid regex")
});
static APPROX_HINT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:around|about|approximately|roughly|ish|~)").expect("valid regex")
});
static PER_PERSON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:per person|per head|each|pp)\b").expect("valid regex"));

fn parse_amount(digits: &str, thousands: bool) -> Option<f64> {
    let n: f64 = digits.replace(',', "").parse().ok()?;
    Some(if thousands { n * 1000.0 } else { n })
}

fn symbol_currency(symbol: &str) -> &'static str {
    match symbol {
        "€" => "EUR",
        "£" => "GBP",
        _ => "USD",
    }
}

fn word_currency(word: &str) -> &'static str {
    let lower = word.to_lowercase();
    if lower.starts_with("euro") || lower == "eur" {
        "EUR"
    } else if lower.starts_with("pound") || lower == "gbp" || lower == "quid" {
        "GBP"
    } else {
        "USD"
    }
}

/// Extract a typed budget from a message
pub fn extract_budget(text: &str) -> Option<Budget> {
    if let Some(caps) = RANGE.captures(text) {
        let min = parse_amount(&caps[1], caps.get(2).is_some())?;
        let max = parse_amount(&caps[3], caps.get(4).is_some())?;
        return Some(Budget::Range {
            min_amount: min.min(max),
            max_amount: min.max(max),
            currency: text.find('€').map(|_| "EUR").or_else(|| text.find('£').map(|_| "GBP")).unwrap_or("USD").to_string(),
        });
    }

    let caps = AMOUNT.captures(text)?;
    let (amount, currency) = if let Some(symbol) = caps.get(1) {
        (parse_amount(&caps[2], caps.get(3).is_some())?, symbol_currency(symbol.as_str()))
    } else {
        (parse_amount(&caps[4], caps.get(5).is_some())?, word_currency(&caps[6]))
    };
    let per_person = PER_PERSON.is_match(text);
    let currency = currency.to_string();

    Some(if MAXIMUM_HINT.is_match(text) {
        Budget::Maximum { amount, currency, per_person }
    } else if APPROX_HINT.is_match(text) {
        Budget::Approximate { amount, currency, per_person }
    } else {
        Budget::Exact { amount, currency, per_person }
    })
}

// -- duration ----------------------------------------------------------------

static DAYS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d+)\s+(?:days?|nights?)\b").expect("valid regex"));
static WEEKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d+)\s+weeks?\b").expect("valid regex"));
static A_WEEK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\ba week\b").expect("valid regex"));
static WEEKEND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:a |long )?weekend\b").expect("valid regex"));
static A_MONTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:a|one) month\b").expect("valid regex"));

/// Extract a trip length in days
pub fn extract_duration_days(text: &str) -> Option<u32> {
    if let Some(n) = capture_u32(&DAYS, text) {
        return Some(n);
    }
    if let Some(n) = capture_u32(&WEEKS, text) {
        return Some(n * 7);
    }
    if A_WEEK.is_match(text) {
        return Some(7);
    }
    if A_MONTH.is_match(text) {
        return Some(30);
    }
    if WEEKEND.is_match(text) {
        return Some(2);
    }
    None
}

// -- preferences and trip type ----------------------------------------------

/// Keyword -> normalized preference tag
const PREFERENCE_KEYWORDS: &[(&str, &str)] = &[
    ("luxury", "luxury"),
    ("5-star", "luxury"),
    ("five star", "luxury"),
    ("cheap", "budget"),
    ("affordable", "budget"),
    ("budget-friendly", "budget"),
    ("direct flight", "direct_flights"),
    ("nonstop", "direct_flights"),
    ("non-stop", "direct_flights"),
    ("vegetarian", "vegetarian"),
    ("vegan", "vegan"),
    ("gluten", "gluten_free"),
    ("pool", "pool"),
    ("spa", "spa"),
    ("wifi", "wifi"),
    ("breakfast", "breakfast_included"),
    ("beach", "beach"),
    ("adventure", "adventure"),
    ("romantic", "romantic"),
    ("honeymoon", "romantic"),
    ("family-friendly", "family_friendly"),
    ("kid-friendly", "family_friendly"),
    ("museum", "culture"),
    ("culture", "culture"),
    ("culinary", "food"),
    ("foodie", "food"),
    ("restaurants", "food"),
    ("hiking", "hiking"),
    ("nightlife", "nightlife"),
];

/// Extract normalized preference tags, deduplicated, in keyword order
pub fn extract_preferences(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let mut tags = Vec::new();
    for (keyword, tag) in PREFERENCE_KEYWORDS {
        if lower.contains(keyword) && !tags.iter().any(|t| t == tag) {
            tags.push((*tag).to_string());
        }
    }
    tags
}

static FLIGHT_WORDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:flights?|fly(?:ing)?|airfare|airline)\b").expect("valid regex"));
static HOTEL_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:hotels?|accommodations?|resorts?|hostels?|airbnb|place to stay)\b").expect("valid regex")
});
static ACTIVITY_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:activit(?:y|ies)|things to do|tours?|excursions?|sightseeing)\b").expect("valid regex")
});
static BOOKING_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:bookings?|reservations?|cancel|rebook|modify|itinerary)\b").expect("valid regex")
});
static PLANNING_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:plan(?:ning)?|trips?|vacations?|holidays?|getaway|travel)\b").expect("valid regex")
});

/// Classify the request kind from message wording
///
/// Keyword families are checked in priority order; with no keyword hit
/// the fallback depends on whether the message carried a destination
/// and a date.
pub fn classify_trip_type(text: &str, has_destination: bool, has_date: bool) -> String {
    let kind = if FLIGHT_WORDS.is_match(text) {
        "flight_search"
    } else if HOTEL_WORDS.is_match(text) {
        "hotel_search"
    } else if ACTIVITY_WORDS.is_match(text) {
        "activity_search"
    } else if BOOKING_WORDS.is_match(text) {
        "booking_management"
    } else if PLANNING_WORDS.is_match(text) {
        "general_planning"
    } else if has_destination && has_date {
        "trip_planning"
    } else {
        "general_travel_info"
    };
    kind.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()
    }

    #[test]
    fn test_places_from_to() {
        let mentions = extract_places("I want to fly from New York to Paris");
        assert_eq!(mentions.departures, vec!["New York".to_string()]);
        assert_eq!(mentions.destinations, vec!["Paris".to_string()]);
    }

    #[test]
    fn test_places_iata_pair() {
        let mentions = extract_places("Looking for JFK to NRT flights");
        assert_eq!(mentions.departures, vec!["JFK".to_string()]);
        assert_eq!(mentions.destinations, vec!["NRT".to_string()]);
    }

    #[test]
    fn test_places_trailing_temporal_trimmed() {
        let mentions = extract_places("We are going to Paris next week");
        assert_eq!(mentions.destinations, vec!["Paris".to_string()]);
    }

    #[test]
    fn test_places_multiword() {
        let mentions = extract_places("Thinking of visiting French Riviera this summer");
        assert_eq!(mentions.destinations, vec!["French Riviera".to_string()]);
    }

    #[test]
    fn test_places_none() {
        let mentions = extract_places("what documents do i need?");
        assert!(mentions.destinations.is_empty());
        assert!(mentions.departures.is_empty());
    }

    #[test]
    fn test_parse_date_iso_and_us() {
        assert_eq!(
            parse_date_phrase("2024-06-01", today()),
            NaiveDate::from_ymd_opt(2024, 6, 1)
        );
        assert_eq!(
            parse_date_phrase("6/15/2024", today()),
            NaiveDate::from_ymd_opt(2024, 6, 15)
        );
    }

    #[test]
    fn test_parse_date_relative() {
        assert_eq!(parse_date_phrase("tomorrow", today()), NaiveDate::from_ymd_opt(2024, 5, 11));
        assert_eq!(parse_date_phrase("next week", today()), NaiveDate::from_ymd_opt(2024, 5, 17));
        assert_eq!(parse_date_phrase("in 3 days", today()), NaiveDate::from_ymd_opt(2024, 5, 13));
        assert_eq!(parse_date_phrase("in 2 weeks", today()), NaiveDate::from_ymd_opt(2024, 5, 24));
    }

    #[test]
    fn test_parse_month_day_rolls_forward() {
        // March 1 already passed relative to May 10, so next year
        assert_eq!(parse_date_phrase("march 1", today()), NaiveDate::from_ymd_opt(2025, 3, 1));
        assert_eq!(parse_date_phrase("june 15th", today()), NaiveDate::from_ymd_opt(2024, 6, 15));
        assert_eq!(
            parse_date_phrase("june 15, 2025", today()),
            NaiveDate::from_ymd_opt(2025, 6, 15)
        );
        assert_eq!(parse_date_phrase("15 june", today()), NaiveDate::from_ymd_opt(2024, 6, 15));
    }

    #[test]
    fn test_parse_bare_month() {
        assert_eq!(parse_date_phrase("september", today()), NaiveDate::from_ymd_opt(2024, 9, 1));
        // current or past months go to next year
        assert_eq!(parse_date_phrase("may", today()), NaiveDate::from_ymd_opt(2025, 5, 1));
        assert_eq!(parse_date_phrase("paris", today()), None);
    }

    #[test]
    fn test_extract_dates_start_and_end() {
        let (start, end) = extract_dates("Flying out June 1st and returning June 10th", today());
        assert_eq!(start.as_deref(), Some("2024-06-01"));
        assert_eq!(end.as_deref(), Some("2024-06-10"));
    }

    #[test]
    fn test_extract_dates_bare_month_fallback() {
        let (start, end) = extract_dates("thinking of going somewhere in June", today());
        assert_eq!(start.as_deref(), Some("2024-06-01"));
        assert_eq!(end, None);
    }

    #[test]
    fn test_extract_dates_return_marker_without_start() {
        let (start, end) = extract_dates("I need to be back June 20", today());
        assert_eq!(start, None);
        assert_eq!(end.as_deref(), Some("2024-06-20"));
    }

    #[test]
    fn test_travelers_explicit_counts() {
        let t = extract_travelers("2 adults and 1 child with 1 infant").unwrap();
        assert_eq!(t, Travelers { adults: 2, children: 1, infants: 1 });
    }

    #[test]
    fn test_travelers_children_only_implies_one_adult() {
        let t = extract_travelers("traveling with 2 kids").unwrap();
        assert_eq!(t.adults, 1);
        assert_eq!(t.children, 2);
    }

    #[test]
    fn test_travelers_phrases() {
        assert_eq!(extract_travelers("a solo trip").unwrap().adults, 1);
        assert_eq!(extract_travelers("me and my wife").unwrap().adults, 2);
        let family = extract_travelers("family of 4").unwrap();
        assert_eq!((family.adults, family.children), (2, 2));
        assert_eq!(extract_travelers("4 people").unwrap().adults, 4);
        assert_eq!(extract_travelers("going somewhere warm"), None);
    }

    #[test]
    fn test_budget_kinds() {
        match extract_budget("our budget is $2,500").unwrap() {
            // "budget is" does not match the maximum hints
            Budget::Exact { amount, currency, per_person } => {
                assert_eq!(amount, 2500.0);
                assert_eq!(currency, "USD");
                assert!(!per_person);
            }
            other => panic!("unexpected budget: {other:?}"),
        }

        match extract_budget("under €3k per person").unwrap() {
            Budget::Maximum { amount, currency, per_person } => {
                assert_eq!(amount, 3000.0);
                assert_eq!(currency, "EUR");
                assert!(per_person);
            }
            other => panic!("unexpected budget: {other:?}"),
        }

        match extract_budget("around 1500 euros").unwrap() {
            Budget::Approximate { amount, currency, .. } => {
                assert_eq!(amount, 1500.0);
                assert_eq!(currency, "EUR");
            }
            other => panic!("unexpected budget: {other:?}"),
        }

        match extract_budget("between $1000 and $2000").unwrap() {
            Budget::Range { min_amount, max_amount, currency } => {
                assert_eq!(min_amount, 1000.0);
                assert_eq!(max_amount, 2000.0);
                assert_eq!(currency, "USD");
            }
            other => panic!("unexpected budget: {other:?}"),
        }

        assert_eq!(extract_budget("no numbers here"), None);
    }

    #[test]
    fn test_duration() {
        assert_eq!(extract_duration_days("for 5 days"), Some(5));
        assert_eq!(extract_duration_days("3 nights"), Some(3));
        assert_eq!(extract_duration_days("2 weeks"), Some(14));
        assert_eq!(extract_duration_days("a week in Rome"), Some(7));
        assert_eq!(extract_duration_days("a long weekend"), Some(2));
        assert_eq!(extract_duration_days("sometime"), None);
    }

    #[test]
    fn test_preferences() {
        let tags = extract_preferences("a luxury hotel with a pool, vegetarian restaurants nearby");
        assert_eq!(
            tags,
            vec!["luxury".to_string(), "vegetarian".to_string(), "pool".to_string(), "food".to_string()]
        );
        assert!(extract_preferences("just a trip").is_empty());
    }

    #[test]
    fn test_trip_type_priority() {
        assert_eq!(classify_trip_type("find me a flight and a hotel", true, true), "flight_search");
        assert_eq!(classify_trip_type("need a hotel in Rome", true, false), "hotel_search");
        assert_eq!(classify_trip_type("things to do in Paris", true, false), "activity_search");
        assert_eq!(classify_trip_type("cancel my reservation", false, false), "booking_management");
        assert_eq!(classify_trip_type("help me plan something", false, false), "general_planning");
        assert_eq!(classify_trip_type("Paris June 1", true, true), "trip_planning");
        assert_eq!(classify_trip_type("what currency do they use", false, false), "general_travel_info");
    }
}
