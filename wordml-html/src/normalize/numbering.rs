//! List item marker text.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Formats one level counter for a numbering format (`decimal`,
/// `upperRoman`...). Returns `None` for formats it does not implement.
pub type ListItemFormatter = Rc<dyn Fn(u32, &str) -> Option<String>>;

/// List item formatters by language tag. The `"default"` entry serves every
/// language without its own implementation.
#[derive(Clone)]
pub struct ListItemImplementations {
    formatters: HashMap<String, ListItemFormatter>,
}

pub const DEFAULT_LANGUAGE: &str = "default";

impl ListItemImplementations {
    pub fn empty() -> Self {
        Self {
            formatters: HashMap::new(),
        }
    }

    pub fn insert(&mut self, language: &str, formatter: ListItemFormatter) {
        self.formatters.insert(language.to_string(), formatter);
    }

    /// Formatter registered for the language, by full tag then primary subtag.
    pub fn for_language(&self, language: &str) -> Option<&ListItemFormatter> {
        self.formatters.get(language).or_else(|| {
            let primary = language.split('-').next().unwrap_or(language);
            self.formatters.get(primary)
        })
    }

    pub fn fallback(&self) -> Option<&ListItemFormatter> {
        self.formatters.get(DEFAULT_LANGUAGE)
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.formatters.keys().map(String::as_str)
    }
}

impl Default for ListItemImplementations {
    fn default() -> Self {
        let mut implementations = Self::empty();
        let english: ListItemFormatter = Rc::new(english_list_item);
        implementations.insert(DEFAULT_LANGUAGE, english.clone());
        implementations.insert("en", english);
        implementations
    }
}

impl fmt::Debug for ListItemImplementations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut languages: Vec<_> = self.languages().collect();
        languages.sort_unstable();
        f.debug_struct("ListItemImplementations")
            .field("languages", &languages)
            .finish()
    }
}

/// English list item text.
pub fn english_list_item(value: u32, num_fmt: &str) -> Option<String> {
    let text = match num_fmt {
        "decimal" => value.to_string(),
        "decimalZero" => format!("{value:02}"),
        "upperRoman" => roman(value),
        "lowerRoman" => roman(value).to_lowercase(),
        "upperLetter" => letter(value),
        "lowerLetter" => letter(value).to_lowercase(),
        "ordinal" => format!("{value}{}", ordinal_suffix(value)),
        "cardinalText" => capitalize(&cardinal_words(value)),
        "ordinalText" => capitalize(&ordinal_words(value)),
        "bullet" | "none" => String::new(),
        _ => return None,
    };
    Some(text)
}

/// Largest value written with roman numerals; larger values use decimal.
const MAX_ROMAN: u32 = 3999;
/// Largest value written with letters (30 repetitions of `Z`).
const MAX_LETTER: u32 = 26 * 30;

fn roman(mut value: u32) -> String {
    if value > MAX_ROMAN {
        return value.to_string();
    }
    const TABLE: &[(u32, &str)] = &[
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];
    let mut out = String::new();
    for (amount, numeral) in TABLE {
        while value >= *amount {
            out.push_str(numeral);
            value -= amount;
        }
    }
    out
}

/// A..Z, then AA..ZZ, AAA..: the letter repeats once per pass.
fn letter(value: u32) -> String {
    if value == 0 {
        return String::new();
    }
    if value > MAX_LETTER {
        return value.to_string();
    }
    let index = (value - 1) % 26;
    let repeat = (value - 1) / 26 + 1;
    let c = char::from(b'A' + index as u8);
    std::iter::repeat(c).take(repeat as usize).collect()
}

fn ordinal_suffix(value: u32) -> &'static str {
    match (value % 10, value % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

const ONES: [&str; 20] = [
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen", "eighteen",
    "nineteen",
];
const TENS: [&str; 10] = [
    "", "", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
];

fn cardinal_words(value: u32) -> String {
    match value {
        0..=19 => ONES[value as usize].to_string(),
        20..=99 => {
            let tens = TENS[(value / 10) as usize];
            match value % 10 {
                0 => tens.to_string(),
                ones => format!("{tens}-{}", ONES[ones as usize]),
            }
        }
        100..=999 => {
            let hundreds = format!("{} hundred", ONES[(value / 100) as usize]);
            match value % 100 {
                0 => hundreds,
                rest => format!("{hundreds} {}", cardinal_words(rest)),
            }
        }
        _ => value.to_string(),
    }
}

fn ordinal_words(value: u32) -> String {
    let cardinal = cardinal_words(value);
    let (head, last) = match cardinal.rfind(['-', ' ']) {
        Some(i) => cardinal.split_at(i + 1),
        None => ("", cardinal.as_str()),
    };
    let last = match last {
        "one" => "first".to_string(),
        "two" => "second".to_string(),
        "three" => "third".to_string(),
        "five" => "fifth".to_string(),
        "eight" => "eighth".to_string(),
        "nine" => "ninth".to_string(),
        "twelve" => "twelfth".to_string(),
        other if other.ends_with('y') => format!("{}ieth", &other[..other.len() - 1]),
        other => format!("{other}th"),
    };
    format!("{head}{last}")
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
