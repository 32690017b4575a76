//! # Collation
//!
//! Display names are sorted through the [`Collator`] trait so a host with a
//! real Unicode Collation Algorithm implementation can plug it in. The
//! built-in [`FoldingCollator`] is the best-effort fallback: it compares
//! case-insensitively after stripping diacritics through NFKD and folding
//! Latin ligatures to their base letters, so "Åland Islands" sorts among the
//! A's and "Côte d'Ivoire" among the C's. Other scripts keep their code
//! point order.

use std::cmp::Ordering;
use std::fmt;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::locale::Locale;

/// Locale-aware string comparison used for every name sort.
pub trait Collator: Send + Sync + fmt::Debug {
    /// Compare two display names for `locale`.
    fn compare(&self, a: &str, b: &str, locale: &Locale) -> Ordering;
}

/// Case-insensitive, diacritic-folding ordinal comparison.
#[derive(Debug, Clone, Copy, Default)]
pub struct FoldingCollator;

impl Collator for FoldingCollator {
    fn compare(&self, a: &str, b: &str, _locale: &Locale) -> Ordering {
        fold_key(a).cmp(&fold_key(b)).then_with(|| a.cmp(b))
    }
}

/// The sort key used by [`FoldingCollator`]: compatibility decomposition
/// (NFKD) with combining marks removed, then lowercase.
pub fn fold_key(s: &str) -> String {
    let mut key = String::with_capacity(s.len());
    for c in s.nfkd().filter(|c| !is_combining_mark(*c)) {
        match fold_letter(c) {
            Some(folded) => key.push_str(folded),
            None => key.extend(c.to_lowercase()),
        }
    }
    key
}

// Latin letters that have no canonical decomposition.
fn fold_letter(c: char) -> Option<&'static str> {
    let folded = match c {
        'Æ' | 'æ' => "ae",
        'Ð' | 'ð' | 'Đ' | 'đ' => "d",
        'Ħ' | 'ħ' => "h",
        'ı' => "i",
        'Ł' | 'ł' => "l",
        'Ø' | 'ø' => "o",
        'Œ' | 'œ' => "oe",
        'ß' => "ss",
        'Ŧ' | 'ŧ' => "t",
        'Þ' | 'þ' => "th",
        _ => return None,
    };
    Some(folded)
}
