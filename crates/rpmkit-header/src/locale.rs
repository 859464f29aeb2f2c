//! Locale selection for [`crate::entry::TagValue::I18nStrArray`] values.
//!
//! An `I18nStrArray` value is parallel with the strings named by the
//! `HEADER_I18NTABLE` tag (index 0 is always `"C"`); selecting a string
//! for display picks the first preferred locale that has an entry,
//! falling back to `"C"`, falling back to index 0 of whatever is
//! present.

use parking_lot::RwLock;

static PREFERRED_LOCALES: RwLock<Vec<String>> = RwLock::new(Vec::new());

/// Sets the process-wide preferred locale list, most preferred first.
pub fn set_preferred_locales(locales: Vec<String>) {
    *PREFERRED_LOCALES.write() = locales;
}

/// Returns a copy of the current preferred locale list.
pub fn preferred_locales() -> Vec<String> {
    PREFERRED_LOCALES.read().clone()
}

/// Selects the display string for an `I18nStrArray` value given the
/// locale table (`HEADER_I18NTABLE`'s `StrArray` contents).
///
/// Falls back to `"C"` (conventionally index 0) and then to whatever
/// string is present at index 0, in that order.
pub fn select<'a>(table: &[String], values: &'a [String]) -> Option<&'a str> {
    if table.len() != values.len() || values.is_empty() {
        return values.first().map(String::as_str);
    }
    for locale in preferred_locales() {
        if let Some(idx) = table.iter().position(|t| t == &locale) {
            return values.get(idx).map(String::as_str);
        }
    }
    if let Some(idx) = table.iter().position(|t| t == "C") {
        return values.get(idx).map(String::as_str);
    }
    values.first().map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Vec<String> {
        vec!["C".into(), "fr".into(), "de".into()]
    }
    fn values() -> Vec<String> {
        vec!["hello".into(), "bonjour".into(), "hallo".into()]
    }

    #[test]
    fn falls_back_to_c_when_no_preference_set() {
        set_preferred_locales(vec![]);
        assert_eq!(select(&table(), &values()), Some("hello"));
    }

    #[test]
    fn picks_preferred_locale_when_present() {
        set_preferred_locales(vec!["de".into()]);
        assert_eq!(select(&table(), &values()), Some("hallo"));
        set_preferred_locales(vec![]);
    }

    #[test]
    fn mismatched_lengths_fall_back_to_first_value() {
        assert_eq!(select(&["C".into()], &values()), Some("hello"));
    }
}
