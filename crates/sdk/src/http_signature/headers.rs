use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use http::HeaderMap;
use serde_json::{Map, Value};

/// Read access to a request's headers, whatever shape the caller holds
/// them in.
///
/// Lookups are case-insensitive. A header that is absent, or whose value is
/// not a string, yields `None`.
pub trait HeaderSource {
    fn header_value(&self, name: &str) -> Option<String>;
}

impl HeaderSource for HeaderMap {
    fn header_value(&self, name: &str) -> Option<String> {
        let mut values = self.get_all(name).iter();
        let first = values.next()?.to_str().ok()?.to_string();
        values.try_fold(first, |mut joined, value| {
            joined.push_str(", ");
            joined.push_str(value.to_str().ok()?);
            Some(joined)
        })
    }
}

impl<S: BuildHasher> HeaderSource for HashMap<String, String, S> {
    fn header_value(&self, name: &str) -> Option<String> {
        find_ignore_case(self.iter(), name).cloned()
    }
}

impl HeaderSource for BTreeMap<String, String> {
    fn header_value(&self, name: &str) -> Option<String> {
        find_ignore_case(self.iter(), name).cloned()
    }
}

/// Webhook frameworks that hand headers over as parsed JSON.
impl HeaderSource for Map<String, Value> {
    fn header_value(&self, name: &str) -> Option<String> {
        find_ignore_case(self.iter(), name)?
            .as_str()
            .map(str::to_string)
    }
}

impl<K: AsRef<str>, V: AsRef<str>> HeaderSource for [(K, V)] {
    fn header_value(&self, name: &str) -> Option<String> {
        self.iter()
            .find(|(key, _)| key.as_ref().eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_ref().to_string())
    }
}

impl<T: HeaderSource + ?Sized> HeaderSource for &T {
    fn header_value(&self, name: &str) -> Option<String> {
        (**self).header_value(name)
    }
}

fn find_ignore_case<'a, V: 'a>(
    mut entries: impl Iterator<Item = (&'a String, &'a V)>,
    name: &str,
) -> Option<&'a V> {
    entries
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value)
}
