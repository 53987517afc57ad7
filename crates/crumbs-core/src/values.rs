use std::fmt;

use serde::Serialize;

/// An ordered sequence of `(argument, value)` pairs.
///
/// Value tuples are what listings and joins compare and return. Ordering is
/// tuple-wise lexicographic, which for tuples over the same names means
/// ordering by values.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ValueTuple(Vec<(String, String)>);

impl ValueTuple {
    pub fn new(pairs: Vec<(String, String)>) -> Self {
        Self(pairs)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.iter().map(|(n, _)| n)
    }

    pub fn values(&self) -> impl Iterator<Item = &str> + '_ {
        self.iter().map(|(_, v)| v)
    }

    /// Restrict to `names`, in that order. `None` if any name is missing.
    pub fn project<S: AsRef<str>>(&self, names: &[S]) -> Option<ValueTuple> {
        names
            .iter()
            .map(|n| {
                let n = n.as_ref();
                self.get(n).map(|v| (n.to_string(), v.to_string()))
            })
            .collect::<Option<Vec<_>>>()
            .map(ValueTuple)
    }

    pub fn into_inner(self) -> Vec<(String, String)> {
        self.0
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for ValueTuple {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(n, v)| (n.into(), v.into()))
                .collect(),
        )
    }
}

impl From<Vec<(String, String)>> for ValueTuple {
    fn from(pairs: Vec<(String, String)>) -> Self {
        Self(pairs)
    }
}

/// Comma-joined values, one CSV row.
impl fmt::Display for ValueTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let row: Vec<&str> = self.values().collect();
        f.write_str(&row.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vt(pairs: &[(&str, &str)]) -> ValueTuple {
        pairs.iter().copied().collect()
    }

    #[test]
    fn project_reorders_and_drops() {
        let t = vt(&[("sid", "s1"), ("ses", "v1"), ("img", "anat")]);
        assert_eq!(t.project(&["img", "sid"]), Some(vt(&[("img", "anat"), ("sid", "s1")])));
        assert_eq!(t.project(&["run"]), None);
    }

    #[test]
    fn orders_by_values() {
        let mut v = vec![vt(&[("a", "s2"), ("b", "x")]), vt(&[("a", "s1"), ("b", "y")])];
        v.sort();
        assert_eq!(v[0].get("a"), Some("s1"));
    }

    #[test]
    fn displays_as_csv_row() {
        assert_eq!(vt(&[("a", "s1"), ("b", "v1")]).to_string(), "s1,v1");
    }
}
