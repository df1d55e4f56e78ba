/// Static classification of field names, fixed at start up.
///
/// * `always`: appended to every explicit return list.
/// * `searchable`: advertised to clients as `Indexed Lookup`.
/// * `filterable`: the fields an explicit (non-`all`) return list may actually receive.
///
/// Membership checks ignore ASCII case, like every other field-name comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSchema {
    always: Vec<String>,
    searchable: Vec<String>,
    filterable: Vec<String>,
}

impl FieldSchema {
    pub fn new<A, S, F>(always: A, searchable: S, filterable: F) -> FieldSchema
    where
        A: IntoIterator,
        A::Item: Into<String>,
        S: IntoIterator,
        S::Item: Into<String>,
        F: IntoIterator,
        F::Item: Into<String>,
    {
        FieldSchema {
            always: always.into_iter().map(Into::into).collect(),
            searchable: searchable.into_iter().map(Into::into).collect(),
            filterable: filterable.into_iter().map(Into::into).collect(),
        }
    }

    pub fn always(&self) -> impl Iterator<Item = &str> {
        self.always.iter().map(String::as_str)
    }

    pub fn is_always(&self, field: &str) -> bool {
        contains(&self.always, field)
    }

    pub fn is_searchable(&self, field: &str) -> bool {
        contains(&self.searchable, field)
    }

    pub fn is_filterable(&self, field: &str) -> bool {
        contains(&self.filterable, field)
    }

    /// The keywords advertised for `field` by the `fields` command, space separated.
    pub fn keywords(&self, field: &str) -> String {
        let mut keywords = Vec::with_capacity(3);
        if self.is_searchable(field) {
            keywords.push("Indexed Lookup");
        }
        if self.is_always(field) {
            keywords.push("Always");
        }
        if self.is_filterable(field) {
            keywords.push("Default");
        }
        keywords.join(" ")
    }
}

impl Default for FieldSchema {
    fn default() -> Self {
        FieldSchema::new(
            ["name"],
            ["name", "species", "affiliation", "universe"],
            [
                "name",
                "sex",
                "species",
                "affiliation",
                "universe",
                "site",
                "email",
                "discord",
            ],
        )
    }
}

fn contains(set: &[String], field: &str) -> bool {
    set.iter().any(|name| name.eq_ignore_ascii_case(field))
}
