//! Administrative hierarchy and the filters that scope records by it.
//!
//! Regions contain prefectures which contain rural communes. Road segments,
//! accounts and (through their road segment) infrastructure features are
//! attached to a commune, so every scoping filter resolves to a set of
//! communes.

use serde::Serialize;

use super::Error;
use super::fields::invalid_field;

/// A commune annotated with its parent names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommuneSummary {
    /// Commune identifier.
    pub id: i32,
    /// Commune name.
    pub nom: String,
    /// Parent prefecture.
    pub prefecture_id: Option<i32>,
    /// Parent prefecture name.
    pub prefecture_nom: Option<String>,
    /// Region of the parent prefecture.
    pub region_id: Option<i32>,
    /// Region name.
    pub region_nom: Option<String>,
}

/// A commune to create under an existing prefecture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCommune {
    /// Commune name, trimmed and non-empty.
    pub nom: String,
    /// Parent prefecture.
    pub prefectures_id: i32,
}

impl NewCommune {
    /// Validate raw input.
    ///
    /// # Errors
    /// Field-level errors when the name is blank or the prefecture is absent
    /// or non-positive.
    pub fn try_from_parts(nom: Option<&str>, prefectures_id: Option<i32>) -> Result<Self, Error> {
        let nom = nom
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| invalid_field("nom", "missing_field", "nom must not be empty"))?;
        let prefectures_id = prefectures_id.ok_or_else(|| {
            invalid_field("prefectures_id", "missing_field", "prefectures_id is required")
        })?;
        positive("prefectures_id", prefectures_id)?;
        Ok(Self {
            nom: nom.to_owned(),
            prefectures_id,
        })
    }
}

/// Request-supplied administrative filters.
///
/// # Examples
/// ```
/// use pprcollecte::domain::AdminFilter;
///
/// let scope = AdminFilter::default().with_region(Some(2)).resolve().unwrap();
/// assert!(!scope.is_unscoped());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminFilter {
    commune_id: Option<i32>,
    prefecture_id: Option<i32>,
    region_id: Option<i32>,
    name: Option<String>,
}

impl AdminFilter {
    /// Restrict to one commune.
    #[must_use]
    pub const fn with_commune(mut self, id: Option<i32>) -> Self {
        self.commune_id = id;
        self
    }

    /// Restrict to communes of one prefecture.
    #[must_use]
    pub const fn with_prefecture(mut self, id: Option<i32>) -> Self {
        self.prefecture_id = id;
        self
    }

    /// Restrict to communes of one region.
    #[must_use]
    pub const fn with_region(mut self, id: Option<i32>) -> Self {
        self.region_id = id;
        self
    }

    /// Restrict to communes whose name contains `fragment`.
    #[must_use]
    pub fn with_name(mut self, fragment: Option<String>) -> Self {
        self.name = fragment;
        self
    }

    /// Validate the filters into a scope. All supplied filters apply together.
    ///
    /// # Errors
    /// Field-level error for a non-positive identifier.
    pub fn resolve(self) -> Result<AdminScope, Error> {
        if let Some(id) = self.commune_id {
            positive("communes_rurales_id", id)?;
        }
        if let Some(id) = self.prefecture_id {
            positive("prefecture_id", id)?;
        }
        if let Some(id) = self.region_id {
            positive("region_id", id)?;
        }
        let name = self
            .name
            .map(|n| n.trim().to_owned())
            .filter(|n| !n.is_empty());
        Ok(AdminScope {
            commune_id: self.commune_id,
            prefecture_id: self.prefecture_id,
            region_id: self.region_id,
            name,
        })
    }
}

fn positive(field: &str, id: i32) -> Result<(), Error> {
    if id > 0 {
        Ok(())
    } else {
        Err(invalid_field(field, "invalid_id", format!("{field} must be a positive integer")))
    }
}

/// Validated conjunction of administrative filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminScope {
    /// Commune identifier.
    pub commune_id: Option<i32>,
    /// Prefecture identifier.
    pub prefecture_id: Option<i32>,
    /// Region identifier.
    pub region_id: Option<i32>,
    /// Trimmed, non-empty name fragment.
    pub name: Option<String>,
}

impl AdminScope {
    /// True when no filter was supplied.
    #[must_use]
    pub const fn is_unscoped(&self) -> bool {
        self.commune_id.is_none()
            && self.prefecture_id.is_none()
            && self.region_id.is_none()
            && self.name.is_none()
    }

    /// Whether `commune` satisfies every supplied filter.
    #[must_use]
    pub fn matches(&self, commune: &CommuneSummary) -> bool {
        let id_ok = self.commune_id.is_none_or(|id| commune.id == id);
        let prefecture_ok = self
            .prefecture_id
            .is_none_or(|id| commune.prefecture_id == Some(id));
        let region_ok = self.region_id.is_none_or(|id| commune.region_id == Some(id));
        let name_ok = self
            .name
            .as_deref()
            .is_none_or(|fragment| contains_ignore_case(&commune.nom, fragment));
        id_ok && prefecture_ok && region_ok && name_ok
    }

    /// `ILIKE` pattern for the name fragment with wildcards escaped.
    #[must_use]
    pub fn name_pattern(&self) -> Option<String> {
        self.name.as_deref().map(|fragment| {
            let mut pattern = String::with_capacity(fragment.len() + 2);
            pattern.push('%');
            for ch in fragment.chars() {
                if matches!(ch, '%' | '_' | '\\') {
                    pattern.push('\\');
                }
                pattern.push(ch);
            }
            pattern.push('%');
            pattern
        })
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Order communes by name, then identifier.
pub fn sort_communes(communes: &mut [CommuneSummary]) {
    communes.sort_by(|a, b| a.nom.cmp(&b.nom).then(a.id.cmp(&b.id)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    fn commune(id: i32, nom: &str, prefecture: i32, region: i32) -> CommuneSummary {
        CommuneSummary {
            id,
            nom: nom.to_owned(),
            prefecture_id: Some(prefecture),
            prefecture_nom: Some(format!("Prefecture {prefecture}")),
            region_id: Some(region),
            region_nom: Some(format!("Region {region}")),
        }
    }

    #[fixture]
    fn communes() -> Vec<CommuneSummary> {
        vec![
            commune(1, "Bambaya", 10, 100),
            commune(2, "Kolaboui", 10, 100),
            commune(3, "Tabambo", 11, 100),
            commune(4, "Dabiss", 12, 200),
        ]
    }

    fn matching(scope: &AdminScope, communes: &[CommuneSummary]) -> Vec<i32> {
        communes.iter().filter(|c| scope.matches(c)).map(|c| c.id).collect()
    }

    #[rstest]
    fn no_filter_matches_everything(communes: Vec<CommuneSummary>) {
        let scope = AdminFilter::default().resolve().expect("valid");
        assert!(scope.is_unscoped());
        assert_eq!(matching(&scope, &communes), vec![1, 2, 3, 4]);
    }

    #[rstest]
    fn name_matches_case_insensitive_substring(communes: Vec<CommuneSummary>) {
        let scope = AdminFilter::default()
            .with_name(Some("BAM".to_owned()))
            .resolve()
            .expect("valid");
        assert_eq!(matching(&scope, &communes), vec![1, 3]);
    }

    #[rstest]
    fn filters_combine_conjunctively(communes: Vec<CommuneSummary>) {
        let scope = AdminFilter::default()
            .with_region(Some(100))
            .with_name(Some("bam".to_owned()))
            .with_prefecture(Some(11))
            .resolve()
            .expect("valid");
        assert_eq!(matching(&scope, &communes), vec![3]);
    }

    #[rstest]
    fn commune_and_region_must_agree(communes: Vec<CommuneSummary>) {
        let scope = AdminFilter::default()
            .with_commune(Some(4))
            .with_region(Some(100))
            .resolve()
            .expect("valid");
        assert!(matching(&scope, &communes).is_empty());
    }

    #[rstest]
    #[case(AdminFilter::default().with_commune(Some(0)), "communes_rurales_id")]
    #[case(AdminFilter::default().with_prefecture(Some(-3)), "prefecture_id")]
    #[case(AdminFilter::default().with_region(Some(0)), "region_id")]
    fn rejects_non_positive_ids(#[case] filter: AdminFilter, #[case] field: &str) {
        let err = filter.resolve().expect_err("invalid id");
        assert_eq!(
            err.details().and_then(|d| d.get("field")).and_then(|f| f.as_str()),
            Some(field)
        );
    }

    #[rstest]
    fn blank_name_is_absent() {
        let scope = AdminFilter::default()
            .with_name(Some("   ".to_owned()))
            .resolve()
            .expect("valid");
        assert!(scope.is_unscoped());
    }

    #[rstest]
    fn name_pattern_escapes_wildcards() {
        let scope = AdminFilter::default()
            .with_name(Some("50%_a\\b".to_owned()))
            .resolve()
            .expect("valid");
        assert_eq!(scope.name_pattern().as_deref(), Some("%50\\%\\_a\\\\b%"));
    }

    #[rstest]
    fn sorts_by_name_then_id() {
        let mut list = vec![
            commune(5, "Kindia", 1, 1),
            commune(2, "Boké", 1, 1),
            commune(1, "Kindia", 1, 1),
        ];
        sort_communes(&mut list);
        let ids: Vec<_> = list.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![2, 1, 5]);
    }

    #[rstest]
    fn new_commune_requires_name_and_prefecture() {
        assert!(NewCommune::try_from_parts(Some("  "), Some(1)).is_err());
        assert!(NewCommune::try_from_parts(Some("Kaback"), None).is_err());
        let commune = NewCommune::try_from_parts(Some(" Kaback "), Some(3)).expect("valid");
        assert_eq!(commune.nom, "Kaback");
    }
}
