//! Filter state: the user's include pills, exclude pills and industry refinement.
//!
//! Invariants upheld by every mutation:
//! - terms are trimmed, lowercased, non-empty and at most `MAX_TERM_CHARS` long
//! - each pill set holds a term at most once
//! - no term is both an include and an exclude pill
//! - excluded refinement terms only exist while an industry is selected

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::listing::taxonomy::Industry;

/// Longest accepted term. Fuzzy matching cost grows with the term length.
pub const MAX_TERM_CHARS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PillKind {
    Include,
    Exclude,
}

impl PillKind {
    fn opposite(self) -> PillKind {
        match self {
            PillKind::Include => PillKind::Exclude,
            PillKind::Exclude => PillKind::Include,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("Filter term cannot be empty")]
    EmptyTerm,

    #[error("Filter term cannot exceed {max} characters")]
    TermTooLong { max: usize },

    #[error("'{term}' is already an {existing:?} pill")]
    Conflict { term: String, existing: PillKind },

    #[error("Refinement terms require a selected industry")]
    NoIndustrySelected,

    #[error("Unknown industry: {0}")]
    UnknownIndustry(String),
}

/// Trims and lowercases a raw term. `None` for blank input.
pub fn normalize_term(raw: &str) -> Option<String> {
    let term = raw.trim().to_lowercase();
    (!term.is_empty()).then_some(term)
}

/// `normalize_term` for terms entering the state: blank and overlong terms are errors.
fn accept_term(raw: &str) -> Result<String, FilterError> {
    let term = normalize_term(raw).ok_or(FilterError::EmptyTerm)?;
    if term.chars().count() > MAX_TERM_CHARS {
        return Err(FilterError::TermTooLong {
            max: MAX_TERM_CHARS,
        });
    }
    Ok(term)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct FilterState {
    include_pills: Vec<String>,
    exclude_pills: Vec<String>,
    selected_industry: Option<Industry>,
    excluded_terms: Vec<String>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a state from raw parts, normalising terms and rejecting anything that breaks
    /// the invariants. Duplicates collapse onto their first occurrence.
    #[cfg(test)]
    pub fn from_parts(
        include_pills: &[&str],
        exclude_pills: &[&str],
        selected_industry: Option<Industry>,
        excluded_terms: &[&str],
    ) -> Result<Self, FilterError> {
        let mut state = FilterState::new();
        for term in include_pills {
            state.add_pill(PillKind::Include, term)?;
        }
        for term in exclude_pills {
            state.add_pill(PillKind::Exclude, term)?;
        }
        if let Some(industry) = selected_industry {
            state.selected_industry = Some(industry);
        }
        for term in excluded_terms {
            let term = accept_term(term)?;
            if state.selected_industry.is_none() {
                return Err(FilterError::NoIndustrySelected);
            }
            if !state.excluded_terms.contains(&term) {
                state.excluded_terms.push(term);
            }
        }
        Ok(state)
    }

    pub fn include_pills(&self) -> &[String] {
        &self.include_pills
    }

    pub fn exclude_pills(&self) -> &[String] {
        &self.exclude_pills
    }

    pub fn pills(&self, kind: PillKind) -> &[String] {
        match kind {
            PillKind::Include => &self.include_pills,
            PillKind::Exclude => &self.exclude_pills,
        }
    }

    pub fn selected_industry(&self) -> Option<Industry> {
        self.selected_industry
    }

    pub fn excluded_terms(&self) -> &[String] {
        &self.excluded_terms
    }

    pub fn is_empty(&self) -> bool {
        self.include_pills.is_empty()
            && self.exclude_pills.is_empty()
            && self.selected_industry.is_none()
            && self.excluded_terms.is_empty()
    }

    fn pills_mut(&mut self, kind: PillKind) -> &mut Vec<String> {
        match kind {
            PillKind::Include => &mut self.include_pills,
            PillKind::Exclude => &mut self.exclude_pills,
        }
    }

    /// Adds a pill. Returns whether the state changed (re-adding an existing pill does not).
    pub fn add_pill(&mut self, kind: PillKind, raw: &str) -> Result<bool, FilterError> {
        let term = accept_term(raw)?;
        let opposite = kind.opposite();
        if self.pills(opposite).contains(&term) {
            return Err(FilterError::Conflict {
                term,
                existing: opposite,
            });
        }
        let pills = self.pills_mut(kind);
        if pills.contains(&term) {
            return Ok(false);
        }
        pills.push(term);
        Ok(true)
    }

    /// Removes a pill. Removing the include pill of the selected industry also drops the
    /// industry selection and its refinement terms.
    pub fn remove_pill(&mut self, kind: PillKind, raw: &str) -> bool {
        let Some(term) = normalize_term(raw) else {
            return false;
        };
        let pills = self.pills_mut(kind);
        let before = pills.len();
        pills.retain(|p| *p != term);
        if pills.len() == before {
            return false;
        }

        if kind == PillKind::Include
            && self
                .selected_industry
                .is_some_and(|i| i.label().eq_ignore_ascii_case(&term))
        {
            self.selected_industry = None;
            self.excluded_terms.clear();
        }
        true
    }

    /// Selects an industry for refinement: adds its label as an include pill (if absent),
    /// makes it the selected industry and clears any refinement terms.
    pub fn select_industry(&mut self, industry: Industry) -> Result<bool, FilterError> {
        let added = self.add_pill(PillKind::Include, industry.label())?;
        let changed = added
            || self.selected_industry != Some(industry)
            || !self.excluded_terms.is_empty();
        self.selected_industry = Some(industry);
        self.excluded_terms.clear();
        Ok(changed)
    }

    /// Drops the industry selection and its refinement terms. The industry's include pill,
    /// if any, stays.
    pub fn clear_industry(&mut self) -> bool {
        let changed = self.selected_industry.is_some() || !self.excluded_terms.is_empty();
        self.selected_industry = None;
        self.excluded_terms.clear();
        changed
    }

    /// Toggles a refinement term. Returns `true` when the term is now excluded.
    pub fn toggle_excluded_term(&mut self, raw: &str) -> Result<bool, FilterError> {
        if self.selected_industry.is_none() {
            return Err(FilterError::NoIndustrySelected);
        }
        let term = accept_term(raw)?;
        if let Some(pos) = self.excluded_terms.iter().position(|t| *t == term) {
            self.excluded_terms.remove(pos);
            Ok(false)
        } else {
            self.excluded_terms.push(term);
            Ok(true)
        }
    }

    pub fn clear_excluded_terms(&mut self) -> bool {
        let changed = !self.excluded_terms.is_empty();
        self.excluded_terms.clear();
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terms_are_trimmed_and_lowercased() {
        let mut f = FilterState::new();
        assert_eq!(f.add_pill(PillKind::Include, "  Remote "), Ok(true));
        assert_eq!(f.include_pills(), ["remote".to_string()]);
    }

    #[test]
    fn test_blank_term_rejected() {
        let mut f = FilterState::new();
        assert_eq!(f.add_pill(PillKind::Exclude, "   "), Err(FilterError::EmptyTerm));
        assert!(f.is_empty());
    }

    #[test]
    fn test_overlong_term_rejected() {
        let mut f = FilterState::new();
        let at_limit = "a".repeat(MAX_TERM_CHARS);
        assert_eq!(f.add_pill(PillKind::Include, &at_limit), Ok(true));

        // Surrounding whitespace does not count against the limit.
        let padded = format!("  {}  ", "b".repeat(MAX_TERM_CHARS));
        assert_eq!(f.add_pill(PillKind::Exclude, &padded), Ok(true));

        let too_long = "x".repeat(10_000);
        assert_eq!(
            f.add_pill(PillKind::Include, &too_long),
            Err(FilterError::TermTooLong {
                max: MAX_TERM_CHARS
            })
        );
        assert_eq!(f.include_pills().len(), 1);

        f.select_industry(Industry::Design).unwrap();
        assert!(matches!(
            f.toggle_excluded_term(&too_long),
            Err(FilterError::TermTooLong { .. })
        ));
        assert!(f.excluded_terms().is_empty());
    }

    #[test]
    fn test_duplicate_pill_is_noop() {
        let mut f = FilterState::new();
        assert_eq!(f.add_pill(PillKind::Include, "Food"), Ok(true));
        assert_eq!(f.add_pill(PillKind::Include, "FOOD"), Ok(false));
        assert_eq!(f.include_pills().len(), 1);
    }

    #[test]
    fn test_include_exclude_overlap_rejected() {
        let mut f = FilterState::new();
        f.add_pill(PillKind::Include, "python").unwrap();
        let err = f.add_pill(PillKind::Exclude, "Python").unwrap_err();
        assert_eq!(
            err,
            FilterError::Conflict {
                term: "python".to_string(),
                existing: PillKind::Include
            }
        );
        assert!(f.exclude_pills().is_empty());
    }

    #[test]
    fn test_insertion_order_kept() {
        let mut f = FilterState::new();
        f.add_pill(PillKind::Include, "b").unwrap();
        f.add_pill(PillKind::Include, "a").unwrap();
        assert_eq!(f.include_pills(), ["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn test_select_industry_adds_pill_and_resets_terms() {
        let mut f = FilterState::new();
        assert_eq!(f.select_industry(Industry::Design), Ok(true));
        assert_eq!(f.include_pills(), ["design".to_string()]);
        f.toggle_excluded_term("figma").unwrap();

        assert_eq!(f.select_industry(Industry::Design), Ok(true));
        assert!(f.excluded_terms().is_empty());
        assert_eq!(f.include_pills().len(), 1);
        assert_eq!(f.select_industry(Industry::Design), Ok(false));
    }

    #[test]
    fn test_select_industry_conflicting_with_exclude_pill() {
        let mut f = FilterState::new();
        f.add_pill(PillKind::Exclude, "sales").unwrap();
        assert!(f.select_industry(Industry::Sales).is_err());
        assert!(f.selected_industry().is_none());
    }

    #[test]
    fn test_removing_industry_pill_clears_selection() {
        let mut f = FilterState::new();
        f.select_industry(Industry::VideoAudio).unwrap();
        f.toggle_excluded_term("podcast").unwrap();

        assert!(f.remove_pill(PillKind::Include, "video & audio"));
        assert!(f.selected_industry().is_none());
        assert!(f.excluded_terms().is_empty());
    }

    #[test]
    fn test_removing_other_pill_keeps_selection() {
        let mut f = FilterState::new();
        f.select_industry(Industry::Data).unwrap();
        f.add_pill(PillKind::Include, "remote").unwrap();
        assert!(f.remove_pill(PillKind::Include, "remote"));
        assert_eq!(f.selected_industry(), Some(Industry::Data));
    }

    #[test]
    fn test_remove_missing_pill_reports_no_change() {
        let mut f = FilterState::new();
        assert!(!f.remove_pill(PillKind::Exclude, "nothing"));
        assert!(!f.remove_pill(PillKind::Exclude, ""));
    }

    #[test]
    fn test_toggle_requires_selected_industry() {
        let mut f = FilterState::new();
        assert_eq!(
            f.toggle_excluded_term("figma"),
            Err(FilterError::NoIndustrySelected)
        );
    }

    #[test]
    fn test_toggle_on_and_off() {
        let mut f = FilterState::new();
        f.select_industry(Industry::Design).unwrap();
        assert_eq!(f.toggle_excluded_term("Figma"), Ok(true));
        assert_eq!(f.excluded_terms(), ["figma".to_string()]);
        assert_eq!(f.toggle_excluded_term("figma"), Ok(false));
        assert!(f.excluded_terms().is_empty());
    }

    #[test]
    fn test_clear_helpers_report_change() {
        let mut f = FilterState::new();
        assert!(!f.clear_excluded_terms());
        assert!(!f.clear_industry());
        f.select_industry(Industry::Legal).unwrap();
        f.toggle_excluded_term("law").unwrap();
        assert!(f.clear_excluded_terms());
        assert!(f.clear_industry());
        assert_eq!(f.include_pills(), ["legal".to_string()]);
    }

    #[test]
    fn test_from_parts_validates() {
        let f = FilterState::from_parts(&["Food", "food"], &["python"], None, &[]).unwrap();
        assert_eq!(f.include_pills(), ["food".to_string()]);

        assert!(FilterState::from_parts(&["x"], &["X"], None, &[]).is_err());
        assert_eq!(
            FilterState::from_parts(&[], &[], None, &["figma"]),
            Err(FilterError::NoIndustrySelected)
        );
        let refined =
            FilterState::from_parts(&["design"], &[], Some(Industry::Design), &["Figma"]).unwrap();
        assert_eq!(refined.excluded_terms(), ["figma".to_string()]);
    }
}
