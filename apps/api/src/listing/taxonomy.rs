//! The closed set of industry labels and the keywords that signal them.
//!
//! Declaration order is significant: when two industries score equally for a job, the one
//! declared first wins. `Industry::CLASSIFIED` is that order.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Industry {
    Design,
    Development,
    Data,
    Python,
    Marketing,
    Writing,
    Sales,
    #[serde(rename = "Project Management")]
    ProjectManagement,
    Finance,
    Legal,
    Operations,
    #[serde(rename = "HR")]
    Hr,
    Coaching,
    Consulting,
    Translation,
    #[serde(rename = "Video & Audio")]
    VideoAudio,
    #[serde(rename = "Customer Support")]
    CustomerSupport,
    /// Fallback for jobs no keyword matched.
    Other,
}

impl Industry {
    /// Every keyword-backed industry, in tie-break order. Excludes `Other`.
    pub const CLASSIFIED: [Industry; 17] = [
        Industry::Design,
        Industry::Development,
        Industry::Data,
        Industry::Python,
        Industry::Marketing,
        Industry::Writing,
        Industry::Sales,
        Industry::ProjectManagement,
        Industry::Finance,
        Industry::Legal,
        Industry::Operations,
        Industry::Hr,
        Industry::Coaching,
        Industry::Consulting,
        Industry::Translation,
        Industry::VideoAudio,
        Industry::CustomerSupport,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Industry::Design => "Design",
            Industry::Development => "Development",
            Industry::Data => "Data",
            Industry::Python => "Python",
            Industry::Marketing => "Marketing",
            Industry::Writing => "Writing",
            Industry::Sales => "Sales",
            Industry::ProjectManagement => "Project Management",
            Industry::Finance => "Finance",
            Industry::Legal => "Legal",
            Industry::Operations => "Operations",
            Industry::Hr => "HR",
            Industry::Coaching => "Coaching",
            Industry::Consulting => "Consulting",
            Industry::Translation => "Translation",
            Industry::VideoAudio => "Video & Audio",
            Industry::CustomerSupport => "Customer Support",
            Industry::Other => "Other",
        }
    }

    /// Case-insensitive lookup by label, `Other` included.
    pub fn from_label(label: &str) -> Option<Industry> {
        let label = label.trim();
        Industry::CLASSIFIED
            .iter()
            .copied()
            .chain(std::iter::once(Industry::Other))
            .find(|industry| industry.label().eq_ignore_ascii_case(label))
    }

    /// Keywords that count towards this industry. Empty for `Other`.
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            Industry::Design => &[
                "graphic design",
                "visual design",
                "brand design",
                "logo design",
                "illustration",
                "figma",
                "photoshop",
                "illustrator",
                "sketch",
                "adobe creative",
                "branding",
                "print design",
                "ui designer",
                "ux designer",
                "ui/ux",
                "user interface",
                "user experience",
                "wireframe",
                "prototype",
                "usability",
                "interaction design",
                "product design",
                "design system",
                "packaging design",
                "packaging designer",
                "designer",
            ],
            Industry::Development => &[
                "developer",
                "development",
                "programming",
                "code",
                "software",
                "frontend",
                "backend",
                "fullstack",
                "javascript",
                "react",
                "angular",
                "vue",
                "node.js",
                "php",
                "ruby",
                "java",
                "c#",
                "c++",
                "swift",
                "kotlin",
                "flutter",
                "react native",
                "web development",
                "mobile development",
            ],
            Industry::Data => &[
                "data analyst",
                "data scientist",
                "machine learning",
                "ai",
                "artificial intelligence",
                "sql",
                "database",
                "tableau",
                "power bi",
                "excel analytics",
                "statistics",
                "modeling",
                "visualization",
                "big data",
                "bi",
                "business intelligence",
            ],
            Industry::Python => &[
                "python",
                "django",
                "flask",
                "pandas",
                "numpy",
                "tensorflow",
                "pytorch",
                "jupyter",
                "scikit-learn",
            ],
            Industry::Marketing => &[
                "marketing",
                "seo",
                "sem",
                "social media marketing",
                "content marketing",
                "email marketing",
                "digital marketing",
                "growth marketing",
                "advertising",
                "campaign management",
            ],
            Industry::Writing => &[
                "content writer",
                "copywriter",
                "blog writing",
                "article writing",
                "technical writing",
                "documentation",
                "journalism",
                "editing",
                "proofreading",
            ],
            Industry::Sales => &[
                "sales",
                "business development",
                "account management",
                "customer success",
                "lead generation",
                "crm",
                "revenue",
                "sales representative",
            ],
            Industry::ProjectManagement => &[
                "project manager",
                "scrum master",
                "agile",
                "product manager",
                "coordinator",
                "planning",
                "roadmap",
                "stakeholder management",
            ],
            Industry::Finance => &[
                "finance",
                "accounting",
                "bookkeeping",
                "financial analyst",
                "budget",
                "tax",
                "payroll",
                "quickbooks",
                "financial planning",
            ],
            Industry::Legal => &[
                "legal",
                "lawyer",
                "attorney",
                "paralegal",
                "contract",
                "compliance",
                "law",
                "litigation",
            ],
            Industry::Operations => &[
                "operations",
                "logistics",
                "supply chain",
                "process improvement",
                "optimization",
                "efficiency",
                "workflow",
            ],
            Industry::Hr => &[
                "human resources",
                "hr",
                "recruiting",
                "talent acquisition",
                "hiring",
                "onboarding",
                "employee relations",
                "benefits",
            ],
            Industry::Coaching => &[
                "coach",
                "coaching",
                "life coach",
                "career coach",
                "executive coach",
                "business coach",
                "performance coach",
                "leadership coach",
                "mentor",
                "mentoring",
            ],
            Industry::Consulting => &[
                "consultant",
                "consulting",
                "advisory",
                "strategy",
                "business analyst",
                "transformation",
                "management consultant",
                "strategy consultant",
            ],
            Industry::Translation => &[
                "translation",
                "translator",
                "language",
                "localization",
                "multilingual",
                "interpreter",
            ],
            Industry::VideoAudio => &[
                "video editing",
                "audio editing",
                "video production",
                "youtube",
                "podcast",
                "sound design",
                "voice over",
                "animation",
                "motion graphics",
            ],
            Industry::CustomerSupport => &[
                "customer support",
                "customer service",
                "help desk",
                "technical support",
                "chat support",
                "call center",
            ],
            Industry::Other => &[],
        }
    }
}

impl fmt::Display for Industry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seventeen_classified_industries_without_other() {
        assert_eq!(Industry::CLASSIFIED.len(), 17);
        assert!(!Industry::CLASSIFIED.contains(&Industry::Other));
    }

    #[test]
    fn test_every_classified_industry_has_keywords() {
        for industry in Industry::CLASSIFIED {
            assert!(!industry.keywords().is_empty(), "{industry} has no keywords");
        }
        assert!(Industry::Other.keywords().is_empty());
    }

    #[test]
    fn test_keywords_are_lowercase_and_trimmed() {
        for industry in Industry::CLASSIFIED {
            for kw in industry.keywords() {
                assert_eq!(*kw, kw.trim().to_lowercase(), "{industry}: {kw}");
            }
        }
    }

    #[test]
    fn test_from_label_is_case_insensitive() {
        assert_eq!(Industry::from_label("video & audio"), Some(Industry::VideoAudio));
        assert_eq!(Industry::from_label("  hr "), Some(Industry::Hr));
        assert_eq!(Industry::from_label("OTHER"), Some(Industry::Other));
        assert_eq!(Industry::from_label("astronomy"), None);
    }

    #[test]
    fn test_serde_uses_display_labels() {
        let json = serde_json::to_string(&Industry::ProjectManagement).unwrap();
        assert_eq!(json, r#""Project Management""#);
        let parsed: Industry = serde_json::from_str(r#""Customer Support""#).unwrap();
        assert_eq!(parsed, Industry::CustomerSupport);
    }

    #[test]
    fn test_label_round_trips_through_from_label() {
        for industry in Industry::CLASSIFIED {
            assert_eq!(Industry::from_label(industry.label()), Some(industry));
        }
    }
}
