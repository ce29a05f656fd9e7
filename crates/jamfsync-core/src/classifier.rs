// ── Model identifier classifier ──
//
// Maps a hardware model identifier (`MacBookPro18,3`) to the newest macOS
// release the hardware supports. Rules form an ordered table evaluated
// top-down; the first anchored match wins. Patterns overlap on purpose:
// older releases list a superset of the hardware, so the table must stay
// sorted newest release first.

use std::sync::LazyLock;

use regex::Regex;

/// Label for a device that reported no model identifier.
pub const MODEL_NOT_FOUND: &str = "Model Identifier Not Found";

/// Label for identifiers no rule recognises.
pub const LEGACY_FALLBACK: &str = "macOS 10.15 Catalina or older";

/// `(pattern, label)` pairs, newest release first.
const MACOS_RULES: &[(&str, &str)] = &[
    (
        r"^(Mac(1[3-9]|BookPro1[5-8]|BookAir(9|10)|Pro[7-9])|iMac(Pro\d+|(19|[2-9]\d))|Macmini[89]),\d+$",
        "macOS 15 Sequoia",
    ),
    (
        r"^(Mac(1[345]|BookPro1[5-8]|BookAir([89]|10)|Pro7)|iMac(Pro1|(19|2[01]))|Macmini[89]),\d+$",
        "macOS 14 Sonoma",
    ),
    (
        r"^(Mac(1[34]|BookPro1[4-8]|BookAir([89]|10)|Pro7|Book10)|iMac(Pro1|(1[89]|2[01]))|Macmini[89]),\d+$",
        "macOS 13 Ventura",
    ),
    (
        r"^((Mac1[34]|MacBook(10|9)|MacBookAir(10|[7-9])|Macmini[7-9]|MacPro[67]|iMacPro1|iMac(1[6-9]|2[0-2])),\d+|MacBookPro1(1,[45]|[2-8],\d+))$",
        "macOS 12 Monterey",
    ),
    (
        r"^((MacBook(10|9|8)|MacBookAir(10|[6-9])|MacBookPro1[1-7]|Macmini[7-9]|MacPro[67]|iMacPro1),\d+|iMac(14,4|1[5-9],\d+|2[01],\d+))$",
        "macOS 11 Big Sur",
    ),
    (
        r"^(VirtualMac2,1|Parallels1[3-5],1|VMware\d{1,2},\d)$",
        "Virtual Mac",
    ),
];

static MACOS: LazyLock<Classifier> = LazyLock::new(|| {
    let rules = MACOS_RULES
        .iter()
        .map(|(pattern, label)| {
            ClassificationRule::new(pattern, *label).expect("MACOS_RULES are valid regex patterns")
        })
        .collect();
    Classifier::new(rules, MODEL_NOT_FOUND, LEGACY_FALLBACK)
});

/// One entry of the rule table.
#[derive(Debug, Clone)]
pub struct ClassificationRule {
    pattern: Regex,
    label: String,
}

impl ClassificationRule {
    /// Compile a rule. The pattern should be anchored with `^...$`; it is
    /// matched against the whole identifier as given.
    pub fn new(pattern: &str, label: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            label: label.into(),
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn matches(&self, model: &str) -> bool {
        self.pattern.is_match(model)
    }
}

/// Ordered first-match-wins classifier with a terminal fallback.
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Vec<ClassificationRule>,
    unknown: String,
    fallback: String,
}

impl Classifier {
    pub fn new(
        rules: Vec<ClassificationRule>,
        unknown: impl Into<String>,
        fallback: impl Into<String>,
    ) -> Self {
        Self {
            rules,
            unknown: unknown.into(),
            fallback: fallback.into(),
        }
    }

    /// The built-in macOS support table.
    pub fn macos() -> &'static Classifier {
        &MACOS
    }

    /// Add a rule ahead of every existing one (a newer OS release).
    pub fn prepend(&mut self, rule: ClassificationRule) {
        self.rules.insert(0, rule);
    }

    pub fn rules(&self) -> &[ClassificationRule] {
        &self.rules
    }

    /// Label for `model`. Missing or blank identifiers get the
    /// "not found" label without consulting the rules.
    pub fn classify(&self, model: Option<&str>) -> &str {
        let Some(model) = model.map(str::trim).filter(|m| !m.is_empty()) else {
            return &self.unknown;
        };

        self.rules
            .iter()
            .find(|rule| rule.matches(model))
            .map_or(&self.fallback, |rule| &rule.label)
    }
}
