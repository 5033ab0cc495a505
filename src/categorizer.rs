use crate::models::Category;

/// One substring test against a field of the transaction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Predicate {
    VendorContains(&'static str),
    TextContains(&'static str),
    AccountContains(&'static str),
    AccountStartsWith(&'static str),
}

impl Predicate {
    fn matches(&self, vendor: &str, account: &str, text: &str) -> bool {
        match self {
            Self::VendorContains(p) => vendor.contains(p),
            Self::TextContains(p) => text.contains(p),
            Self::AccountContains(p) => account.contains(p),
            Self::AccountStartsWith(p) => account.starts_with(p),
        }
    }
}

/// A rule fires when any of its predicates matches.
#[derive(Debug, Clone)]
pub struct Rule {
    pub any_of: Vec<Predicate>,
    pub category: Category,
}

impl Rule {
    fn new(category: Category, any_of: &[Predicate]) -> Self {
        Self {
            any_of: any_of.to_vec(),
            category,
        }
    }
}

/// Ordered rule chain. The first matching rule wins, so the order is a priority.
#[derive(Debug, Clone)]
pub struct Categorizer {
    rules: Vec<Rule>,
    fallback: Category,
}

impl Categorizer {
    pub fn new(rules: Vec<Rule>, fallback: Category) -> Self {
        Self { rules, fallback }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn categorize(&self, vendor_norm: &str, account: &str, text: &str) -> Category {
        let n = vendor_norm.to_lowercase();
        let a = account.to_lowercase();
        let t = text.to_lowercase();
        self.rules
            .iter()
            .find(|r| r.any_of.iter().any(|p| p.matches(&n, &a, &t)))
            .map(|r| r.category)
            .unwrap_or(self.fallback)
    }
}

impl Default for Categorizer {
    fn default() -> Self {
        use Predicate::*;
        let rules = vec![
            Rule::new(
                Category::LeasingVehicle,
                &[VendorContains("arval"), VendorContains("lease"), TextContains("leasing")],
            ),
            Rule::new(
                Category::Marketing,
                &[VendorContains("meta"), VendorContains("facebook"), TextContains("ads")],
            ),
            Rule::new(
                Category::Energy,
                &[
                    VendorContains("hera"),
                    VendorContains("alperia"),
                    TextContains("energie"),
                    TextContains("strom"),
                    TextContains("gas"),
                ],
            ),
            Rule::new(
                Category::SoftwareIt,
                &[
                    VendorContains("aruba"),
                    VendorContains("register"),
                    VendorContains("apple"),
                    VendorContains("microsoft"),
                    VendorContains("google"),
                    VendorContains("adobe"),
                ],
            ),
            Rule::new(
                Category::FeesMandatory,
                &[
                    VendorContains("gemeinde"),
                    VendorContains("handelskammer"),
                    TextContains("camera di commercio"),
                ],
            ),
            Rule::new(
                Category::ConsultingServices,
                &[
                    VendorContains("rst"),
                    TextContains("steuer"),
                    TextContains("commercialista"),
                ],
            ),
            // Account-plan hints, only consulted when no vendor/text rule fired
            Rule::new(
                Category::SoftwareIt,
                &[AccountStartsWith("71."), AccountContains("software")],
            ),
            Rule::new(
                Category::Other,
                &[TextContains("versicherung"), TextContains("assicur")],
            ),
        ];
        Self::new(rules, Category::Other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cat(vendor: &str, account: &str, text: &str) -> Category {
        Categorizer::default().categorize(vendor, account, text)
    }

    #[test]
    fn test_vendor_rules() {
        assert_eq!(cat("arval service lease", "", ""), Category::LeasingVehicle);
        assert_eq!(cat("meta platforms ireland", "", ""), Category::Marketing);
        assert_eq!(cat("alperia spa", "", ""), Category::Energy);
        assert_eq!(cat("adobe systems", "", ""), Category::SoftwareIt);
        assert_eq!(cat("gemeinde bozen", "", ""), Category::FeesMandatory);
    }

    #[test]
    fn test_text_rules_are_case_insensitive() {
        assert_eq!(cat("stadtwerke", "", "Strom Januar"), Category::Energy);
        assert_eq!(cat("studio rossi", "", "Parcella Commercialista"), Category::ConsultingServices);
        assert_eq!(cat("cciaa", "", "Diritto CAMERA DI COMMERCIO"), Category::FeesMandatory);
    }

    #[test]
    fn test_leasing_vendor_beats_software_account() {
        assert_eq!(cat("arval", "71.100 software", ""), Category::LeasingVehicle);
    }

    #[test]
    fn test_account_hint_only_when_nothing_else_matches() {
        assert_eq!(cat("jetbrains", "71.200", ""), Category::SoftwareIt);
        assert_eq!(cat("jetbrains", "Software licences", ""), Category::SoftwareIt);
        assert_eq!(cat("jetbrains", "72.100", ""), Category::Other);
    }

    #[test]
    fn test_earlier_rule_wins_on_overlap() {
        // "google ads" hits Marketing via text before the Software/IT vendor rule
        assert_eq!(cat("google ireland", "", "Google Ads campaign"), Category::Marketing);
        // "gas" is a substring hit on text, Energy precedes Software/IT
        assert_eq!(cat("microsoft", "", "gas station"), Category::Energy);
    }

    #[test]
    fn test_insurance_and_fallback_are_other() {
        assert_eq!(cat("allianz", "", "Versicherung KFZ"), Category::Other);
        assert_eq!(cat("bäckerei huber", "", ""), Category::Other);
    }

    #[test]
    fn test_custom_chain_respects_order() {
        let c = Categorizer::new(
            vec![
                Rule::new(Category::Energy, &[Predicate::VendorContains("x")]),
                Rule::new(Category::Marketing, &[Predicate::VendorContains("x")]),
            ],
            Category::Other,
        );
        assert_eq!(c.categorize("xyz", "", ""), Category::Energy);
        assert_eq!(c.rules().len(), 2);
    }
}
