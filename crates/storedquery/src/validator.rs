//! Constraint table interpreter.
//!
//! [`validate`] checks every rule of a [`ConstraintTable`] against a
//! [`ParameterBag`] and collects all violations in a single pass. The bag's
//! values are never modified; violations are recorded on the bag and returned.

use std::collections::HashSet;

use tracing::{debug, trace};

use crate::codes::{is_coded_value, is_dtm};
use crate::constraints::{ConstraintTable, ParameterRule};
use crate::error::{ParameterViolation, ValidationErrors, ViolatedRule};
use crate::params::{Combinator, ParameterBag};

/// Validates `bag` against `table`.
///
/// Checks run independently per rule, in table order:
///
/// 1. presence of required parameters (or their alternatives)
/// 2. cardinality of single-valued parameters
/// 3. value typing (DTM timestamps, coded values)
/// 4. OR combination on parameters that only allow AND
///
/// Every violation is recorded on the bag, flipping its error flag, and the
/// full set is returned.
pub fn validate(table: &ConstraintTable, bag: &mut ParameterBag) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    let mut reported_pairs: HashSet<(String, String)> = HashSet::new();

    for rule in table.rules() {
        check_rule(table, rule, bag, &mut reported_pairs, &mut errors);
    }

    for name in bag.names() {
        if table.get(name).is_none() {
            debug!(query = %table.query(), parameter = %name, "Ignoring unrecognized parameter");
        }
    }

    for violation in &errors {
        bag.record(violation.clone());
    }

    trace!(
        query = %table.query(),
        violations = errors.len(),
        "Validation pass complete"
    );
    errors
}

fn check_rule(
    table: &ConstraintTable,
    rule: &ParameterRule,
    bag: &ParameterBag,
    reported_pairs: &mut HashSet<(String, String)>,
    errors: &mut ValidationErrors,
) {
    let name = rule.name.as_str();
    let present = bag.has_value(name);
    let alternative = rule.alternative.as_deref();
    let alternative_present = alternative.is_some_and(|alt| bag.has_value(alt));

    if rule.required && !present && !alternative_present {
        if bag.contains(name) {
            errors.push(ParameterViolation::new(
                name,
                ViolatedRule::EmptyValueList,
                "required parameter was supplied without values",
            ));
        } else if let Some(alt) = alternative {
            if first_report(reported_pairs, name, alt) {
                errors.push(ParameterViolation::new(
                    name,
                    ViolatedRule::MissingRequired,
                    format!("one of {}, {} must be present", name, alt),
                ));
            }
        } else {
            errors.push(ParameterViolation::new(
                name,
                ViolatedRule::MissingRequired,
                "required parameter is not present",
            ));
        }
    }

    if let Some(alt) = alternative {
        if table.exclusive_alternatives()
            && present
            && alternative_present
            && first_report(reported_pairs, name, alt)
        {
            errors.push(ParameterViolation::new(
                name,
                ViolatedRule::ConflictingAlternatives,
                format!("{} and {} may not both be present", name, alt),
            ));
        }
    }

    let Some(entry) = bag.get(name) else {
        return;
    };
    let values = entry.values();

    if !rule.multiple && values.len() > 1 {
        errors.push(ParameterViolation::new(
            name,
            ViolatedRule::Cardinality,
            format!("accepts a single value only, {} supplied", values.len()),
        ));
    }

    if !rule.string_valued {
        for value in values.iter().filter(|v| !is_dtm(v)) {
            errors.push(ParameterViolation::new(
                name,
                ViolatedRule::ValueType,
                format!("'{}' is not a DTM timestamp", value),
            ));
        }
    }

    if rule.coded {
        for value in values.iter().filter(|v| !is_coded_value(v)) {
            errors.push(ParameterViolation::new(
                name,
                ViolatedRule::CodedValue,
                format!("'{}' is not of the form code^^^scheme", value),
            ));
        }
    }

    if values.len() > 1 && entry.combinator() == Combinator::Or && !rule.and_or_allowed {
        errors.push(ParameterViolation::new(
            name,
            ViolatedRule::Combinator,
            "does not accept OR combination of values",
        ));
    }
}

/// Returns true the first time a pair is seen, in either order.
fn first_report(reported: &mut HashSet<(String, String)>, a: &str, b: &str) -> bool {
    let key = if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    };
    reported.insert(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::ParameterRule;

    fn table() -> ConstraintTable {
        ConstraintTable::new(
            "Test",
            vec![
                ParameterRule::required("$uuid").or_alternative("$uid"),
                ParameterRule::required("$uid").or_alternative("$uuid"),
                ParameterRule::required("$patient"),
                ParameterRule::optional("$format").multiple().coded(),
                ParameterRule::optional("$confidentiality").multiple().coded().and_or(),
                ParameterRule::optional("$from").timestamp(),
            ],
        )
        .unwrap()
    }

    fn rules_for<'a>(errors: &'a ValidationErrors, name: &'a str) -> Vec<ViolatedRule> {
        errors.for_parameter(name).map(|v| v.rule).collect()
    }

    #[test]
    fn test_clean_bag_passes() {
        let mut bag = ParameterBag::new()
            .with("$uuid", ["urn:uuid:1"])
            .with("$patient", ["pid^^^&1.2&ISO"])
            .with("$format", ["a^^^s", "b"])
            .with_or("$confidentiality", ["R", "N"])
            .with("$from", ["20040101"]);

        let errors = validate(&table(), &mut bag);
        assert!(errors.is_empty(), "unexpected: {}", errors);
        assert!(!bag.has_errors());
    }

    #[test]
    fn test_missing_pair_reported_once() {
        let mut bag = ParameterBag::new().with("$patient", ["p"]);
        let errors = validate(&table(), &mut bag);

        assert_eq!(errors.len(), 1);
        let violation = errors.iter().next().unwrap();
        assert_eq!(violation.parameter, "$uuid");
        assert_eq!(violation.rule, ViolatedRule::MissingRequired);
        assert!(violation.detail.contains("$uid"));
    }

    #[test]
    fn test_alternative_satisfies_requirement() {
        let mut bag = ParameterBag::new().with("$uid", ["1.2.3"]).with("$patient", ["p"]);
        assert!(validate(&table(), &mut bag).is_empty());
    }

    #[test]
    fn test_both_alternatives_accepted_by_default() {
        let mut bag = ParameterBag::new()
            .with("$uuid", ["urn:uuid:1"])
            .with("$uid", ["1.2.3"])
            .with("$patient", ["p"]);
        assert!(validate(&table(), &mut bag).is_empty());
    }

    #[test]
    fn test_both_alternatives_rejected_when_exclusive() {
        let mut bag = ParameterBag::new()
            .with("$uuid", ["urn:uuid:1"])
            .with("$uid", ["1.2.3"])
            .with("$patient", ["p"]);
        let errors = validate(&table().with_exclusive_alternatives(), &mut bag);

        assert_eq!(errors.len(), 1);
        assert!(errors.contains_rule(ViolatedRule::ConflictingAlternatives));
    }

    #[test]
    fn test_required_without_alternative() {
        let mut bag = ParameterBag::new().with("$uuid", ["urn:uuid:1"]);
        let errors = validate(&table(), &mut bag);
        assert_eq!(rules_for(&errors, "$patient"), vec![ViolatedRule::MissingRequired]);
    }

    #[test]
    fn test_required_but_empty() {
        let mut bag = ParameterBag::new()
            .with("$uuid", ["urn:uuid:1"])
            .with("$patient", Vec::<String>::new());
        let errors = validate(&table(), &mut bag);
        assert_eq!(rules_for(&errors, "$patient"), vec![ViolatedRule::EmptyValueList]);
    }

    #[test]
    fn test_cardinality() {
        let mut bag = ParameterBag::new()
            .with("$uuid", ["urn:uuid:1", "urn:uuid:2"])
            .with("$patient", ["p"]);
        let errors = validate(&table(), &mut bag);
        assert_eq!(rules_for(&errors, "$uuid"), vec![ViolatedRule::Cardinality]);
    }

    #[test]
    fn test_value_type_and_code_shape() {
        let mut bag = ParameterBag::new()
            .with("$uuid", ["urn:uuid:1"])
            .with("$patient", ["p"])
            .with("$from", ["2004-01-01"])
            .with("$format", ["ok^^^scheme", "^^^scheme", "bad^^"]);
        let errors = validate(&table(), &mut bag);

        assert_eq!(rules_for(&errors, "$from"), vec![ViolatedRule::ValueType]);
        assert_eq!(
            rules_for(&errors, "$format"),
            vec![ViolatedRule::CodedValue, ViolatedRule::CodedValue]
        );
    }

    #[test]
    fn test_or_rejected_where_not_allowed() {
        let mut bag = ParameterBag::new()
            .with("$uuid", ["urn:uuid:1"])
            .with("$patient", ["p"])
            .with_or("$format", ["a", "b"]);
        let errors = validate(&table(), &mut bag);
        assert_eq!(rules_for(&errors, "$format"), vec![ViolatedRule::Combinator]);
    }

    #[test]
    fn test_and_always_legal_for_multiple() {
        let mut bag = ParameterBag::new()
            .with("$uuid", ["urn:uuid:1"])
            .with("$patient", ["p"])
            .with("$format", ["a", "b"]);
        assert!(validate(&table(), &mut bag).is_empty());
    }

    #[test]
    fn test_or_with_single_value_is_not_a_combination() {
        let mut bag = ParameterBag::new()
            .with("$uuid", ["urn:uuid:1"])
            .with("$patient", ["p"])
            .with_or("$format", ["a"]);
        assert!(validate(&table(), &mut bag).is_empty());
    }

    #[test]
    fn test_validation_is_exhaustive() {
        let mut bag = ParameterBag::new()
            .with("$uuid", ["urn:uuid:1", "urn:uuid:2"])
            .with("$from", ["yesterday"])
            .with_or("$format", ["a", "b"]);
        let errors = validate(&table(), &mut bag);

        assert!(errors.contains_rule(ViolatedRule::Cardinality));
        assert!(errors.contains_rule(ViolatedRule::MissingRequired));
        assert!(errors.contains_rule(ViolatedRule::ValueType));
        assert!(errors.contains_rule(ViolatedRule::Combinator));
        assert_eq!(errors.len(), 4);
        assert_eq!(bag.errors(), &errors);
    }

    #[test]
    fn test_unknown_parameters_ignored() {
        let mut bag = ParameterBag::new()
            .with("$uuid", ["urn:uuid:1"])
            .with("$patient", ["p"])
            .with("$somethingElse", ["x", "y"]);
        assert!(validate(&table(), &mut bag).is_empty());
    }
}
