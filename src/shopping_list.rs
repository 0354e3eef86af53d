//! Shopping list aggregation: merge ingredient line items collected from
//! every recipe in a user's cart and render them as a plain-text report.

use std::collections::BTreeMap;

/// One (ingredient, amount) row pulled from a cart recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngredientLine {
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

/// A merged group: identical (name, unit) pairs summed across recipes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedIngredient {
    pub name: String,
    pub measurement_unit: String,
    pub total: i64,
}

/// Group lines by (name, measurement_unit) and sum their amounts.
///
/// The same ingredient name under different units stays separate; the same
/// (name, unit) pair across recipes collapses into one total. Output is
/// sorted by name ascending, ties broken by unit, which the BTreeMap key
/// gives us for free.
pub fn merge_lines(lines: impl IntoIterator<Item = IngredientLine>) -> Vec<AggregatedIngredient> {
    let mut totals: BTreeMap<(String, String), i64> = BTreeMap::new();
    for line in lines {
        *totals
            .entry((line.name, line.measurement_unit))
            .or_insert(0) += i64::from(line.amount);
    }
    totals
        .into_iter()
        .map(|((name, measurement_unit), total)| AggregatedIngredient {
            name,
            measurement_unit,
            total,
        })
        .collect()
}

/// Render the aggregated groups as a downloadable text document: a header
/// line, then `<name> - <total> (<unit>)` per group in the order given.
pub fn render(groups: &[AggregatedIngredient]) -> String {
    let mut out = String::from("Shopping list:\n");
    for group in groups {
        out.push_str(&format!(
            "{} - {} ({})\n",
            group.name, group.total, group.measurement_unit
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(name: &str, unit: &str, amount: i32) -> IngredientLine {
        IngredientLine {
            name: name.to_string(),
            measurement_unit: unit.to_string(),
            amount,
        }
    }

    #[test]
    fn merges_identical_pairs_across_recipes() {
        let merged = merge_lines(vec![
            line("flour", "g", 200),
            line("sugar", "g", 50),
            line("flour", "g", 300),
        ]);
        assert_eq!(
            merged,
            vec![
                AggregatedIngredient {
                    name: "flour".into(),
                    measurement_unit: "g".into(),
                    total: 500,
                },
                AggregatedIngredient {
                    name: "sugar".into(),
                    measurement_unit: "g".into(),
                    total: 50,
                },
            ]
        );
    }

    #[test]
    fn same_name_different_unit_stays_separate() {
        let merged = merge_lines(vec![
            line("milk", "ml", 250),
            line("milk", "tbsp", 2),
            line("milk", "ml", 100),
        ]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].measurement_unit, "ml");
        assert_eq!(merged[0].total, 350);
        assert_eq!(merged[1].measurement_unit, "tbsp");
        assert_eq!(merged[1].total, 2);
    }

    #[test]
    fn output_is_sorted_by_name() {
        let merged = merge_lines(vec![
            line("zucchini", "pc", 1),
            line("apple", "pc", 3),
            line("Butter", "g", 20),
        ]);
        let names: Vec<&str> = merged.iter().map(|g| g.name.as_str()).collect();
        // Natural case-sensitive ordering: uppercase sorts before lowercase.
        assert_eq!(names, vec!["Butter", "apple", "zucchini"]);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(merge_lines(Vec::new()).is_empty());
    }

    #[test]
    fn no_ingredient_appears_twice() {
        let merged = merge_lines(vec![
            line("egg", "pc", 2),
            line("egg", "pc", 4),
            line("egg", "pc", 1),
        ]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].total, 7);
    }

    #[test]
    fn render_formats_each_group() {
        let groups = merge_lines(vec![line("flour", "g", 200), line("sugar", "g", 50)]);
        let text = render(&groups);
        assert_eq!(text, "Shopping list:\nflour - 200 (g)\nsugar - 50 (g)\n");
    }

    #[test]
    fn render_empty_is_header_only() {
        assert_eq!(render(&[]), "Shopping list:\n");
    }

    #[test]
    fn render_is_byte_stable() {
        let groups = merge_lines(vec![
            line("flour", "g", 200),
            line("milk", "ml", 500),
            line("flour", "g", 100),
        ]);
        let first = render(&groups);
        let second = render(&groups);
        assert_eq!(first.as_bytes(), second.as_bytes());
    }
}
