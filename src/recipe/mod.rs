//! Recipes: ordered operation steps and their line-based text form.
//!
//! ```text
//! -modulate 240 -12
//! -resize 50
//! -edge
//! ```
//!
//! One step per line: `<token>[ <parameter>[ <offset>]]`. Blank lines are
//! ignored. Parsing never fails: unrecognised tokens become
//! [`StepOperation::Unknown`] steps that the executor skips, and a parameter
//! that is not an integer is dropped so the step falls back to a random draw.

pub mod generate;

pub use generate::{generate_light, generate_random, random_step};

use crate::operations::{Operation, Params};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// The operation half of a step: either a catalog entry or a token we did not recognise.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StepOperation {
    /// A catalog operation.
    Known(Operation),
    /// Raw token kept for display and skipped at execution.
    Unknown(String),
}

impl StepOperation {
    /// Classify a token.
    pub fn from_token(token: &str) -> Self {
        match Operation::from_token(token) {
            Some(op) => StepOperation::Known(op),
            None => StepOperation::Unknown(token.to_string()),
        }
    }

    /// Token as written in recipe text.
    pub fn token(&self) -> &str {
        match self {
            StepOperation::Known(op) => op.token(),
            StepOperation::Unknown(token) => token,
        }
    }
}

/// One line of a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecipeStep {
    /// What to run.
    pub operation: StepOperation,
    /// Primary parameter; `None` means "draw at random".
    pub parameter: Option<i64>,
    /// Secondary value. `-modulate` reads it as the brightness offset.
    pub offset: Option<i64>,
}

impl RecipeStep {
    /// A step with no parameter.
    pub fn new(operation: Operation) -> Self {
        Self {
            operation: StepOperation::Known(operation),
            parameter: None,
            offset: None,
        }
    }

    /// A step for a token outside the catalog.
    pub fn unknown(token: impl Into<String>) -> Self {
        Self {
            operation: StepOperation::Unknown(token.into()),
            parameter: None,
            offset: None,
        }
    }

    /// Set the primary parameter.
    pub fn with_parameter(mut self, parameter: i64) -> Self {
        self.parameter = Some(parameter);
        self
    }

    /// Set the secondary value.
    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// The catalog operation, if recognised.
    pub fn known(&self) -> Option<Operation> {
        match self.operation {
            StepOperation::Known(op) => Some(op),
            StepOperation::Unknown(_) => None,
        }
    }

    /// Parse one line. Returns `None` for blank lines.
    pub fn parse_line(line: &str) -> Option<Self> {
        let mut fields = line.split_whitespace();
        let token = fields.next()?;
        let parameter = fields.next().and_then(|field| parse_integer(token, field));
        let offset = fields.next().and_then(|field| parse_integer(token, field));
        let rest = fields.count();
        if rest > 0 {
            log::debug!("{token}: ignoring {rest} trailing field(s)");
        }
        Some(Self {
            operation: StepOperation::from_token(token),
            parameter,
            offset,
        })
    }
}

fn parse_integer(token: &str, field: &str) -> Option<i64> {
    match field.parse::<i64>() {
        Ok(value) => Some(value),
        Err(_) => {
            log::debug!("{token}: parameter '{field}' is not an integer, will draw at random");
            None
        }
    }
}

impl From<Params> for RecipeStep {
    fn from(params: Params) -> Self {
        Self {
            operation: StepOperation::Known(params.operation()),
            parameter: params.parameter(),
            offset: params.offset(),
        }
    }
}

impl fmt::Display for RecipeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.operation.token())?;
        if let Some(parameter) = self.parameter {
            write!(f, " {parameter}")?;
            if let Some(offset) = self.offset {
                write!(f, " {offset}")?;
            }
        }
        Ok(())
    }
}

/// Ordered sequence of steps. Order matters: each step consumes the previous step's output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Recipe {
    steps: Vec<RecipeStep>,
}

impl Recipe {
    /// Empty recipe.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from steps.
    pub fn from_steps(steps: Vec<RecipeStep>) -> Self {
        Self { steps }
    }

    /// Parse recipe text. Never fails; see the module docs.
    pub fn parse(text: &str) -> Self {
        text.lines().filter_map(RecipeStep::parse_line).collect()
    }

    /// One step per line, each terminated by `\n`.
    pub fn serialize(&self) -> String {
        self.to_string()
    }

    /// Append a step.
    pub fn push(&mut self, step: impl Into<RecipeStep>) {
        self.steps.push(step.into());
    }

    /// All steps in order.
    pub fn steps(&self) -> &[RecipeStep] {
        &self.steps
    }

    /// Iterate steps in order.
    pub fn iter(&self) -> std::slice::Iter<'_, RecipeStep> {
        self.steps.iter()
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether there are no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Tokens of steps the executor will skip.
    pub fn unknown_tokens(&self) -> Vec<&str> {
        self.steps
            .iter()
            .filter(|step| step.known().is_none())
            .map(|step| step.operation.token())
            .collect()
    }

    /// The same steps in reverse order.
    pub fn reversed(&self) -> Self {
        self.steps.iter().rev().cloned().collect()
    }
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.steps {
            writeln!(f, "{step}")?;
        }
        Ok(())
    }
}

impl FromStr for Recipe {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl FromIterator<RecipeStep> for Recipe {
    fn from_iter<I: IntoIterator<Item = RecipeStep>>(iter: I) -> Self {
        Self {
            steps: iter.into_iter().collect(),
        }
    }
}

impl FromIterator<Params> for Recipe {
    fn from_iter<I: IntoIterator<Item = Params>>(iter: I) -> Self {
        iter.into_iter().map(RecipeStep::from).collect()
    }
}

impl<'a> IntoIterator for &'a Recipe {
    type Item = &'a RecipeStep;
    type IntoIter = std::slice::Iter<'a, RecipeStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_resize_then_edge() {
        let recipe = Recipe::parse("-resize 50\n-edge 1\n");
        assert_eq!(
            recipe.steps(),
            &[
                RecipeStep::new(Operation::Resize).with_parameter(50),
                RecipeStep::new(Operation::Edge).with_parameter(1),
            ]
        );
    }

    #[test]
    fn test_blank_lines_and_whitespace_ignored() {
        let recipe = Recipe::parse("\n   \n\t-normalize\n\n  -contrast   120  \r\n");
        assert_eq!(recipe.len(), 2);
        assert_eq!(recipe.serialize(), "-normalize\n-contrast 120\n");
    }

    #[test]
    fn test_unknown_tokens_preserved() {
        let recipe = Recipe::parse("-blur 3\n-edge\nswirl\n");
        assert_eq!(recipe.len(), 3);
        assert_eq!(recipe.unknown_tokens(), vec!["-blur", "swirl"]);
        assert_eq!(recipe.steps()[0].parameter, Some(3));
        assert_eq!(recipe.serialize(), "-blur 3\n-edge\nswirl\n");
    }

    #[test]
    fn test_malformed_parameter_becomes_random() {
        let recipe = Recipe::parse("-contrast lots\n");
        assert_eq!(recipe.steps(), &[RecipeStep::new(Operation::Contrast)]);
    }

    #[test]
    fn test_modulate_offset_round_trip() {
        let text = "-modulate 240 -12\n";
        let recipe: Recipe = text.parse().unwrap();
        assert_eq!(recipe.steps()[0].offset, Some(-12));
        assert_eq!(recipe.to_string(), text);
    }

    #[test]
    fn test_from_params() {
        let recipe: Recipe = [Params::Resize { percent: 30 }, Params::Normalize]
            .into_iter()
            .collect();
        assert_eq!(recipe.serialize(), "-resize 30\n-normalize\n");
        assert_eq!(recipe.reversed().serialize(), "-normalize\n-resize 30\n");
    }

    fn well_formed_line() -> impl Strategy<Value = String> {
        let token = prop_oneof![
            prop::sample::select(Operation::ALL.iter().map(|op| op.token()).collect::<Vec<_>>())
                .prop_map(str::to_string),
            "-[a-z]{1,8}",
        ];
        (token, prop::option::of((any::<i32>(), prop::option::of(any::<i16>())))).prop_map(
            |(token, params)| match params {
                None => token,
                Some((p, None)) => format!("{token} {p}"),
                Some((p, Some(o))) => format!("{token} {p} {o}"),
            },
        )
    }

    proptest! {
        #[test]
        fn prop_parse_never_panics(text in "\\PC*") {
            let recipe = Recipe::parse(&text);
            prop_assert!(recipe.len() <= text.lines().count());
        }

        #[test]
        fn prop_round_trip(lines in prop::collection::vec(well_formed_line(), 0..12)) {
            let text: String = lines.iter().map(|line| format!("{line}\n")).collect();
            prop_assert_eq!(Recipe::parse(&text).serialize(), text);
        }

        #[test]
        fn prop_no_line_dropped(lines in prop::collection::vec(well_formed_line(), 0..12)) {
            let text = lines.join("\n");
            prop_assert_eq!(Recipe::parse(&text).len(), lines.len());
        }
    }
}
