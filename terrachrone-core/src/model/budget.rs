//! Travel budgets and the budget list parser

use std::str::FromStr;

use crate::{Error, Minutes};

/// Ascending list of budgets, each in minutes or cost units
#[derive(Debug, Clone, PartialEq)]
pub struct TravelBudget {
    values: Vec<f64>,
}

impl TravelBudget {
    /// A single positive budget, such as the dual-origin cost limit
    pub fn single(value: f64) -> Result<Self, Error> {
        Self::from_values(vec![value])
    }

    /// Sorts the values ascending and checks that at least one is positive
    pub fn from_values(mut values: Vec<f64>) -> Result<Self, Error> {
        if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
            return Err(Error::BudgetParse(format!("budget {bad} is not finite")));
        }
        if !values.iter().any(|v| *v > 0.0) {
            return Err(Error::BudgetParse(
                "at least one positive budget is required".to_string(),
            ));
        }
        values.sort_by(f64::total_cmp);
        Ok(Self { values })
    }

    /// Parse a user supplied list such as `10,20,30` or `5;7,5`
    ///
    /// When the text contains `;` it separates values and `,` is a decimal
    /// mark; otherwise `,` separates values. Blank entries are ignored.
    pub fn parse(text: &str) -> Result<Self, Error> {
        let separator = if text.contains(';') { ';' } else { ',' };

        let values: Vec<f64> = text
            .split(separator)
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(|token| {
                token.replace(',', ".").parse::<f64>().map_err(|_| {
                    Error::BudgetParse(format!("'{token}' is not a number (example: 5,10,15)"))
                })
            })
            .collect::<Result<_, _>>()?;

        if values.is_empty() {
            return Err(Error::BudgetParse(
                "at least one budget is required (example: 5,10,15)".to_string(),
            ));
        }
        Self::from_values(values)
    }

    pub fn values(&self) -> &[Minutes] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }
}

impl FromStr for TravelBudget {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comma_list() {
        let budget = TravelBudget::parse("10,20,30").unwrap();
        assert_eq!(budget.values(), &[10.0, 20.0, 30.0]);
    }

    #[test]
    fn semicolons_allow_decimal_commas() {
        let budget = TravelBudget::parse("5;7,5").unwrap();
        assert_eq!(budget.values(), &[5.0, 7.5]);
    }

    #[test]
    fn sorts_ascending() {
        let budget = TravelBudget::parse(" 30, 10 ,,20 ").unwrap();
        assert_eq!(budget.values(), &[10.0, 20.0, 30.0]);
        let budget = TravelBudget::parse("7.5;2").unwrap();
        assert_eq!(budget.values(), &[2.0, 7.5]);
    }

    #[test]
    fn blank_input_is_an_error() {
        assert!(matches!(TravelBudget::parse(""), Err(Error::BudgetParse(_))));
        assert!(matches!(TravelBudget::parse("  ,  ; "), Err(Error::BudgetParse(_))));
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(matches!(TravelBudget::parse("10,abc"), Err(Error::BudgetParse(_))));
        assert!(matches!(TravelBudget::parse("0,-5"), Err(Error::BudgetParse(_))));
        assert!(matches!(TravelBudget::parse("inf"), Err(Error::BudgetParse(_))));
    }
}
