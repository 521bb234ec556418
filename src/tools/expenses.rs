//! Trip cost calculators.
//!
//! Pure arithmetic tools. The model is bad at sums over a dozen line
//! items, so these exist to keep the budget table honest.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::Tool;

/// Total accommodation cost for a stay.
pub struct EstimateHotelCost;

#[async_trait]
impl Tool for EstimateHotelCost {
    fn name(&self) -> &str {
        "estimate_total_hotel_cost"
    }

    fn description(&self) -> &str {
        "Calculate the total hotel cost: price per night times the number of nights."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "price_per_night": {
                    "type": "number",
                    "description": "Room price per night"
                },
                "total_days": {
                    "type": "integer",
                    "description": "Number of nights"
                }
            },
            "required": ["price_per_night", "total_days"]
        })
    }

    async fn execute(&self, args: Value) -> anyhow::Result<String> {
        let price = number_arg(&args, "price_per_night")?;
        let days = args["total_days"]
            .as_i64()
            .ok_or_else(|| anyhow::anyhow!("Missing 'total_days' argument"))?;

        if days <= 0 {
            anyhow::bail!("total_days must be positive, got {}", days);
        }

        Ok(format_amount(price * days as f64))
    }
}

/// Sum of a list of costs.
pub struct TotalExpense;

#[async_trait]
impl Tool for TotalExpense {
    fn name(&self) -> &str {
        "calculate_total_expense"
    }

    fn description(&self) -> &str {
        "Calculate the total trip expense by summing a list of costs."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "costs": {
                    "type": "array",
                    "items": { "type": "number" },
                    "description": "Numerical costs to sum up"
                }
            },
            "required": ["costs"]
        })
    }

    async fn execute(&self, args: Value) -> anyhow::Result<String> {
        let costs = args["costs"]
            .as_array()
            .ok_or_else(|| anyhow::anyhow!("Missing 'costs' argument"))?;

        let mut total = 0.0;
        for cost in costs {
            total += cost
                .as_f64()
                .ok_or_else(|| anyhow::anyhow!("'costs' must contain only numbers, got {}", cost))?;
        }

        Ok(format_amount(total))
    }
}

/// Per-day budget from a total.
pub struct DailyBudget;

#[async_trait]
impl Tool for DailyBudget {
    fn name(&self) -> &str {
        "calculate_daily_expense_budget"
    }

    fn description(&self) -> &str {
        "Calculate the daily expense budget: total cost divided by the number of days."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "total_cost": {
                    "type": "number",
                    "description": "Total trip cost"
                },
                "days": {
                    "type": "integer",
                    "description": "Trip length in days"
                }
            },
            "required": ["total_cost", "days"]
        })
    }

    async fn execute(&self, args: Value) -> anyhow::Result<String> {
        let total = number_arg(&args, "total_cost")?;
        let days = args["days"]
            .as_i64()
            .ok_or_else(|| anyhow::anyhow!("Missing 'days' argument"))?;

        if days <= 0 {
            anyhow::bail!("days must be greater than zero, got {}", days);
        }

        Ok(format_amount(total / days as f64))
    }
}

fn number_arg(args: &Value, key: &str) -> anyhow::Result<f64> {
    args[key]
        .as_f64()
        .ok_or_else(|| anyhow::anyhow!("Missing '{}' argument", key))
}

/// Whole amounts print without a fraction; everything else keeps two
/// decimal places.
fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("{}", amount as i64)
    } else {
        format!("{:.2}", amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn hotel_cost_multiplies_price_by_nights() {
        let result = tokio_test::block_on(
            EstimateHotelCost.execute(json!({ "price_per_night": 4500.0, "total_days": 3 })),
        )
        .unwrap();
        assert_eq!(result, "13500");
    }

    #[test]
    fn hotel_cost_rejects_non_positive_nights() {
        let err = tokio_test::block_on(
            EstimateHotelCost.execute(json!({ "price_per_night": 4500.0, "total_days": 0 })),
        )
        .unwrap_err();
        assert!(err.to_string().contains("must be positive"));
    }

    #[test]
    fn total_expense_sums_the_list() {
        let result = tokio_test::block_on(
            TotalExpense.execute(json!({ "costs": [1200.5, 800, 99.5] })),
        )
        .unwrap();
        assert_eq!(result, "2100");
    }

    #[test]
    fn total_expense_rejects_non_numeric_entries() {
        let err = tokio_test::block_on(
            TotalExpense.execute(json!({ "costs": [1200, "lots"] })),
        )
        .unwrap_err();
        assert!(err.to_string().contains("only numbers"));
    }

    #[test]
    fn daily_budget_divides_and_guards_zero_days() {
        let result = tokio_test::block_on(
            DailyBudget.execute(json!({ "total_cost": 9000.0, "days": 4 })),
        )
        .unwrap();
        assert_eq!(result, "2250");

        let err = tokio_test::block_on(
            DailyBudget.execute(json!({ "total_cost": 9000.0, "days": 0 })),
        )
        .unwrap_err();
        assert!(err.to_string().contains("greater than zero"));
    }
}
