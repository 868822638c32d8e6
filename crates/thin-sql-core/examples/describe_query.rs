//! Sales Report - Query Description Example
//!
//! Parses a reporting query against an in-memory sales schema and prints
//! what an execution engine would receive: the service, the resolved
//! fields and the condition trees.
//!
//! Run with: cargo run --example describe_query
//! Add `-- -v` to see the parser's debug and trace output.

use std::error::Error;

use thin_sql_core::ast::FieldDescriptor;
use thin_sql_core::literal::FieldTypeCategory;
use thin_sql_core::{FieldTypeDescriptor, RowSchema, SqlStatement};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

const QUERY: &str = "SELECT Country, COUNT(*) AS orders, SUM(Sales) AS revenue, \
                     IIF(Quantity > 100, 'bulk', 'retail') AS channel \
                     FROM \"Kettle\".\"Sales Report\" s \
                     WHERE s.OrderDate >= DATE '2012-01-01' \
                       AND (Country IN ('Belgium', 'Netherlands') OR Country LIKE 'Lux%') \
                       AND PARAMETER('currency') = 'EUR' \
                     GROUP BY Country \
                     HAVING revenue > 500 \
                     ORDER BY revenue DESC \
                     LIMIT 20";

fn sales_schema() -> RowSchema {
    RowSchema::new()
        .field("Country", FieldTypeCategory::String)
        .field("CustomerName", FieldTypeCategory::String)
        .field(
            "Sales",
            FieldTypeDescriptor::new(FieldTypeCategory::Number)
                .with_length(12)
                .with_precision(2),
        )
        .field("Quantity", FieldTypeCategory::Integer)
        .field("OrderDate", FieldTypeCategory::Date)
}

fn describe(field: &FieldDescriptor) -> String {
    let kind = if field.is_count_star {
        String::from("count(*)")
    } else if let Some(aggregation) = field.aggregation {
        format!("{} of {}", aggregation.as_str(), field.source_name)
    } else if let Some(conditional) = &field.conditional {
        format!(
            "conditional on [{}] -> {} / {}",
            conditional.condition, conditional.true_value, conditional.false_value
        )
    } else {
        field.source_name.clone()
    };
    let field_type = field
        .resolved_type
        .as_ref()
        .map_or("?", FieldTypeDescriptor::display_name);
    format!("{:<10} {kind} : {field_type}", field.output_name())
}

fn main() -> Result<(), Box<dyn Error>> {
    let verbose = std::env::args().any(|a| a == "-v" || a == "--verbose");
    let subscriber = FmtSubscriber::builder()
        .with_max_level(if verbose { Level::TRACE } else { Level::INFO })
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut statement = SqlStatement::new(QUERY)?;
    info!(
        namespace = ?statement.namespace(),
        service = statement.service_name(),
        "Query targets service"
    );

    statement.parse(&sales_schema())?;

    println!("Fields:");
    for field in statement.select_fields().into_iter().flatten() {
        println!("  {}", describe(field));
    }
    if let Some(condition) = statement.where_condition() {
        println!("Where:  {condition}");
    }
    for (name, value) in statement.parameters() {
        println!("Param:  {name} = {value}");
    }
    if let Some(condition) = statement.having_condition() {
        println!("Having: {condition}");
    }
    if let Some(order) = statement.order_fields() {
        for field in order {
            let direction = field.order_direction.unwrap_or_default();
            println!("Order:  {} {}", field.output_name(), direction.as_str());
        }
    }
    if let Some(limit) = statement.limit() {
        println!("Limit:  {} from {}", limit.count, limit.offset);
    }
    Ok(())
}
