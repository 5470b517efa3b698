use ferroscan_core::Scanner;

use crate::cli::CriteriaArgs;
use crate::error::CliError;
use crate::output::Table;

use super::{CommandResult, Context};

pub fn run(args: &CriteriaArgs, ctx: &Context) -> Result<CommandResult, CliError> {
    let scanner = Scanner::new(args.criteria.apply(ctx.config.criteria))?;
    let criteria = scanner.criteria();

    let mut table = Table::new("Criteria", vec!["THRESHOLD", "VALUE"]);
    for (name, value) in [
        ("price band", format!("${:.2} - ${:.2}", criteria.min_price, criteria.max_price)),
        ("min total gain", format!("{}%", criteria.min_day_gain)),
        ("max |7 day change|", format!("{}%", criteria.max_seven_day_change)),
        ("min relative volume", format!("{}x", criteria.min_relative_volume)),
        ("min volume", criteria.min_day_volume.to_string()),
    ] {
        table.push(vec![name.to_owned(), value]);
    }

    Ok(CommandResult::ok(serde_json::to_value(criteria)?).with_table(table))
}
