// Get command implementation

use anyhow::Result;

use easyconf::cfg::{EasyConf, Filter};

use super::configuration;
use crate::cli::GetArgs;

/// Execute the get command
pub fn execute_get(args: &GetArgs, easyconf: &EasyConf) -> Result<()> {
    let properties = configuration(&args.target, easyconf).get_properties()?;
    let filter = Filter::by(args.selectors.iter().cloned())
        .with_variables(args.variables.iter().cloned());

    if args.list {
        for item in properties.get_list(&args.key, &filter)? {
            println!("{}", item);
        }
    } else if let Some(value) = properties.get_string(&args.key, &filter)? {
        println!("{}", value);
    }

    Ok(())
}
