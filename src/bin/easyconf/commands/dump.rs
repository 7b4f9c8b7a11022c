// Dump command implementation

use anyhow::Result;

use easyconf::cfg::EasyConf;

use super::configuration;
use crate::cli::ComponentArgs;

/// Execute the dump command
pub fn execute_dump(args: &ComponentArgs, easyconf: &EasyConf) -> Result<()> {
    let properties = configuration(args, easyconf).get_properties()?;

    let mut keys = properties.keys();
    keys.sort();
    for key in keys {
        if let Some(value) = properties.get_property(&key) {
            println!("{}={}", key, value);
        }
    }

    Ok(())
}
