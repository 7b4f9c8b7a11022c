// Sources command implementation

use anyhow::Result;

use easyconf::cfg::EasyConf;

use super::configuration;
use crate::cli::ComponentArgs;

/// Execute the sources command
pub fn execute_sources(args: &ComponentArgs, easyconf: &EasyConf) -> Result<()> {
    let properties = configuration(args, easyconf).available_properties();

    println!("Component:     {}", properties.component_name());
    if let Some(company) = properties.company_id() {
        println!("Company:       {}", company);
    }
    println!("Base found:    {}", properties.has_base_configuration());
    if let Some(delay) = properties.delay_period() {
        println!("Reload delay:  {}s", delay);
    }
    for source in properties.loaded_sources() {
        println!("  {}", source);
    }

    Ok(())
}
