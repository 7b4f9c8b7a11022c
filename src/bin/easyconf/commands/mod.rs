mod dump;
mod get;
mod sources;

pub use dump::execute_dump;
pub use get::execute_get;
pub use sources::execute_sources;

use std::sync::Arc;

use easyconf::cfg::{ComponentConfiguration, EasyConf};

use crate::cli::ComponentArgs;

fn configuration(args: &ComponentArgs, easyconf: &EasyConf) -> Arc<ComponentConfiguration> {
    match &args.company {
        Some(company) => easyconf.get_company_configuration(company, &args.component),
        None => easyconf.get_configuration(&args.component),
    }
}
